//! Pipeline orchestration: validate, compute, classify, then fetch
//! recommendations through the injected provider capability.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::bmi::{self, BmiResult};
use crate::error::Result;
use crate::measurement::MeasurementInput;
use crate::recommend::Recommender;
use crate::session::{SessionPhase, SessionState};

/// Shown when the provider call fails; the computed result stays visible.
pub const RECOMMENDATION_UNAVAILABLE_MESSAGE: &str =
    "Could not fetch recommendations at this time. Please try again later.";

/// The synchronous half of one submission: the raw BMI value for the
/// provider call, the classified result, and the session token gating the
/// eventual resolution.
#[derive(Debug, Clone)]
pub struct Submission {
    pub value: f64,
    pub token: u64,
    pub result: BmiResult,
}

/// Outcome of a full advise cycle. The recommendation fields are mutually
/// exclusive: text on success, an error message when the provider failed
/// while the BMI result remains usable.
#[derive(Debug, Clone, Serialize)]
pub struct Advice {
    #[serde(flatten)]
    pub result: BmiResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_error: Option<String>,
}

pub struct BmiAdvisor {
    recommender: Arc<dyn Recommender>,
}

impl BmiAdvisor {
    pub fn new(recommender: Arc<dyn Recommender>) -> Self {
        Self { recommender }
    }

    pub fn recommender_name(&self) -> &'static str {
        self.recommender.name()
    }

    /// Inbound boundary operation: validate typed measurements and produce a
    /// classified result.
    pub fn calculate(&self, weight_kg: f64, height_cm: f64) -> Result<BmiResult> {
        let input = MeasurementInput::new(weight_kg, height_cm)?;
        BmiResult::compute(&input)
    }

    /// Same operation over raw form strings.
    pub fn calculate_raw(&self, raw_weight: &str, raw_height: &str) -> Result<BmiResult> {
        let input = MeasurementInput::parse(raw_weight, raw_height)?;
        BmiResult::compute(&input)
    }

    /// Passthrough to the provider capability.
    pub async fn recommend(&self, bmi: f64) -> Result<String> {
        self.recommender.recommend(bmi).await
    }

    /// Synchronous pipeline stage for one submission: compute and classify
    /// validated measurements, recording the result in the session. A
    /// calculation error clears the session to idle.
    pub fn submit(
        &self,
        state: &mut SessionState,
        input: MeasurementInput,
    ) -> Result<Submission> {
        let value = bmi::bmi(input.weight_kg, input.height_cm);
        let result = match BmiResult::from_value(value) {
            Ok(result) => result,
            Err(err) => {
                state.reset();
                return Err(err);
            }
        };
        let token = state.begin_submission(result.clone());
        debug!(value, category = result.category.label(), token, "submission calculated");
        Ok(Submission {
            value,
            token,
            result,
        })
    }

    /// Asynchronous pipeline stage: fetch recommendations and apply the
    /// outcome through the session's sequence gate. Stale resolutions are
    /// dropped without touching the state.
    pub async fn resolve(&self, state: &mut SessionState, submission: &Submission) {
        match self.recommender.recommend(submission.value).await {
            Ok(text) => {
                if !state.complete(submission.token, text) {
                    debug!(token = submission.token, "discarding stale recommendation");
                }
            }
            Err(err) => {
                warn!(provider = self.recommender.name(), error = %err, "recommendation request failed");
                if !state.fail(submission.token) {
                    debug!(token = submission.token, "discarding stale failure");
                }
            }
        }
    }

    /// One full interaction cycle over raw form input, driving a fresh
    /// session value through the whole state machine.
    pub async fn advise_raw(&self, raw_weight: &str, raw_height: &str) -> Result<Advice> {
        let input = MeasurementInput::parse(raw_weight, raw_height)?;
        self.advise(input).await
    }

    /// One full interaction cycle: submit, await the provider, report the
    /// final session content.
    pub async fn advise(&self, input: MeasurementInput) -> Result<Advice> {
        let mut state = SessionState::new();
        let submission = self.submit(&mut state, input)?;
        self.resolve(&mut state, &submission).await;

        let recommendations = state.recommendation().map(str::to_string);
        let recommendation_error = match state.phase() {
            SessionPhase::RecommendationFailed => {
                Some(RECOMMENDATION_UNAVAILABLE_MESSAGE.to_string())
            }
            _ => None,
        };
        Ok(Advice {
            result: submission.result,
            recommendations,
            recommendation_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmi::{BmiCategory, ColorTag};
    use crate::error::CoachError;
    use crate::recommend::CannedRecommender;

    fn advisor() -> BmiAdvisor {
        BmiAdvisor::new(Arc::new(CannedRecommender::new()))
    }

    #[test]
    fn calculate_classifies_valid_measurements() {
        let result = advisor().calculate(65.0, 170.0).unwrap();
        assert_eq!(result.value, "22.5");
        assert_eq!(result.category, BmiCategory::Normal);
        assert_eq!(result.color, ColorTag::Green);
    }

    #[test]
    fn calculate_rejects_non_positive_weight() {
        assert!(matches!(
            advisor().calculate(0.0, 170.0),
            Err(CoachError::Validation { .. })
        ));
    }

    #[test]
    fn calculate_raw_rejects_garbage() {
        assert!(matches!(
            advisor().calculate_raw("65", "abc"),
            Err(CoachError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn advise_fills_recommendations() {
        let advice = advisor().advise_raw("65", "170").await.unwrap();
        assert_eq!(advice.result.value, "22.5");
        assert!(advice.recommendations.is_some());
        assert!(advice.recommendation_error.is_none());
    }
}
