use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bmi_coach::advisor::{BmiAdvisor, RECOMMENDATION_UNAVAILABLE_MESSAGE};
use bmi_coach::bmi::{BmiCategory, ColorTag};
use bmi_coach::error::{CoachError, Result};
use bmi_coach::measurement::MeasurementInput;
use bmi_coach::recommend::Recommender;
use bmi_coach::session::{SessionPhase, SessionState};

struct FixedRecommender(&'static str);

#[async_trait]
impl Recommender for FixedRecommender {
    async fn recommend(&self, _bmi: f64) -> Result<String> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct FailingRecommender {
    calls: AtomicU64,
}

#[async_trait]
impl Recommender for FailingRecommender {
    async fn recommend(&self, _bmi: f64) -> Result<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Err(CoachError::Recommendation {
            message: "provider offline".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[tokio::test]
async fn advise_happy_path_matches_scenario() {
    let advisor = BmiAdvisor::new(Arc::new(FixedRecommender("Eat more greens.")));
    let advice = advisor.advise_raw("65", "170").await.unwrap();

    assert_eq!(advice.result.value, "22.5");
    assert_eq!(advice.result.category, BmiCategory::Normal);
    assert_eq!(advice.result.color, ColorTag::Green);
    assert_eq!(advice.recommendations.as_deref(), Some("Eat more greens."));
    assert!(advice.recommendation_error.is_none());
}

#[tokio::test]
async fn advise_preserves_whitespace_in_recommendation() {
    let text = "Morning:\n  - 20 min walk\n\nEvening:\n  - light stretching\n";
    let advisor = BmiAdvisor::new(Arc::new(FixedRecommender(text)));
    let advice = advisor.advise_raw("65", "170").await.unwrap();
    assert_eq!(advice.recommendations.as_deref(), Some(text));
}

#[tokio::test]
async fn provider_failure_keeps_result_and_reports_one_error() {
    let recommender = Arc::new(FailingRecommender {
        calls: AtomicU64::new(0),
    });
    let advisor = BmiAdvisor::new(recommender.clone());
    let advice = advisor.advise_raw("65", "170").await.unwrap();

    // The BMI result remains usable, the recommendation panel is empty,
    // and exactly one error message is surfaced.
    assert_eq!(advice.result.value, "22.5");
    assert!(advice.recommendations.is_none());
    assert_eq!(
        advice.recommendation_error.as_deref(),
        Some(RECOMMENDATION_UNAVAILABLE_MESSAGE)
    );
    assert_eq!(recommender.calls.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn invalid_input_yields_validation_error_and_no_result() {
    let advisor = BmiAdvisor::new(Arc::new(FixedRecommender("unused")));

    for (weight, height) in [("0", "170"), ("-5", "170"), ("65", "abc")] {
        match advisor.advise_raw(weight, height).await {
            Err(CoachError::Validation { errors }) => assert!(!errors.is_empty()),
            other => panic!("expected validation error for {weight}/{height}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn submit_and_resolve_drive_the_session_machine() {
    let advisor = BmiAdvisor::new(Arc::new(FixedRecommender("advice")));
    let mut state = SessionState::new();
    let input = MeasurementInput::parse("65", "170").unwrap();

    let submission = advisor.submit(&mut state, input).unwrap();
    assert_eq!(state.phase(), SessionPhase::Calculated);
    assert!(state.pending());
    assert!((submission.value - 22.49134948096886).abs() < 1e-12);

    advisor.resolve(&mut state, &submission).await;
    assert_eq!(state.phase(), SessionPhase::Completed);
    assert_eq!(state.recommendation(), Some("advice"));
    assert!(!state.pending());
}

#[tokio::test]
async fn overlapping_submissions_latest_wins() {
    let advisor = BmiAdvisor::new(Arc::new(FixedRecommender("slow reply")));
    let mut state = SessionState::new();

    let first = advisor
        .submit(&mut state, MeasurementInput::parse("90", "170").unwrap())
        .unwrap();
    let second = advisor
        .submit(&mut state, MeasurementInput::parse("65", "170").unwrap())
        .unwrap();

    // The first request's reply arrives after the second submission and is
    // discarded; the session reflects the latest submission only.
    advisor.resolve(&mut state, &first).await;
    assert_eq!(state.phase(), SessionPhase::Calculated);
    assert!(state.pending());

    advisor.resolve(&mut state, &second).await;
    assert_eq!(state.phase(), SessionPhase::Completed);
    let latest = state.latest().unwrap();
    assert_eq!(latest.value, "22.5");
}

#[tokio::test]
async fn failure_after_newer_submission_is_discarded() {
    let failing = Arc::new(FailingRecommender {
        calls: AtomicU64::new(0),
    });
    let advisor = BmiAdvisor::new(failing);
    let mut state = SessionState::new();

    let first = advisor
        .submit(&mut state, MeasurementInput::parse("90", "170").unwrap())
        .unwrap();
    let _second = advisor
        .submit(&mut state, MeasurementInput::parse("65", "170").unwrap())
        .unwrap();

    advisor.resolve(&mut state, &first).await;
    assert_eq!(state.phase(), SessionPhase::Calculated);
    assert!(state.latest().is_some());
}
