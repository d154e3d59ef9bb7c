//! Transient presentation state for one advisory session.
//!
//! The state is an explicit value owned by a session handler, never ambient
//! global state, so the pipeline stays testable without a rendering
//! environment. Nothing here outlives a single interaction cycle.

use serde::{Deserialize, Serialize};

use crate::bmi::BmiResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No result yet.
    Idle,
    /// BmiResult displayed; recommendation request dispatched but unresolved.
    Calculated,
    /// Recommendation text received and displayed alongside the result.
    Completed,
    /// Result still displayed, recommendation panel cleared after a failure.
    RecommendationFailed,
}

/// Latest calculation result, pending flag, and recommendation text for
/// display. A new submission discards prior fields.
///
/// Overlapping requests are serialized by a monotonic submission sequence:
/// every submission takes a fresh token, and resolutions carrying a stale
/// token are discarded, so the latest submission always wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    phase: SessionPhase,
    latest: Option<BmiResult>,
    recommendation: Option<String>,
    pending: bool,
    seq: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            latest: None,
            recommendation: None,
            pending: false,
            seq: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn latest(&self) -> Option<&BmiResult> {
        self.latest.as_ref()
    }

    pub fn recommendation(&self) -> Option<&str> {
        self.recommendation.as_deref()
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    /// Record a valid submission: the new result replaces whatever was on
    /// screen, prior recommendation text is discarded, and the returned
    /// token gates the eventual resolution.
    pub fn begin_submission(&mut self, result: BmiResult) -> u64 {
        self.seq += 1;
        self.phase = SessionPhase::Calculated;
        self.latest = Some(result);
        self.recommendation = None;
        self.pending = true;
        self.seq
    }

    /// Apply a successful recommendation. Returns false (and changes
    /// nothing) if the token has been superseded by a newer submission.
    pub fn complete(&mut self, token: u64, text: String) -> bool {
        if token != self.seq {
            return false;
        }
        self.phase = SessionPhase::Completed;
        self.recommendation = Some(text);
        self.pending = false;
        true
    }

    /// Apply a recommendation failure: the computed result stays displayed,
    /// the recommendation panel is cleared. Stale tokens are discarded.
    pub fn fail(&mut self, token: u64) -> bool {
        if token != self.seq {
            return false;
        }
        self.phase = SessionPhase::RecommendationFailed;
        self.recommendation = None;
        self.pending = false;
        true
    }

    /// Clear the slate after an invalid submission or calculation error.
    /// The sequence advances so any in-flight resolution becomes stale and
    /// cannot resurrect a cleared screen.
    pub fn reset(&mut self) {
        self.seq += 1;
        self.phase = SessionPhase::Idle;
        self.latest = None;
        self.recommendation = None;
        self.pending = false;
    }
}
