//! Event codes for call transitions and side effects

use serde::{Deserialize, Serialize};

/// Everything the call engine can report about a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum CallEvent {
    // =========================================================================
    // V001: Lifecycle
    // =========================================================================
    /// Idle → Active
    V001_CALL_STARTED,
    /// Live → Ended, log written
    V001_CALL_ENDED,
    /// Any phase → Idle, per-call data dropped
    V001_CALL_RESET,

    // =========================================================================
    // V002: Turns and scoring
    // =========================================================================
    /// Line appended without scoring
    V002_TURN_APPENDED,
    /// Caller line arrived before enough context existed
    V002_WARM_UP,
    /// Heuristic scorer ran on the line
    V002_TURN_SCORED,
    /// Remote analysis raised the score
    V002_ANALYSIS_MERGED,
    /// Remote analysis did not exceed the current score
    V002_ANALYSIS_BELOW_SCORE,
    /// Remote analysis arrived for a call that is no longer live
    V002_ANALYSIS_STALE,

    // =========================================================================
    // V003: Thresholds
    // =========================================================================
    /// Score crossed above the caution threshold (> 40)
    V003_CAUTION_CROSSED,
    /// Score crossed above the critical threshold (> 60)
    V003_CRITICAL_CROSSED,

    // =========================================================================
    // V004: Side effects
    // =========================================================================
    /// Guardian contact flagged for notification
    V004_GUARDIAN_NOTIFIED,
    /// Cyber-cell report id minted
    V004_REPORT_FILED,

    // =========================================================================
    // V005: Alert prompt
    // =========================================================================
    /// High-risk prompt shown to observers
    V005_ALERT_RAISED,
    /// User dismissed the prompt for the rest of the call
    V005_ALERT_IGNORED,

    // =========================================================================
    // V006: Tolerated misuse
    // =========================================================================
    /// Operation requested in a phase that does not accept it
    V006_NOT_LIVE,
    /// Start requested while a call is already live
    V006_ALREADY_LIVE,
}

impl CallEvent {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::V001_CALL_STARTED => "V001_CALL_STARTED",
            Self::V001_CALL_ENDED => "V001_CALL_ENDED",
            Self::V001_CALL_RESET => "V001_CALL_RESET",
            Self::V002_TURN_APPENDED => "V002_TURN_APPENDED",
            Self::V002_WARM_UP => "V002_WARM_UP",
            Self::V002_TURN_SCORED => "V002_TURN_SCORED",
            Self::V002_ANALYSIS_MERGED => "V002_ANALYSIS_MERGED",
            Self::V002_ANALYSIS_BELOW_SCORE => "V002_ANALYSIS_BELOW_SCORE",
            Self::V002_ANALYSIS_STALE => "V002_ANALYSIS_STALE",
            Self::V003_CAUTION_CROSSED => "V003_CAUTION_CROSSED",
            Self::V003_CRITICAL_CROSSED => "V003_CRITICAL_CROSSED",
            Self::V004_GUARDIAN_NOTIFIED => "V004_GUARDIAN_NOTIFIED",
            Self::V004_REPORT_FILED => "V004_REPORT_FILED",
            Self::V005_ALERT_RAISED => "V005_ALERT_RAISED",
            Self::V005_ALERT_IGNORED => "V005_ALERT_IGNORED",
            Self::V006_NOT_LIVE => "V006_NOT_LIVE",
            Self::V006_ALREADY_LIVE => "V006_ALREADY_LIVE",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::V001_CALL_STARTED => "Call started",
            Self::V001_CALL_ENDED => "Call ended and logged",
            Self::V001_CALL_RESET => "Call state reset",
            Self::V002_TURN_APPENDED => "Line appended",
            Self::V002_WARM_UP => "Warming up - not scored yet",
            Self::V002_TURN_SCORED => "Line scored",
            Self::V002_ANALYSIS_MERGED => "Analysis raised the score",
            Self::V002_ANALYSIS_BELOW_SCORE => "Analysis below current score",
            Self::V002_ANALYSIS_STALE => "Analysis discarded - call not live",
            Self::V003_CAUTION_CROSSED => "Caution threshold crossed",
            Self::V003_CRITICAL_CROSSED => "Critical threshold crossed",
            Self::V004_GUARDIAN_NOTIFIED => "Guardian notified",
            Self::V004_REPORT_FILED => "Cyber-cell report filed",
            Self::V005_ALERT_RAISED => "High-risk alert raised",
            Self::V005_ALERT_IGNORED => "Alert ignored",
            Self::V006_NOT_LIVE => "No live call - ignored",
            Self::V006_ALREADY_LIVE => "Call already live - ignored",
        }
    }
}

impl std::fmt::Display for CallEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
