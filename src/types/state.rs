//! Call lifecycle phases and the live call record

use colored::Color;
use serde::{Deserialize, Serialize};

use crate::types::{CallAnalysis, TranscriptLine};

/// Lifecycle phase of the call engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallPhase {
    /// No call in progress
    Idle,
    /// Call live, no unacknowledged high-risk prompt
    Active,
    /// Call live, score at or above the alert threshold and not ignored
    AlertRaised,
    /// Call finished, final state still readable until reset
    Ended,
}

impl CallPhase {
    /// True while turns are accepted
    pub fn is_live(&self) -> bool {
        matches!(self, CallPhase::Active | CallPhase::AlertRaised)
    }

    /// Terminal color for CLI display
    pub fn color(&self) -> Color {
        match self {
            CallPhase::Idle => Color::BrightBlack,
            CallPhase::Active => Color::Green,
            CallPhase::AlertRaised => Color::Red,
            CallPhase::Ended => Color::Cyan,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            CallPhase::Idle => "⏳",
            CallPhase::Active => "📞",
            CallPhase::AlertRaised => "🚨",
            CallPhase::Ended => "📴",
        }
    }
}

impl std::fmt::Display for CallPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CallPhase::Idle => "IDLE",
            CallPhase::Active => "ACTIVE",
            CallPhase::AlertRaised => "ALERT_RAISED",
            CallPhase::Ended => "ENDED",
        };
        write!(f, "{}", name)
    }
}

/// Live, mutable aggregate for one call
///
/// Only `CallEngine` mutates this; everyone else gets `&CallState` or a clone.
/// Pattern labels accumulate over the whole call, so the logged
/// `scam_category` is the first label of the call, not of the worst turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallState {
    pub is_active: bool,
    pub transcript: Vec<TranscriptLine>,
    /// 0-100
    pub current_risk_score: u32,
    /// Always 100 - current_risk_score
    pub trust_score: u32,
    /// Deduplicated, in first-seen order
    pub detected_patterns: Vec<String>,
    pub whisper_message: Option<String>,
    pub is_alert_ignored: bool,
    pub guardian_notified: bool,
    pub cyber_cell_report_id: Option<String>,
    /// Most recent remote/fallback analysis received during the call
    pub last_analysis: Option<CallAnalysis>,
}

impl Default for CallState {
    fn default() -> Self {
        Self::baseline()
    }
}

impl CallState {
    /// Fresh state: score 0, trust 100, nothing recorded
    pub fn baseline() -> Self {
        Self {
            is_active: false,
            transcript: Vec::new(),
            current_risk_score: 0,
            trust_score: crate::MAX_SCORE,
            detected_patterns: Vec::new(),
            whisper_message: None,
            is_alert_ignored: false,
            guardian_notified: false,
            cyber_cell_report_id: None,
            last_analysis: None,
        }
    }

    /// Trust implied by a risk score
    pub fn trust_for(risk: u32) -> u32 {
        crate::MAX_SCORE.saturating_sub(risk)
    }
}
