//! Scorer output structures

use serde::{Deserialize, Serialize};

/// Result of scoring one utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// New running score: 0-100
    pub score: u32,
    /// Matched labels, deduplicated, first occurrence first
    pub detected_labels: Vec<String>,
}

impl RiskAssessment {
    /// Assessment that leaves the score where it was
    pub fn unchanged(score: u32) -> Self {
        Self {
            score: score.min(crate::MAX_SCORE),
            detected_labels: Vec::new(),
        }
    }

    /// Append a label unless already present
    pub fn push_label(&mut self, label: &str) {
        if !self.detected_labels.iter().any(|l| l == label) {
            self.detected_labels.push(label.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.detected_labels.is_empty()
    }
}

/// Surface tone cues of an utterance (informational, not scored)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneSignals {
    /// Exclamation marks or shouting
    pub is_urgent: bool,
    /// Mentions police or arrest
    pub is_threatening: bool,
}
