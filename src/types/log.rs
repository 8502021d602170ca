//! Historical record of a finished call

use serde::{Deserialize, Serialize};

use crate::types::{CallAnalysis, TranscriptLine};

/// Category recorded when nothing was detected
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Immutable record appended to history when a call ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallLog {
    pub id: String,
    /// dd/mm/yyyy
    pub date: String,
    /// HH:MM:SS
    pub time: String,
    pub duration_seconds: u64,
    /// Simulated caller metadata
    pub caller_number: String,
    pub caller_relationship: String,
    pub risk_score: u32,
    pub transcript: Vec<TranscriptLine>,
    pub analysis: Option<CallAnalysis>,
    pub alert_triggered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scam_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cyber_cell_report_id: Option<String>,
}

impl CallLog {
    /// Category is present and not the "Unknown" placeholder
    pub fn has_known_category(&self) -> bool {
        self.scam_category
            .as_deref()
            .is_some_and(|c| c != UNKNOWN_CATEGORY)
    }

    /// The last analysis of the call classified it as potential fraud
    pub fn is_threat(&self) -> bool {
        self.analysis
            .as_ref()
            .is_some_and(|a| a.classification.is_fraud())
    }
}

/// Dashboard summary over the whole history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub calls_logged: usize,
    /// Calls whose analysis classified them as potential fraud
    pub threats_blocked: usize,
    pub alerts_triggered: usize,
    /// Final risk of the most recent calls, oldest first
    pub risk_trend: Vec<u32>,
}
