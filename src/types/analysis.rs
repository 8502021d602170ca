//! Whole-call analysis produced by the remote model or the local fallback

use serde::{Deserialize, Serialize};

/// Overall verdict for a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Benign,
    PotentialFraud,
}

impl Classification {
    pub fn is_fraud(&self) -> bool {
        matches!(self, Classification::PotentialFraud)
    }
}

/// Who the caller appears to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerType {
    Friend,
    Relative,
    KnownContact,
    Unknown,
    Suspicious,
    Uncertain,
}

/// Richer assessment of a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallAnalysis {
    pub classification: Classification,
    /// 1-10
    pub emotional_risk_score: u8,
    pub caller_type_assessment: CallerType,
    pub key_indicators: Vec<String>,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_coach_tips: Option<Vec<String>>,
}

impl CallAnalysis {
    /// Risk on the 0-100 scale used by the call state
    pub fn scaled_risk(&self) -> u32 {
        (u32::from(self.emotional_risk_score) * 10).min(crate::MAX_SCORE)
    }
}
