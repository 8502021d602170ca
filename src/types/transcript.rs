//! Transcript model
//!
//! - Line = one finalized utterance from one side of the call
//! - Lines are appended only, never edited

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the call spoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Caller,
    Receiver,
}

impl Speaker {
    /// Parse a role name ("caller", "c", "receiver", "r"), case insensitive
    pub fn parse(role: &str) -> Option<Self> {
        match role.trim().to_ascii_lowercase().as_str() {
            "caller" | "c" => Some(Speaker::Caller),
            "receiver" | "r" => Some(Speaker::Receiver),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Caller => "caller",
            Speaker::Receiver => "receiver",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line of the live transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub id: String,
    pub sender: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// False for interim recognition results
    pub is_stable: bool,
}

impl TranscriptLine {
    /// Create a stable line stamped with the current time
    pub fn new(sender: Speaker, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
            is_stable: true,
        }
    }

    /// "CALLER: text" form used in prompts
    pub fn labelled(&self) -> String {
        format!("{}: {}", self.sender.as_str().to_uppercase(), self.text)
    }
}
