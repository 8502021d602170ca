//! User settings consumed by the call core

use serde::{Deserialize, Serialize};

/// Accepted but not consulted by either scorer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSensitivity {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

/// Persisted user settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gemini_api_key: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_contact: Option<String>,
    pub risk_sensitivity: RiskSensitivity,
    pub elder_mode: bool,
    pub language: Language,
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            guardian_name: None,
            guardian_contact: None,
            risk_sensitivity: RiskSensitivity::default(),
            elder_mode: false,
            language: Language::default(),
            notifications_enabled: true,
        }
    }
}

impl Settings {
    /// API key, ignoring blank values
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Guardian contact, ignoring blank values
    pub fn guardian(&self) -> Option<&str> {
        self.guardian_contact
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Fill an empty API key from `GEMINI_API_KEY`
    pub fn with_env_overrides(mut self) -> Self {
        if self.api_key().is_none() {
            if let Ok(key) = std::env::var("GEMINI_API_KEY") {
                if !key.trim().is_empty() {
                    self.gemini_api_key = Some(key.trim().to_string());
                }
            }
        }
        self
    }
}
