//! Scam pattern definitions

use serde::Serialize;

/// Closed set of pattern categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScamCategory {
    Financial,
    Urgency,
    Threat,
    InfoTheft,
}

impl std::fmt::Display for ScamCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScamCategory::Financial => "financial",
            ScamCategory::Urgency => "urgency",
            ScamCategory::Threat => "threat",
            ScamCategory::InfoTheft => "info_theft",
        };
        write!(f, "{}", name)
    }
}

/// One keyword pattern from the catalog
#[derive(Debug, Clone, Serialize)]
pub struct ScamPattern {
    pub id: &'static str,
    /// Lowercase keywords, matched as substrings
    pub keywords: &'static [&'static str],
    pub risk_increment: u32,
    pub category: ScamCategory,
    /// Label reported when the pattern matches
    pub description: &'static str,
}

impl ScamPattern {
    /// True if any keyword occurs in already-lowercased text
    pub fn matches(&self, lower_text: &str) -> bool {
        self.keywords.iter().any(|k| lower_text.contains(k))
    }
}
