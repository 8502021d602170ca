//! Pattern catalog: the fixed keyword table used by the heuristic scorer

use crate::types::{ScamCategory, ScamPattern};

/// All scam patterns, in evaluation order
pub static SCAM_PATTERNS: [ScamPattern; 5] = [
    ScamPattern {
        id: "otp",
        keywords: &["otp", "one time password", "code sent", "read out the code", "digit code"],
        risk_increment: 35,
        category: ScamCategory::InfoTheft,
        description: "Soliciting OTP (High Risk)",
    },
    // "bank" on its own is weak evidence
    ScamPattern {
        id: "banking_neutral",
        keywords: &["bank", "account", "credit card", "debit card"],
        risk_increment: 5,
        category: ScamCategory::Financial,
        description: "General Financial Terminology",
    },
    ScamPattern {
        id: "banking_sensitive",
        keywords: &["cvv", "card number", "atm pin", "password", "expiry date", "back of your card"],
        risk_increment: 40,
        category: ScamCategory::Financial,
        description: "Asking for Sensitive Credentials",
    },
    ScamPattern {
        id: "urgency",
        keywords: &[
            "immediately",
            "urgent",
            "act now",
            "expires soon",
            "within 24 hours",
            "police",
            "arrest",
            "lawsuit",
        ],
        risk_increment: 25,
        category: ScamCategory::Urgency,
        description: "Creating Artificial Urgency",
    },
    ScamPattern {
        id: "emotional_pressure",
        keywords: &[
            "scared",
            "worry",
            "don't tell anyone",
            "secret",
            "confidential",
            "trust me",
            "danger",
            "hacker",
        ],
        risk_increment: 20,
        category: ScamCategory::Threat,
        description: "Emotional Manipulation / Secrecy",
    },
];

/// Iterate the catalog in order
pub fn patterns() -> impl Iterator<Item = &'static ScamPattern> {
    SCAM_PATTERNS.iter()
}

/// Look up a pattern by id
pub fn find(id: &str) -> Option<&'static ScamPattern> {
    SCAM_PATTERNS.iter().find(|p| p.id == id)
}
