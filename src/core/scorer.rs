//! Heuristic risk scorer: keyword catalog + finance/urgency combination rule
//!
//! Pure and total. Every matching pattern contributes independently; a
//! financial match paired with an urgency cue earns an extra bonus, so plain
//! banking talk stays low while pressure tactics climb fast.

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::catalog;
use crate::types::{RiskAssessment, ScamCategory, ToneSignals};
use crate::{FINANCE_URGENCY_BONUS, FINANCE_URGENCY_CUES, FINANCE_URGENCY_LABEL, MAX_SCORE};

lazy_static! {
    static ref RE_THREAT: Regex = Regex::new(r"(?i)police|arrest").unwrap();
}

/// Minimum length before an all-caps line counts as shouting
const SHOUT_MIN_LEN: usize = 10;

/// Keyword-based risk scorer
#[derive(Debug, Default, Clone, Copy)]
pub struct RiskScorer;

impl RiskScorer {
    /// Create new scorer
    pub fn new() -> Self {
        Self
    }

    /// Score one utterance on top of the running score
    pub fn score(&self, text: &str, current_score: u32) -> RiskAssessment {
        let base = current_score.min(MAX_SCORE);
        let lower = text.trim().to_lowercase();

        // Handle empty input
        if lower.is_empty() {
            return RiskAssessment::unchanged(base);
        }

        let has_urgency_cue = FINANCE_URGENCY_CUES.iter().any(|cue| lower.contains(cue));

        let mut assessment = RiskAssessment::unchanged(base);
        let mut total = base;

        for pattern in catalog::patterns() {
            if !pattern.matches(&lower) {
                continue;
            }

            total += pattern.risk_increment;
            assessment.push_label(pattern.description);

            match pattern.category {
                ScamCategory::Financial if has_urgency_cue => {
                    total += FINANCE_URGENCY_BONUS;
                    assessment.push_label(FINANCE_URGENCY_LABEL);
                }
                ScamCategory::Financial
                | ScamCategory::Urgency
                | ScamCategory::Threat
                | ScamCategory::InfoTheft => {}
            }
        }

        assessment.score = total.min(MAX_SCORE);
        assessment
    }

    /// Quick score - just the new value
    pub fn quick_score(&self, text: &str, current_score: u32) -> u32 {
        self.score(text, current_score).score
    }

    /// Surface tone cues (shouting, threats). Not part of the score.
    pub fn detect_tone(&self, text: &str) -> ToneSignals {
        let shouting = text.chars().count() > SHOUT_MIN_LEN
            && text.chars().any(char::is_alphabetic)
            && text == text.to_uppercase();

        ToneSignals {
            is_urgent: text.contains('!') || shouting,
            is_threatening: RE_THREAT.is_match(text),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let scorer = RiskScorer::new();
        let result = scorer.score("", 12);
        assert_eq!(result.score, 12);
        assert!(result.is_empty());

        let result = scorer.score("   ", 0);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_benign_text_keeps_score() {
        let scorer = RiskScorer::new();
        let result = scorer.score("Hi mom, how was the trip?", 20);
        assert_eq!(result.score, 20);
        assert!(result.is_empty());
    }

    #[test]
    fn test_otp_detected() {
        let scorer = RiskScorer::new();
        let result = scorer.score("Please share your OTP now", 0);
        assert!(result.score >= 35);
        assert!(result
            .detected_labels
            .contains(&"Soliciting OTP (High Risk)".to_string()));
    }

    #[test]
    fn test_case_insensitive() {
        let scorer = RiskScorer::new();
        assert_eq!(
            scorer.quick_score("READ OUT THE CODE", 0),
            scorer.quick_score("read out the code", 0)
        );
    }

    #[test]
    fn test_bank_alone_is_low() {
        let scorer = RiskScorer::new();
        let result = scorer.score("I went to the bank today", 0);
        assert_eq!(result.score, 5);
        assert_eq!(result.detected_labels, vec!["General Financial Terminology"]);
    }

    #[test]
    fn test_finance_urgency_combination() {
        let scorer = RiskScorer::new();
        let combined = scorer.score("my bank account needs urgent verification", 0);
        let alone = scorer.score("my bank account number", 0);

        // banking 5 + bonus 15 + urgency 25
        assert_eq!(combined.score, 45);
        assert!(combined.score - alone.score >= FINANCE_URGENCY_BONUS + 25);
        assert!(combined
            .detected_labels
            .contains(&FINANCE_URGENCY_LABEL.to_string()));
    }

    #[test]
    fn test_bonus_per_financial_pattern_label_once() {
        let scorer = RiskScorer::new();
        // banking_neutral 5 + bonus, banking_sensitive 40 + bonus, urgency 25
        let result = scorer.score("urgent: your bank needs the cvv", 0);
        assert_eq!(result.score, 100);
        let combos = result
            .detected_labels
            .iter()
            .filter(|l| *l == FINANCE_URGENCY_LABEL)
            .count();
        assert_eq!(combos, 1);
    }

    #[test]
    fn test_label_order_is_first_occurrence() {
        let scorer = RiskScorer::new();
        let result = scorer.score("bank otp immediately", 0);
        assert_eq!(
            result.detected_labels,
            vec![
                "Soliciting OTP (High Risk)",
                "General Financial Terminology",
                FINANCE_URGENCY_LABEL,
                "Creating Artificial Urgency",
            ]
        );
    }

    #[test]
    fn test_score_clamped_and_monotonic() {
        let scorer = RiskScorer::new();
        let texts = [
            "",
            "hello",
            "otp cvv urgent secret police bank",
            "trust me, this is confidential",
        ];
        for start in [0, 30, 99, 100, 250] {
            for text in texts {
                let s = scorer.quick_score(text, start);
                assert!(s <= MAX_SCORE);
                assert!(s >= start.min(MAX_SCORE), "{text:?} from {start} gave {s}");
            }
        }
    }

    #[test]
    fn test_detect_tone() {
        let scorer = RiskScorer::new();
        assert!(scorer.detect_tone("Do it now!").is_urgent);
        assert!(scorer.detect_tone("YOU WILL BE CHARGED").is_urgent);
        assert!(!scorer.detect_tone("OK THEN").is_urgent);
        assert!(scorer.detect_tone("The Police are coming").is_threatening);
        assert!(!scorer.detect_tone("see you soon").is_threatening);
    }
}
