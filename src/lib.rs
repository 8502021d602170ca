//! VoiceShield: real-time fraud scoring for a simulated phone call
//!
//! Transcript line → RiskScorer (+ optional remote CallAnalyzer) → CallEngine → observers

pub mod core;
pub mod error;
pub mod types;

// =============================================================================
// SCORE BOUNDS
// =============================================================================

/// Upper bound for risk and trust scores
pub const MAX_SCORE: u32 = 100;

// =============================================================================
// COMBINATION RULE
// =============================================================================

/// Bonus when financial vocabulary co-occurs with an urgency cue
pub const FINANCE_URGENCY_BONUS: u32 = 15;

/// Cues that trigger the finance + urgency bonus
pub const FINANCE_URGENCY_CUES: [&str; 2] = ["urgent", "immediately"];

/// Label appended when the bonus fires
pub const FINANCE_URGENCY_LABEL: &str = "Combination: Finance + Urgency";

// =============================================================================
// CALL THRESHOLDS
// =============================================================================

/// Crossing above this sets the caution whisper
pub const CAUTION_THRESHOLD: u32 = 40;

/// Crossing above this sets the critical whisper, notifies the guardian
/// and files the cyber-cell report
pub const CRITICAL_THRESHOLD: u32 = 60;

/// At or above this the high-risk prompt is shown (unless ignored)
pub const ALERT_THRESHOLD: u32 = 60;

/// A logged call counts as "alert triggered" at or above this
pub const ALERT_LOG_THRESHOLD: u32 = 30;

/// Minimum number of prior lines before a caller turn is scored
pub const WARM_UP_LINES: usize = 2;

/// Prefix of minted cyber-cell report ids
pub const CYBER_CELL_PREFIX: &str = "CC-";

pub const CAUTION_WHISPER: &str =
    "Warning: Suspicious patterns detected. Do not share personal info.";

pub const CRITICAL_WHISPER: &str =
    "Critical: Risk level extreme. Guardian alert system pre-armed.";

// =============================================================================
// REMOTE / FALLBACK ANALYSIS
// =============================================================================

/// Remote risk (0-100) above which a call is classified as potential fraud
pub const REMOTE_FRAUD_THRESHOLD: u32 = 70;

/// Remote risk (0-100) above which the caller is assessed as suspicious
pub const REMOTE_SUSPICIOUS_THRESHOLD: u32 = 50;

/// Fallback risk (1-10) above which a call is classified as potential fraud.
/// Deliberately not unified with REMOTE_FRAUD_THRESHOLD.
pub const FALLBACK_FRAUD_THRESHOLD: u8 = 4;

/// Simulated latency of the local fallback (milliseconds)
pub const FALLBACK_DELAY_MS: u64 = 800;

// =============================================================================
// HISTORY
// =============================================================================

/// Number of most recent calls in the history risk trend
pub const RISK_TREND_LEN: usize = 10;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
