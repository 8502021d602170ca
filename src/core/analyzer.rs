//! Remote call analysis with mandatory local fallback
//!
//! With a credential, one `generateContent` request is made to the Gemini
//! API. Any failure on that path is logged and answered by the local keyword
//! fallback, so `analyze` always yields a `CallAnalysis`.

use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::types::{CallAnalysis, CallerType, Classification, TranscriptLine};
use crate::{
    FALLBACK_DELAY_MS, FALLBACK_FRAUD_THRESHOLD, MAX_SCORE, REMOTE_FRAUD_THRESHOLD,
    REMOTE_SUSPICIOUS_THRESHOLD,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-pro";
const REQUEST_TIMEOUT_SECS: u64 = 20;

pub const NO_FLAGS_INDICATOR: &str = "No specific flags";
const REMOTE_DEFAULT_REASONING: &str = "AI Risk Assessment Completed.";
const FALLBACK_REASONING: &str = "Analysis based on pattern combinations (API Fallback).";

lazy_static! {
    // ```json ... ``` wrappers around model output
    static ref RE_CODE_FENCE: Regex = Regex::new(r"```(?:json|JSON)?").unwrap();
}

/// Anything that can turn a transcript into a `CallAnalysis`
#[async_trait]
pub trait CallAnalyzer: Send + Sync {
    /// Never fails; implementations recover internally
    async fn analyze(&self, transcript: &[TranscriptLine], credential: Option<&str>)
        -> CallAnalysis;
}

// =============================================================================
// GEMINI WIRE FORMAT
// =============================================================================

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// JSON the model is asked to return
#[derive(Debug, Deserialize)]
struct RemoteAssessment {
    risk_score: f64,
    #[serde(default)]
    detected_indicators: Option<Vec<String>>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    safety_coach_tips: Option<Vec<String>>,
}

// =============================================================================
// ANALYZER
// =============================================================================

/// Gemini-backed analyzer with keyword fallback
#[derive(Debug, Clone)]
pub struct FraudAnalyzer {
    client: reqwest::Client,
    api_base: String,
    model: String,
    fallback_delay: Duration,
}

impl Default for FraudAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl FraudAnalyzer {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_base: GEMINI_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            fallback_delay: Duration::from_millis(FALLBACK_DELAY_MS),
        }
    }

    /// Point at a different API root (tests, proxies)
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Simulated latency of the local path
    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    async fn analyze_remote(
        &self,
        transcript: &[TranscriptLine],
        api_key: &str,
    ) -> Result<CallAnalysis, AnalysisError> {
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(transcript)),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Status(status.as_u16()));
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or(AnalysisError::EmptyResponse)?;

        parse_model_output(&text)
    }
}

#[async_trait]
impl CallAnalyzer for FraudAnalyzer {
    async fn analyze(
        &self,
        transcript: &[TranscriptLine],
        credential: Option<&str>,
    ) -> CallAnalysis {
        if let Some(key) = credential.map(str::trim).filter(|k| !k.is_empty()) {
            match self.analyze_remote(transcript, key).await {
                Ok(analysis) => {
                    debug!(score = analysis.emotional_risk_score, "remote analysis completed");
                    return analysis;
                }
                Err(e) => warn!("remote analysis failed, using local fallback: {}", e),
            }
        }

        if !self.fallback_delay.is_zero() {
            tokio::time::sleep(self.fallback_delay).await;
        }
        local_analysis(transcript)
    }
}

// =============================================================================
// PROMPT + RESPONSE MAPPING
// =============================================================================

fn build_prompt(transcript: &[TranscriptLine]) -> String {
    let conversation = transcript
        .iter()
        .map(TranscriptLine::labelled)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You assess phone call transcripts for scam risk.\n\
         Raise the risk for emotional pressure, panic or urgency, requests for \
         OTPs, PINs or bank details, and impersonation of police or officials. \
         Ordinary conversation is low risk.\n\n\
         Reply with JSON only, no prose:\n\
         {{\n  \"risk_score\": 0-100,\n  \"risk_level\": \"LOW | MEDIUM | HIGH\",\n  \
         \"detected_indicators\": [\"...\"],\n  \"reasoning\": \"...\",\n  \
         \"safety_coach_tips\": [\"tip1\", \"tip2\", \"tip3\"]\n}}\n\n\
         Transcript:\n{}",
        conversation
    )
}

/// Parse model text (possibly fenced) into a `CallAnalysis`
fn parse_model_output(text: &str) -> Result<CallAnalysis, AnalysisError> {
    let cleaned = RE_CODE_FENCE.replace_all(text, "");
    let remote: RemoteAssessment = serde_json::from_str(cleaned.trim())?;
    Ok(map_remote(remote))
}

fn map_remote(remote: RemoteAssessment) -> CallAnalysis {
    let risk = if remote.risk_score.is_finite() {
        remote.risk_score.clamp(0.0, MAX_SCORE as f64)
    } else {
        0.0
    };
    let emotional = ((risk / 10.0).ceil() as u8).clamp(1, 10);

    CallAnalysis {
        classification: if risk > REMOTE_FRAUD_THRESHOLD as f64 {
            Classification::PotentialFraud
        } else {
            Classification::Benign
        },
        emotional_risk_score: emotional,
        caller_type_assessment: if risk > REMOTE_SUSPICIOUS_THRESHOLD as f64 {
            CallerType::Suspicious
        } else {
            CallerType::Uncertain
        },
        key_indicators: remote.detected_indicators.unwrap_or_default(),
        reasoning: remote
            .reasoning
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| REMOTE_DEFAULT_REASONING.to_string()),
        safety_coach_tips: Some(remote.safety_coach_tips.unwrap_or_else(|| {
            vec![
                "Verify caller identity.".to_string(),
                "Do not share OTPs.".to_string(),
            ]
        })),
    }
}

// =============================================================================
// LOCAL FALLBACK
// =============================================================================

const FINANCIAL_TERMS: [&str; 3] = ["bank", "account", "credit"];
const URGENCY_TERMS: [&str; 3] = ["urgent", "immediately", "now"];
const SECRECY_TERMS: [&str; 3] = ["secret", "don't tell", "private"];
const SENSITIVE_TERMS: [&str; 4] = ["otp", "code", "cvv", "pin"];
const AUTHORITY_TERMS: [&str; 4] = ["police", "warrant", "arrest", "legal"];

fn mentions(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| text.contains(t))
}

/// Keyword combination analysis used whenever the remote path is unavailable
pub fn local_analysis(transcript: &[TranscriptLine]) -> CallAnalysis {
    let text = transcript
        .iter()
        .map(|l| l.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let financial = mentions(&text, &FINANCIAL_TERMS);
    let urgency = mentions(&text, &URGENCY_TERMS);
    let secrecy = mentions(&text, &SECRECY_TERMS);

    let mut risk: u8 = 1;
    let mut indicators: Vec<String> = Vec::new();

    if mentions(&text, &SENSITIVE_TERMS) {
        risk += 5;
        indicators.push("Sensitive Data Request".into());
    }

    if mentions(&text, &AUTHORITY_TERMS) {
        risk += 4;
        indicators.push("Authority Impersonation".into());
    }

    match (financial, urgency, secrecy) {
        (true, true, _) => {
            risk += 4;
            indicators.push("Financial + Urgency".into());
        }
        (true, false, true) => {
            risk += 4;
            indicators.push("Financial + Secrecy".into());
        }
        (true, false, false) => {
            risk += 1;
            indicators.push("Financial Mention".into());
        }
        (false, true, _) => {
            risk += 2;
            indicators.push("Urgency".into());
        }
        (false, false, _) => {}
    }

    let is_fraud = risk > FALLBACK_FRAUD_THRESHOLD;
    if indicators.is_empty() {
        indicators.push(NO_FLAGS_INDICATOR.into());
    }

    let tips: [&str; 3] = if is_fraud {
        [
            "Do not share OTPs with anyone.",
            "Hang up if pressured.",
            "Verify with the bank directly.",
        ]
    } else {
        [
            "Good job verifying the caller.",
            "Stay vigilant for future calls.",
            "Trusted contacts are safe.",
        ]
    };

    CallAnalysis {
        classification: if is_fraud {
            Classification::PotentialFraud
        } else {
            Classification::Benign
        },
        emotional_risk_score: risk.min(10),
        caller_type_assessment: if is_fraud {
            CallerType::Suspicious
        } else {
            CallerType::Uncertain
        },
        key_indicators: indicators,
        reasoning: FALLBACK_REASONING.to_string(),
        safety_coach_tips: Some(tips.iter().map(|t| t.to_string()).collect()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
