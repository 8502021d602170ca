//! Per-operation output of the call engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CallEvent, CallPhase, RiskAssessment, TranscriptLine};

/// Work order for the remote analyzer, tagged with the call it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub call_id: u64,
    pub lines: Vec<TranscriptLine>,
}

/// What happened on one engine operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub timestamp: DateTime<Utc>,
    pub phase: CallPhase,
    pub risk_score: u32,
    pub trust_score: u32,
    /// Events in the order they fired
    pub events: Vec<CallEvent>,
    /// Heuristic result, if the line was scored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<RiskAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whisper_message: Option<String>,
    /// Remote analysis to run, if the line qualified
    #[serde(skip)]
    pub pending_analysis: Option<AnalysisRequest>,
}

impl TurnOutcome {
    pub fn new(phase: CallPhase, risk_score: u32, trust_score: u32) -> Self {
        Self {
            timestamp: Utc::now(),
            phase,
            risk_score,
            trust_score,
            events: Vec::new(),
            assessment: None,
            whisper_message: None,
            pending_analysis: None,
        }
    }

    pub fn has(&self, event: CallEvent) -> bool {
        self.events.contains(&event)
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        use colored::Colorize;
        let line = format!(
            "{} risk={} | trust={} | state={} | {}",
            self.phase.emoji(),
            self.risk_score,
            self.trust_score,
            self.phase,
            self.last_code(),
        );
        line.color(self.phase.color()).to_string()
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "risk={} | trust={} | state={} | events={}",
            self.risk_score,
            self.trust_score,
            self.phase,
            self.events
                .iter()
                .map(|e| e.code())
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    fn last_code(&self) -> &'static str {
        self.events.last().map(|e| e.code()).unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parseable_string() {
        let mut out = TurnOutcome::new(CallPhase::Active, 45, 55);
        out.events.push(CallEvent::V002_TURN_SCORED);
        out.events.push(CallEvent::V003_CAUTION_CROSSED);
        assert_eq!(
            out.to_parseable_string(),
            "risk=45 | trust=55 | state=ACTIVE | events=V002_TURN_SCORED,V003_CAUTION_CROSSED"
        );
        assert!(out.has(CallEvent::V003_CAUTION_CROSSED));
    }

    #[test]
    fn test_pending_analysis_not_serialized() {
        let mut out = TurnOutcome::new(CallPhase::Active, 0, 100);
        out.pending_analysis = Some(AnalysisRequest { call_id: 1, lines: vec![] });
        let json = serde_json::to_string(&out).unwrap();
        assert!(!json.contains("pending_analysis"));
    }
}
