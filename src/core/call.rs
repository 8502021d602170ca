//! Call engine: lifecycle state machine with edge-triggered side effects
//!
//! Phase transitions:
//! - IDLE → ACTIVE: start
//! - ACTIVE → ALERT_RAISED: risk ≥ 60 and alert not ignored
//! - ALERT_RAISED → ACTIVE: alert ignored (sticky for the call)
//! - ACTIVE/ALERT_RAISED → ENDED: end (log appended to history)
//! - ENDED → IDLE: reset
//!
//! Scores only move up within a call. Threshold side effects fire once, on
//! the first upward crossing.

use chrono::{DateTime, Local, Utc};
use rand::Rng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::analyzer::NO_FLAGS_INDICATOR;
use crate::core::store::HistoryStore;
use crate::core::scorer::RiskScorer;
use crate::types::{
    AnalysisRequest, CallAnalysis, CallEvent, CallLog, CallPhase, CallState, Speaker,
    TranscriptLine, TurnOutcome, UNKNOWN_CATEGORY,
};
use crate::{
    ALERT_LOG_THRESHOLD, ALERT_THRESHOLD, CAUTION_THRESHOLD, CAUTION_WHISPER, CRITICAL_THRESHOLD,
    CRITICAL_WHISPER, CYBER_CELL_PREFIX, MAX_SCORE, WARM_UP_LINES,
};

/// Placeholder caller metadata for the simulated line
const SIMULATED_CALLER_NUMBER: &str = "+1 (555) 019-2834";
const SIMULATED_RELATIONSHIP: &str = "Unknown";

/// Owner of the live `CallState`; the only place it is mutated
#[derive(Debug)]
pub struct CallEngine {
    phase: CallPhase,
    state: CallState,
    scorer: RiskScorer,
    history: HistoryStore,
    guardian_contact: Option<String>,
    /// Bumped on every start; tags remote analysis requests
    call_id: u64,
    started_at: Option<DateTime<Utc>>,
    caution_fired: bool,
    critical_fired: bool,
}

impl Default for CallEngine {
    fn default() -> Self {
        Self::new(HistoryStore::in_memory())
    }
}

impl CallEngine {
    /// Create an idle engine writing finished calls to `history`
    pub fn new(history: HistoryStore) -> Self {
        Self {
            phase: CallPhase::Idle,
            state: CallState::baseline(),
            scorer: RiskScorer::new(),
            history,
            guardian_contact: None,
            call_id: 0,
            started_at: None,
            caution_fired: false,
            critical_fired: false,
        }
    }

    /// Configure the guardian contact used by the critical side effect
    pub fn with_guardian(mut self, contact: Option<String>) -> Self {
        self.set_guardian(contact);
        self
    }

    pub fn set_guardian(&mut self, contact: Option<String>) {
        self.guardian_contact = contact.filter(|c| !c.trim().is_empty());
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Begin a new call with every per-call field at baseline
    pub fn start_call(&mut self) -> TurnOutcome {
        if self.phase.is_live() {
            warn!(call_id = self.call_id, "start requested while a call is live");
            return self.outcome_with(CallEvent::V006_ALREADY_LIVE);
        }

        self.clear();
        self.call_id += 1;
        self.started_at = Some(Utc::now());
        self.state.is_active = true;
        self.phase = CallPhase::Active;

        info!(call_id = self.call_id, "call started");
        self.outcome_with(CallEvent::V001_CALL_STARTED)
    }

    /// Append a finalized line; caller lines past warm-up are scored
    pub fn append_turn(&mut self, sender: Speaker, text: &str) -> TurnOutcome {
        if !self.phase.is_live() {
            debug!(phase = %self.phase, "turn dropped: no live call");
            return self.outcome_with(CallEvent::V006_NOT_LIVE);
        }

        let text = text.trim();
        if text.is_empty() {
            return self.outcome();
        }

        let prior_lines = self.state.transcript.len();
        let line = TranscriptLine::new(sender, text);
        self.state.transcript.push(line.clone());

        let mut out = self.outcome_with(CallEvent::V002_TURN_APPENDED);

        if sender != Speaker::Caller {
            return out;
        }
        if prior_lines < WARM_UP_LINES {
            out.events.push(CallEvent::V002_WARM_UP);
            return out;
        }

        let assessment = self.scorer.score(text, self.state.current_risk_score);
        out.events.push(CallEvent::V002_TURN_SCORED);
        debug!(
            score = assessment.score,
            labels = ?assessment.detected_labels,
            "caller line scored"
        );

        let merged = assessment.score.max(self.state.current_risk_score);
        self.merge_score(merged, &assessment.detected_labels, &mut out);

        out.assessment = Some(assessment);
        out.pending_analysis = Some(AnalysisRequest {
            call_id: self.call_id,
            lines: vec![line],
        });
        self.refresh(&mut out);
        out
    }

    /// Merge a remote/fallback analysis produced for `call_id`
    ///
    /// Results for a previous call, or arriving after the call ended, are
    /// dropped. The analysis score only wins if it beats the current one.
    pub fn apply_analysis(&mut self, call_id: u64, analysis: CallAnalysis) -> TurnOutcome {
        if call_id != self.call_id || !self.phase.is_live() {
            debug!(call_id, current = self.call_id, "stale analysis discarded");
            return self.outcome_with(CallEvent::V002_ANALYSIS_STALE);
        }

        let scaled = analysis.scaled_risk();
        let mut out = self.outcome();

        if scaled > self.state.current_risk_score {
            let labels: Vec<String> = analysis
                .key_indicators
                .iter()
                .filter(|k| k.as_str() != NO_FLAGS_INDICATOR)
                .cloned()
                .collect();
            out.events.push(CallEvent::V002_ANALYSIS_MERGED);
            info!(from = self.state.current_risk_score, to = scaled, "analysis raised risk");
            self.merge_score(scaled, &labels, &mut out);
        } else {
            out.events.push(CallEvent::V002_ANALYSIS_BELOW_SCORE);
        }

        self.state.last_analysis = Some(analysis);
        self.refresh(&mut out);
        out
    }

    /// Dismiss the high-risk prompt for the rest of the call
    pub fn ignore_alert(&mut self) -> TurnOutcome {
        if !self.phase.is_live() {
            return self.outcome_with(CallEvent::V006_NOT_LIVE);
        }
        self.state.is_alert_ignored = true;
        info!(call_id = self.call_id, "alert ignored");

        let mut out = self.outcome_with(CallEvent::V005_ALERT_IGNORED);
        self.refresh(&mut out);
        out
    }

    /// Freeze the call into a `CallLog` and append it to history
    ///
    /// Returns `None` when no call is live.
    pub fn end_call(&mut self) -> Option<CallLog> {
        if !self.phase.is_live() {
            debug!(phase = %self.phase, "end requested with no live call");
            return None;
        }

        let log = self.build_log();
        if let Err(e) = self.history.append(log.clone()) {
            warn!("failed to persist call history: {}", e);
        }

        self.state.is_active = false;
        self.phase = CallPhase::Ended;
        info!(
            call_id = self.call_id,
            risk = log.risk_score,
            report = ?log.cyber_cell_report_id,
            "call ended"
        );
        Some(log)
    }

    /// Drop all per-call data and return to IDLE
    pub fn reset(&mut self) -> TurnOutcome {
        if self.phase.is_live() {
            warn!(call_id = self.call_id, "live call reset without logging");
        }
        self.clear();
        self.phase = CallPhase::Idle;
        self.outcome_with(CallEvent::V001_CALL_RESET)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Raise the score (never lower it) and fire threshold side effects
    fn merge_score(&mut self, candidate: u32, labels: &[String], out: &mut TurnOutcome) {
        let previous = self.state.current_risk_score;
        let next = candidate.min(MAX_SCORE).max(previous);

        self.state.current_risk_score = next;
        self.state.trust_score = CallState::trust_for(next);

        for label in labels {
            if !self.state.detected_patterns.contains(label) {
                self.state.detected_patterns.push(label.clone());
            }
        }

        if !self.caution_fired && previous <= CAUTION_THRESHOLD && next > CAUTION_THRESHOLD {
            self.caution_fired = true;
            self.state.whisper_message = Some(CAUTION_WHISPER.to_string());
            out.events.push(CallEvent::V003_CAUTION_CROSSED);
            info!(risk = next, "caution threshold crossed");
        }

        if !self.critical_fired && previous <= CRITICAL_THRESHOLD && next > CRITICAL_THRESHOLD {
            self.critical_fired = true;
            self.state.whisper_message = Some(CRITICAL_WHISPER.to_string());
            out.events.push(CallEvent::V003_CRITICAL_CROSSED);
            info!(risk = next, "critical threshold crossed");

            if self.guardian_contact.is_some() && !self.state.guardian_notified {
                self.state.guardian_notified = true;
                out.events.push(CallEvent::V004_GUARDIAN_NOTIFIED);
                info!(contact = ?self.guardian_contact, "guardian notified (simulated)");
            }

            if self.state.cyber_cell_report_id.is_none() {
                let id = mint_report_id();
                info!(report = %id, "cyber-cell report filed (simulated)");
                self.state.cyber_cell_report_id = Some(id);
                out.events.push(CallEvent::V004_REPORT_FILED);
            }
        }
    }

    /// Recompute the live phase and copy state into the outcome
    fn refresh(&mut self, out: &mut TurnOutcome) {
        if self.phase.is_live() {
            let next = if self.state.current_risk_score >= ALERT_THRESHOLD
                && !self.state.is_alert_ignored
            {
                CallPhase::AlertRaised
            } else {
                CallPhase::Active
            };

            if next == CallPhase::AlertRaised && self.phase != CallPhase::AlertRaised {
                out.events.push(CallEvent::V005_ALERT_RAISED);
                warn!(risk = self.state.current_risk_score, "high-risk alert raised");
            }
            self.phase = next;
        }

        out.phase = self.phase;
        out.risk_score = self.state.current_risk_score;
        out.trust_score = self.state.trust_score;
        out.whisper_message = self.state.whisper_message.clone();
    }

    fn build_log(&self) -> CallLog {
        let now = Local::now();
        let duration_seconds = self
            .started_at
            .map(|s| (Utc::now() - s).num_seconds().max(0) as u64)
            .unwrap_or(0);

        CallLog {
            id: Uuid::new_v4().to_string(),
            date: now.format("%d/%m/%Y").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            duration_seconds,
            caller_number: SIMULATED_CALLER_NUMBER.to_string(),
            caller_relationship: SIMULATED_RELATIONSHIP.to_string(),
            risk_score: self.state.current_risk_score,
            transcript: self.state.transcript.clone(),
            analysis: self.state.last_analysis.clone(),
            alert_triggered: self.state.current_risk_score >= ALERT_LOG_THRESHOLD,
            scam_category: Some(
                self.state
                    .detected_patterns
                    .first()
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            ),
            cyber_cell_report_id: self.state.cyber_cell_report_id.clone(),
        }
    }

    fn clear(&mut self) {
        self.state = CallState::baseline();
        self.started_at = None;
        self.caution_fired = false;
        self.critical_fired = false;
    }

    fn outcome(&self) -> TurnOutcome {
        let mut out = TurnOutcome::new(
            self.phase,
            self.state.current_risk_score,
            self.state.trust_score,
        );
        out.whisper_message = self.state.whisper_message.clone();
        out
    }

    fn outcome_with(&self, event: CallEvent) -> TurnOutcome {
        let mut out = self.outcome();
        out.events.push(event);
        out
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn phase(&self) -> CallPhase {
        self.phase
    }

    pub fn state(&self) -> &CallState {
        &self.state
    }

    pub fn is_live(&self) -> bool {
        self.phase.is_live()
    }

    /// Id of the current (or last) call
    pub fn call_id(&self) -> u64 {
        self.call_id
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// True while the blocking high-risk prompt should be on screen
    pub fn alert_visible(&self) -> bool {
        self.phase == CallPhase::AlertRaised
    }
}

/// "CC-" followed by six random digits
fn mint_report_id() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    format!("{}{}", CYBER_CELL_PREFIX, n)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallerType, Classification};

    fn analysis(score: u8, indicators: &[&str]) -> CallAnalysis {
        CallAnalysis {
            classification: Classification::PotentialFraud,
            emotional_risk_score: score,
            caller_type_assessment: CallerType::Suspicious,
            key_indicators: indicators.iter().map(|s| s.to_string()).collect(),
            reasoning: "test".into(),
            safety_coach_tips: None,
        }
    }

    fn warmed_up() -> CallEngine {
        let mut engine = CallEngine::default().with_guardian(Some("+91 90000 00000".into()));
        engine.start_call();
        engine.append_turn(Speaker::Caller, "hello");
        engine.append_turn(Speaker::Receiver, "hi, who is this?");
        engine
    }

    #[test]
    fn test_initial_phase_is_idle() {
        let engine = CallEngine::default();
        assert_eq!(engine.phase(), CallPhase::Idle);
        assert_eq!(engine.state(), &CallState::baseline());
    }

    #[test]
    fn test_start_call() {
        let mut engine = CallEngine::default();
        let out = engine.start_call();
        assert_eq!(out.phase, CallPhase::Active);
        assert!(engine.state().is_active);
        assert_eq!(engine.call_id(), 1);
    }

    #[test]
    fn test_double_start_is_noop() {
        let mut engine = warmed_up();
        let out = engine.start_call();
        assert!(out.has(CallEvent::V006_ALREADY_LIVE));
        assert_eq!(engine.state().transcript.len(), 2);
        assert_eq!(engine.call_id(), 1);
    }

    #[test]
    fn test_operations_while_idle_are_noops() {
        let mut engine = CallEngine::default();
        let out = engine.append_turn(Speaker::Caller, "otp now");
        assert!(out.has(CallEvent::V006_NOT_LIVE));
        assert!(engine.state().transcript.is_empty());
        assert!(engine.end_call().is_none());
        assert!(engine.ignore_alert().has(CallEvent::V006_NOT_LIVE));
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_warm_up_suppresses_scoring() {
        let mut engine = CallEngine::default();
        engine.start_call();
        let out = engine.append_turn(Speaker::Caller, "share the otp");
        assert!(out.has(CallEvent::V002_WARM_UP));
        assert!(out.pending_analysis.is_none());
        assert_eq!(engine.state().current_risk_score, 0);
    }

    #[test]
    fn test_receiver_lines_not_scored() {
        let mut engine = warmed_up();
        let out = engine.append_turn(Speaker::Receiver, "my otp is 1234");
        assert!(!out.has(CallEvent::V002_TURN_SCORED));
        assert_eq!(engine.state().current_risk_score, 0);
    }

    #[test]
    fn test_blank_line_ignored() {
        let mut engine = warmed_up();
        let out = engine.append_turn(Speaker::Caller, "   ");
        assert!(out.events.is_empty());
        assert_eq!(engine.state().transcript.len(), 2);
    }

    #[test]
    fn test_caller_scored_after_warm_up() {
        let mut engine = warmed_up();
        let out = engine.append_turn(Speaker::Caller, "is this your bank account?");
        assert!(out.has(CallEvent::V002_TURN_SCORED));
        assert_eq!(out.risk_score, 5);
        assert_eq!(out.trust_score, 95);
        let req = out.pending_analysis.unwrap();
        assert_eq!(req.call_id, 1);
        assert_eq!(req.lines.len(), 1);
    }

    #[test]
    fn test_trust_mirrors_risk() {
        let mut engine = warmed_up();
        for text in ["bank", "urgent", "secret", "otp"] {
            engine.append_turn(Speaker::Caller, text);
            let s = engine.state();
            assert_eq!(s.trust_score, 100 - s.current_risk_score);
        }
    }

    #[test]
    fn test_caution_whisper() {
        let mut engine = warmed_up();
        let out = engine.append_turn(Speaker::Caller, "your bank account needs urgent action");
        assert_eq!(out.risk_score, 45);
        assert!(out.has(CallEvent::V003_CAUTION_CROSSED));
        assert!(!out.has(CallEvent::V003_CRITICAL_CROSSED));
        assert_eq!(out.whisper_message.as_deref(), Some(CAUTION_WHISPER));
        assert_eq!(out.phase, CallPhase::Active);
    }

    #[test]
    fn test_jump_past_both_thresholds() {
        let mut engine = warmed_up();
        let out = engine.append_turn(Speaker::Caller, "read out the code from your bank immediately");
        assert!(out.has(CallEvent::V003_CAUTION_CROSSED));
        assert!(out.has(CallEvent::V003_CRITICAL_CROSSED));
        assert_eq!(out.whisper_message.as_deref(), Some(CRITICAL_WHISPER));
        assert!(engine.state().guardian_notified);
        assert_eq!(out.phase, CallPhase::AlertRaised);
    }

    #[test]
    fn test_edge_triggered_under_oscillation() {
        let mut engine = warmed_up();
        let mut fired = Vec::new();
        for score in [55, 65, 55, 65, 55, 65] {
            let mut out = engine.outcome();
            engine.merge_score(score, &[], &mut out);
            fired.extend(out.events);
        }
        let count = |e: CallEvent| fired.iter().filter(|x| **x == e).count();
        assert_eq!(count(CallEvent::V003_CAUTION_CROSSED), 1);
        assert_eq!(count(CallEvent::V003_CRITICAL_CROSSED), 1);
        assert_eq!(count(CallEvent::V004_GUARDIAN_NOTIFIED), 1);
        assert_eq!(count(CallEvent::V004_REPORT_FILED), 1);
        // never moves backward
        assert_eq!(engine.state().current_risk_score, 65);
    }

    #[test]
    fn test_report_id_minted_once() {
        let mut engine = warmed_up();
        engine.append_turn(Speaker::Caller, "tell me the otp from your bank immediately");
        let id = engine.state().cyber_cell_report_id.clone().unwrap();
        assert!(id.starts_with(CYBER_CELL_PREFIX));
        assert_eq!(id.len(), CYBER_CELL_PREFIX.len() + 6);
        assert!(id[CYBER_CELL_PREFIX.len()..].chars().all(|c| c.is_ascii_digit()));

        for text in ["cvv now", "police arrest", "secret hacker"] {
            engine.append_turn(Speaker::Caller, text);
            assert_eq!(engine.state().cyber_cell_report_id.as_ref(), Some(&id));
        }
        engine.apply_analysis(1, analysis(10, &[]));
        assert_eq!(engine.state().cyber_cell_report_id.as_ref(), Some(&id));
    }

    #[test]
    fn test_guardian_requires_contact() {
        let mut engine = CallEngine::default();
        engine.start_call();
        engine.append_turn(Speaker::Caller, "hi");
        engine.append_turn(Speaker::Caller, "hi again");
        engine.append_turn(Speaker::Caller, "otp cvv now");
        assert!(engine.state().current_risk_score > CRITICAL_THRESHOLD);
        assert!(!engine.state().guardian_notified);
        assert!(engine.state().cyber_cell_report_id.is_some());
    }

    #[test]
    fn test_alert_raised_at_sixty_without_critical_effects() {
        let mut engine = warmed_up();
        let out = engine.apply_analysis(1, analysis(6, &["Pressure"]));
        assert_eq!(out.risk_score, 60);
        assert_eq!(out.phase, CallPhase::AlertRaised);
        assert!(out.has(CallEvent::V005_ALERT_RAISED));
        assert!(!out.has(CallEvent::V003_CRITICAL_CROSSED));
        assert!(engine.state().cyber_cell_report_id.is_none());
    }

    #[test]
    fn test_ignore_alert_is_sticky() {
        let mut engine = warmed_up();
        engine.append_turn(Speaker::Caller, "give me the otp immediately");
        assert_eq!(engine.phase(), CallPhase::AlertRaised);

        let out = engine.ignore_alert();
        assert_eq!(out.phase, CallPhase::Active);
        assert!(!engine.alert_visible());

        let out = engine.append_turn(Speaker::Caller, "police will arrest you, share the cvv");
        assert!(out.has(CallEvent::V002_TURN_SCORED));
        assert!(!out.has(CallEvent::V005_ALERT_RAISED));
        assert_eq!(engine.phase(), CallPhase::Active);
        assert!(engine.state().is_alert_ignored);
    }

    #[test]
    fn test_analysis_merge_rule() {
        let mut engine = warmed_up();
        engine.append_turn(Speaker::Caller, "your bank account needs urgent action");
        assert_eq!(engine.state().current_risk_score, 45);

        // lower than current: ignored for scoring, kept as closing analysis
        let out = engine.apply_analysis(1, analysis(3, &["Low"]));
        assert!(out.has(CallEvent::V002_ANALYSIS_BELOW_SCORE));
        assert_eq!(engine.state().current_risk_score, 45);
        assert_eq!(engine.state().last_analysis.as_ref().unwrap().emotional_risk_score, 3);

        let out = engine.apply_analysis(1, analysis(5, &["Financial + Urgency", "No specific flags"]));
        assert!(out.has(CallEvent::V002_ANALYSIS_MERGED));
        assert_eq!(engine.state().current_risk_score, 50);
        assert!(engine
            .state()
            .detected_patterns
            .contains(&"Financial + Urgency".to_string()));
        assert!(!engine
            .state()
            .detected_patterns
            .contains(&NO_FLAGS_INDICATOR.to_string()));
    }

    #[test]
    fn test_stale_analysis_discarded() {
        let mut engine = warmed_up();
        engine.end_call();
        let out = engine.apply_analysis(1, analysis(9, &[]));
        assert!(out.has(CallEvent::V002_ANALYSIS_STALE));
        assert_eq!(engine.state().current_risk_score, 0);

        engine.start_call();
        let out = engine.apply_analysis(1, analysis(9, &[]));
        assert!(out.has(CallEvent::V002_ANALYSIS_STALE));
        assert_eq!(engine.state().current_risk_score, 0);
    }

    #[test]
    fn test_end_call_builds_log() {
        let mut engine = warmed_up();
        engine.append_turn(Speaker::Caller, "which bank do you use? it's urgent");
        let log = engine.end_call().unwrap();

        assert_eq!(engine.phase(), CallPhase::Ended);
        assert!(!engine.state().is_active);
        assert_eq!(log.risk_score, 45);
        assert!(log.alert_triggered);
        assert_eq!(log.transcript.len(), 3);
        assert_eq!(log.scam_category.as_deref(), Some("General Financial Terminology"));
        assert!(log.cyber_cell_report_id.is_none());
        assert_eq!(engine.history().len(), 1);

        // ENDED keeps the final state readable; a second end is a no-op
        assert_eq!(engine.state().current_risk_score, 45);
        assert!(engine.end_call().is_none());
    }

    #[test]
    fn test_scam_category_is_first_label_of_call() {
        let mut engine = warmed_up();
        engine.append_turn(Speaker::Caller, "is this your bank account?");
        engine.append_turn(Speaker::Caller, "now tell me the otp");

        let patterns = &engine.state().detected_patterns;
        assert_eq!(patterns[0], "General Financial Terminology");
        assert!(patterns.contains(&"Soliciting OTP (High Risk)".to_string()));

        // The later, riskier turn does not displace the first label
        let log = engine.end_call().unwrap();
        assert_eq!(log.risk_score, 40);
        assert_eq!(log.scam_category.as_deref(), Some("General Financial Terminology"));
    }

    #[test]
    fn test_quiet_call_log() {
        let mut engine = warmed_up();
        let log = engine.end_call().unwrap();
        assert!(!log.alert_triggered);
        assert_eq!(log.scam_category.as_deref(), Some(UNKNOWN_CATEGORY));
        assert!(log.analysis.is_none());
    }

    #[test]
    fn test_reset_returns_to_baseline() {
        let mut engine = warmed_up();
        engine.append_turn(Speaker::Caller, "otp immediately, cvv too");
        engine.ignore_alert();
        engine.end_call();

        let out = engine.reset();
        assert_eq!(out.phase, CallPhase::Idle);
        assert_eq!(engine.state(), &CallState::baseline());

        engine.start_call();
        let s = engine.state();
        assert_eq!(s.current_risk_score, 0);
        assert_eq!(s.trust_score, 100);
        assert!(s.transcript.is_empty());
        assert!(s.cyber_cell_report_id.is_none());
        assert!(!s.is_alert_ignored);
        assert!(!s.guardian_notified);
        assert_eq!(engine.call_id(), 2);
    }

    #[test]
    fn test_start_from_ended_resets() {
        let mut engine = warmed_up();
        engine.append_turn(Speaker::Caller, "otp immediately");
        engine.end_call();
        let out = engine.start_call();
        assert!(out.has(CallEvent::V001_CALL_STARTED));
        assert_eq!(engine.state().current_risk_score, 0);
        assert!(engine.state().whisper_message.is_none());
    }

    #[test]
    fn test_side_effects_refire_in_next_call() {
        let mut engine = warmed_up();
        engine.append_turn(Speaker::Caller, "otp from your bank immediately");
        engine.end_call();
        engine.reset();

        engine.start_call();
        engine.append_turn(Speaker::Caller, "hello");
        engine.append_turn(Speaker::Caller, "hello again");
        let out = engine.append_turn(Speaker::Caller, "otp from your bank immediately");
        assert!(out.has(CallEvent::V003_CRITICAL_CROSSED));
        assert!(engine.state().cyber_cell_report_id.is_some());
        assert_eq!(engine.history().len(), 1);
    }
}
