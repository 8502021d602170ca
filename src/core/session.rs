//! Async facade over `CallEngine`
//!
//! Owns the engine behind a lock, runs remote analysis on spawned tasks and
//! broadcasts every outcome to observers. The analyzer is injected once; the
//! credential and guardian contact are resolved at call start.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::analyzer::CallAnalyzer;
use crate::core::call::CallEngine;
use crate::core::store::save_settings;
use crate::error::StoreError;
use crate::types::{
    AnalysisRequest, CallLog, CallPhase, CallState, HistoryStats, Settings, Speaker, TurnOutcome,
};

const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// Read-only view of the call for renderers
#[derive(Debug, Clone, Serialize)]
pub struct CallSnapshot {
    pub call_id: u64,
    pub phase: CallPhase,
    pub alert_visible: bool,
    pub state: CallState,
}

pub struct CallSession {
    engine: Arc<RwLock<CallEngine>>,
    analyzer: Arc<dyn CallAnalyzer>,
    settings: RwLock<Settings>,
    settings_path: Option<PathBuf>,
    /// Credential captured at call start
    credential: RwLock<Option<String>>,
    updates: broadcast::Sender<TurnOutcome>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl CallSession {
    pub fn new(engine: CallEngine, analyzer: Arc<dyn CallAnalyzer>, settings: Settings) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            engine: Arc::new(RwLock::new(engine)),
            analyzer,
            settings: RwLock::new(settings),
            settings_path: None,
            credential: RwLock::new(None),
            updates,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Persist settings changes to `path`
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    pub async fn start_call(&self) -> TurnOutcome {
        let settings = self.settings.read().await.clone();
        let mut engine = self.engine.write().await;
        if !engine.is_live() {
            engine.set_guardian(settings.guardian().map(str::to_string));
            *self.credential.write().await = settings.api_key().map(str::to_string);
        }
        let out = engine.start_call();
        self.publish(&out);
        out
    }

    /// Append a finalized line and kick off remote analysis if it was scored
    ///
    /// The outcome is published before the analysis task exists, so observers
    /// never see the heuristic score after a merged one.
    pub async fn append_turn(&self, speaker: Speaker, text: &str) -> TurnOutcome {
        let out = {
            let mut engine = self.engine.write().await;
            let out = engine.append_turn(speaker, text);
            self.publish(&out);
            out
        };
        if let Some(request) = out.pending_analysis.clone() {
            self.spawn_analysis(request).await;
        }
        out
    }

    /// Entry point for the speech-capture callback; interim results are skipped
    pub async fn handle_utterance(
        &self,
        speaker: Speaker,
        text: &str,
        finalized: bool,
    ) -> Option<TurnOutcome> {
        if !finalized {
            debug!(%speaker, "interim utterance skipped");
            return None;
        }
        Some(self.append_turn(speaker, text).await)
    }

    /// Capture errors are logged only; they never touch the call
    pub fn report_capture_error(&self, speaker: Speaker, message: &str) {
        warn!(%speaker, "speech capture error: {}", message);
    }

    pub async fn ignore_alert(&self) -> TurnOutcome {
        let mut engine = self.engine.write().await;
        let out = engine.ignore_alert();
        self.publish(&out);
        out
    }

    /// End the live call; in-flight analyses that land afterwards are dropped
    pub async fn end_call(&self) -> Option<CallLog> {
        let mut engine = self.engine.write().await;
        let log = engine.end_call()?;

        let mut out = TurnOutcome::new(
            engine.phase(),
            engine.state().current_risk_score,
            engine.state().trust_score,
        );
        out.events.push(crate::types::CallEvent::V001_CALL_ENDED);
        self.publish(&out);
        Some(log)
    }

    pub async fn reset(&self) -> TurnOutcome {
        let out = {
            let mut engine = self.engine.write().await;
            let out = engine.reset();
            self.publish(&out);
            out
        };
        *self.credential.write().await = None;
        out
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub async fn snapshot(&self) -> CallSnapshot {
        let engine = self.engine.read().await;
        CallSnapshot {
            call_id: engine.call_id(),
            phase: engine.phase(),
            alert_visible: engine.alert_visible(),
            state: engine.state().clone(),
        }
    }

    /// Finished calls, newest first
    pub async fn history(&self) -> Vec<CallLog> {
        self.engine.read().await.history().entries().to_vec()
    }

    pub async fn history_stats(&self) -> HistoryStats {
        self.engine.read().await.history().stats()
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Replace settings; takes effect at the next call start
    pub async fn update_settings(&self, settings: Settings) -> Result<(), StoreError> {
        if let Some(path) = &self.settings_path {
            save_settings(&settings, path)?;
        }
        *self.settings.write().await = settings;
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TurnOutcome> {
        self.updates.subscribe()
    }

    /// Wait for every analysis spawned so far to merge
    pub async fn settle(&self) {
        let handles: Vec<_> = self.in_flight.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("analysis task failed: {}", e);
            }
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    async fn spawn_analysis(&self, request: AnalysisRequest) {
        let engine = Arc::clone(&self.engine);
        let analyzer = Arc::clone(&self.analyzer);
        let updates = self.updates.clone();
        let credential = self.credential.read().await.clone();

        let handle = tokio::spawn(async move {
            let analysis = analyzer.analyze(&request.lines, credential.as_deref()).await;
            let mut engine = engine.write().await;
            let out = engine.apply_analysis(request.call_id, analysis);
            let _ = updates.send(out);
        });

        let mut in_flight = self.in_flight.lock().await;
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }

    /// Callers hold the engine write guard so broadcast order matches merge order
    fn publish(&self, out: &TurnOutcome) {
        // no subscribers is fine
        let _ = self.updates.send(out.clone());
    }
}
