//! HTTP + WebSocket API for VoiceShield
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /call - Live call snapshot
//! - POST /call/start | /call/turn | /call/ignore | /call/end | /call/reset
//! - GET /history, GET /history/{id} - Finished calls
//! - GET /history/stats - Threats blocked and recent risk trend
//! - GET /settings, PUT /settings - User settings
//! - WS /ws - Live updates

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::core::session::{CallSession, CallSnapshot};
use crate::types::{CallLog, HistoryStats, Settings, Speaker, TurnOutcome};

/// Append turn request
#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub role: String,
    pub text: String,
    /// Interim recognition results are accepted but not recorded
    #[serde(default = "default_finalized")]
    pub finalized: bool,
}

fn default_finalized() -> bool {
    true
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub phase: String,
    pub calls_logged: usize,
}

/// Create the API router around a shared session
pub fn create_router(session: Arc<CallSession>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/call", get(get_call))
        .route("/call/start", post(start_call))
        .route("/call/turn", post(append_turn))
        .route("/call/ignore", post(ignore_alert))
        .route("/call/end", post(end_call))
        .route("/call/reset", post(reset_call))
        .route("/history", get(list_history))
        .route("/history/stats", get(history_stats))
        .route("/history/:id", get(get_history_entry))
        .route("/settings", get(get_settings).put(put_settings))
        .route("/ws", get(websocket_handler))
        .with_state(session)
}

/// Health check endpoint
async fn health(State(session): State<Arc<CallSession>>) -> Json<HealthResponse> {
    let snapshot = session.snapshot().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        phase: snapshot.phase.to_string(),
        calls_logged: session.history().await.len(),
    })
}

async fn get_call(State(session): State<Arc<CallSession>>) -> Json<CallSnapshot> {
    Json(session.snapshot().await)
}

async fn start_call(State(session): State<Arc<CallSession>>) -> Json<TurnOutcome> {
    Json(session.start_call().await)
}

/// Append a line from either side of the call
async fn append_turn(
    State(session): State<Arc<CallSession>>,
    Json(req): Json<TurnRequest>,
) -> Result<(StatusCode, Json<Option<TurnOutcome>>), StatusCode> {
    let speaker = Speaker::parse(&req.role).ok_or(StatusCode::BAD_REQUEST)?;

    match session.handle_utterance(speaker, &req.text, req.finalized).await {
        Some(out) => Ok((StatusCode::OK, Json(Some(out)))),
        None => Ok((StatusCode::ACCEPTED, Json(None))),
    }
}

async fn ignore_alert(State(session): State<Arc<CallSession>>) -> Json<TurnOutcome> {
    Json(session.ignore_alert().await)
}

/// End the live call and return its log
async fn end_call(State(session): State<Arc<CallSession>>) -> Result<Json<CallLog>, StatusCode> {
    session.end_call().await.map(Json).ok_or(StatusCode::CONFLICT)
}

async fn reset_call(State(session): State<Arc<CallSession>>) -> Json<TurnOutcome> {
    Json(session.reset().await)
}

async fn list_history(State(session): State<Arc<CallSession>>) -> Json<Vec<CallLog>> {
    Json(session.history().await)
}

async fn history_stats(State(session): State<Arc<CallSession>>) -> Json<HistoryStats> {
    Json(session.history_stats().await)
}

async fn get_history_entry(
    State(session): State<Arc<CallSession>>,
    Path(id): Path<String>,
) -> Result<Json<CallLog>, StatusCode> {
    session
        .history()
        .await
        .into_iter()
        .find(|c| c.id == id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_settings(State(session): State<Arc<CallSession>>) -> Json<Settings> {
    Json(session.settings().await)
}

async fn put_settings(
    State(session): State<Arc<CallSession>>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, StatusCode> {
    session.update_settings(settings).await.map_err(|e| {
        warn!("failed to save settings: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(session.settings().await))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(session): State<Arc<CallSession>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = session.subscribe();
    ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    })
}

/// Forward outcomes until the client goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<TurnOutcome>) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Ok(update) => {
                    let json = serde_json::to_string(&update).unwrap_or_default();
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("websocket client disconnected");
}

/// Run the API server
pub async fn run_server(
    addr: &str,
    session: Arc<CallSession>,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(session);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("VoiceShield API running on {}", addr);
    info!("  POST /call/start  POST /call/turn  POST /call/ignore  POST /call/end");
    info!("  GET  /call  GET /history  GET /history/stats  GET|PUT /settings  WS /ws");
    axum::serve(listener, router).await?;
    Ok(())
}
