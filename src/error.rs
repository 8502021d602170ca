//! Error types for fallible I/O
//!
//! Scoring and call transitions never fail; only persistence and the
//! remote transport do.

use thiserror::Error;

/// History / settings persistence failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Remote analysis failures. Never leaves the analyzer.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote returned HTTP {0}")]
    Status(u16),
    #[error("remote response had no text candidate")]
    EmptyResponse,
    #[error("model output is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}
