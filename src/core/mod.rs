//! Core modules for VoiceShield

pub mod analyzer;
pub mod api;
pub mod call;
pub mod catalog;
pub mod scorer;
pub mod session;
pub mod store;

pub use analyzer::{local_analysis, CallAnalyzer, FraudAnalyzer, NO_FLAGS_INDICATOR};
pub use api::{create_router, run_server};
pub use call::CallEngine;
pub use catalog::SCAM_PATTERNS;
pub use scorer::RiskScorer;
pub use session::{CallSession, CallSnapshot};
pub use store::{load_settings, HistoryStore, HISTORY_FILE, SETTINGS_FILE};
