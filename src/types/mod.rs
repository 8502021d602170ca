//! Core types for VoiceShield

mod analysis;
mod assessment;
mod log;
mod output;
mod pattern;
mod reason;
mod settings;
mod state;
mod transcript;

pub use analysis::{CallAnalysis, CallerType, Classification};
pub use assessment::{RiskAssessment, ToneSignals};
pub use log::{CallLog, HistoryStats, UNKNOWN_CATEGORY};
pub use output::{AnalysisRequest, TurnOutcome};
pub use pattern::{ScamCategory, ScamPattern};
pub use reason::CallEvent;
pub use settings::{Language, RiskSensitivity, Settings};
pub use state::{CallPhase, CallState};
pub use transcript::{Speaker, TranscriptLine};
