//! JSON persistence for call history and settings
//!
//! Only history and settings survive a restart; the live call never touches disk.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::types::{CallLog, HistoryStats, Settings};
use crate::RISK_TREND_LEN;

pub const HISTORY_FILE: &str = "history.json";
pub const SETTINGS_FILE: &str = "settings.json";

/// Save a value as pretty JSON, creating the parent directory
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.display().to_string(),
        source,
    })?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;
    }

    std::fs::write(path, json).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load a JSON value; a missing file is `Ok(None)`
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    serde_json::from_str(&json)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })
}

// =============================================================================
// HISTORY
// =============================================================================

/// Append-only log of finished calls, newest first
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<CallLog>,
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// History that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load history from `path` (empty if the file does not exist yet)
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries: Vec<CallLog> = load_json(&path)?.unwrap_or_default();
        info!(path = %path.display(), calls = entries.len(), "history loaded");
        Ok(Self {
            entries,
            path: Some(path),
        })
    }

    /// Record a finished call. The in-memory entry is kept even if the write fails.
    pub fn append(&mut self, log: CallLog) -> Result<(), StoreError> {
        self.entries.insert(0, log);
        if let Some(path) = &self.path {
            save_json(&self.entries, path)?;
            debug!(path = %path.display(), "history saved");
        }
        Ok(())
    }

    /// All calls, newest first
    pub fn entries(&self) -> &[CallLog] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&CallLog> {
        self.entries.iter().find(|c| c.id == id)
    }

    /// Counts plus the risk of the last `RISK_TREND_LEN` calls, oldest first
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            calls_logged: self.entries.len(),
            threats_blocked: self.entries.iter().filter(|c| c.is_threat()).count(),
            alerts_triggered: self.entries.iter().filter(|c| c.alert_triggered).count(),
            risk_trend: self
                .entries
                .iter()
                .take(RISK_TREND_LEN)
                .rev()
                .map(|c| c.risk_score)
                .collect(),
        }
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Load settings from `path`, falling back to defaults, then apply env overrides
pub fn load_settings(path: &Path) -> Result<Settings, StoreError> {
    let settings: Settings = load_json(path)?.unwrap_or_default();
    Ok(settings.with_env_overrides())
}

pub fn save_settings(settings: &Settings, path: &Path) -> Result<(), StoreError> {
    save_json(settings, path)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        CallAnalysis, CallerType, Classification, RiskSensitivity, UNKNOWN_CATEGORY,
    };

    fn make_log(id: &str, risk: u32) -> CallLog {
        CallLog {
            id: id.to_string(),
            date: "01/02/2026".into(),
            time: "10:00:00".into(),
            duration_seconds: 42,
            caller_number: "+1 (555) 000-0000".into(),
            caller_relationship: "Unknown".into(),
            risk_score: risk,
            transcript: vec![],
            analysis: None,
            alert_triggered: risk >= 30,
            scam_category: Some(UNKNOWN_CATEGORY.into()),
            cyber_cell_report_id: None,
        }
    }

    #[test]
    fn test_in_memory_history_newest_first() {
        let mut history = HistoryStore::in_memory();
        history.append(make_log("a", 10)).unwrap();
        history.append(make_log("b", 80)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].id, "b");
        assert_eq!(history.find("a").map(|c| c.risk_score), Some(10));
    }

    #[test]
    fn test_stats_count_threats_and_trend_oldest_first() {
        let mut history = HistoryStore::in_memory();
        assert_eq!(history.stats(), HistoryStats::default());

        let verdict = |classification| CallAnalysis {
            classification,
            emotional_risk_score: 8,
            caller_type_assessment: CallerType::Unknown,
            key_indicators: vec![],
            reasoning: "test".into(),
            safety_coach_tips: None,
        };
        for risk in 1..=12 {
            let mut log = make_log(&format!("call-{}", risk), risk * 5);
            if risk % 4 == 0 {
                log.analysis = Some(verdict(Classification::PotentialFraud));
            } else if risk == 1 {
                log.analysis = Some(verdict(Classification::Benign));
            }
            history.append(log).unwrap();
        }

        let stats = history.stats();
        assert_eq!(stats.calls_logged, 12);
        assert_eq!(stats.threats_blocked, 3);
        // risk >= 30 from the sixth call on
        assert_eq!(stats.alerts_triggered, 7);
        assert_eq!(stats.risk_trend, vec![15, 20, 25, 30, 35, 40, 45, 50, 55, 60]);
    }

    #[test]
    fn test_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(HISTORY_FILE);

        let mut history = HistoryStore::open(&path).unwrap();
        assert!(history.is_empty());
        history.append(make_log("first", 20)).unwrap();
        history.append(make_log("second", 70)).unwrap();

        let reopened = HistoryStore::open(&path).unwrap();
        assert_eq!(reopened.entries(), history.entries());
    }

    #[test]
    fn test_corrupt_history_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE);
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(HistoryStore::open(&path), Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_settings_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        let settings = Settings {
            guardian_name: Some("Asha".into()),
            guardian_contact: Some("+91 90000 00000".into()),
            risk_sensitivity: RiskSensitivity::High,
            ..Default::default()
        };
        save_settings(&settings, &path).unwrap();

        let loaded: Settings = load_json(&path).unwrap().unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_settings_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Option<Settings> = load_json(&dir.path().join(SETTINGS_FILE)).unwrap();
        assert!(loaded.is_none());
    }
}
