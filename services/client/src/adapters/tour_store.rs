//! services/client/src/adapters/tour_store.rs
//!
//! Persists the onboarding-tour completion flag in a small JSON key/value file.
//! Implements the `TourProgressStore` port from the `core` crate.

use chrono::Utc;
use docchat_core::{PortError, PortResult, TourProgressStore};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Versioned key of the completion flag. Bump the suffix to show the tour again.
pub const TOUR_COMPLETED_KEY: &str = "docchat.onboarding.completed.v1";
const TOUR_COMPLETED_AT_KEY: &str = "docchat.onboarding.completed.v1.at";

/// A file-backed store. The flag is read once when the store is opened.
pub struct JsonTourStore {
    path: PathBuf,
    completed: AtomicBool,
}

impl JsonTourStore {
    /// Opens the store at `path`. A missing file means the tour was never shown;
    /// an unreadable or corrupt one is treated the same way.
    pub fn open(path: &Path) -> Self {
        let completed = match read_entries(path) {
            Ok(entries) => is_set(entries.get(TOUR_COMPLETED_KEY)),
            Err(e) => {
                warn!("Ignoring tour state at {}: {}", path.display(), e);
                false
            }
        };
        Self {
            path: path.to_path_buf(),
            completed: AtomicBool::new(completed),
        }
    }
}

fn is_set(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

fn read_entries(path: &Path) -> PortResult<Map<String, Value>> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => {
            return Err(PortError::Unexpected(format!(
                "Failed to read tour state: {}",
                e
            )))
        }
    };
    serde_json::from_str(&json)
        .map_err(|e| PortError::Unexpected(format!("Failed to parse tour state: {}", e)))
}

impl TourProgressStore for JsonTourStore {
    fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    fn mark_completed(&self) -> PortResult<()> {
        // Other keys in the file are preserved; a corrupt file is replaced.
        let mut entries = read_entries(&self.path).unwrap_or_default();
        entries.insert(TOUR_COMPLETED_KEY.to_string(), Value::Bool(true));
        entries.insert(
            TOUR_COMPLETED_AT_KEY.to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );

        let json = serde_json::to_string_pretty(&Value::Object(entries)).map_err(|e| {
            PortError::Unexpected(format!("Failed to serialize tour state: {}", e))
        })?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PortError::Unexpected(format!("Failed to create tour state directory: {}", e))
            })?;
        }
        std::fs::write(&self.path, json)
            .map_err(|e| PortError::Unexpected(format!("Failed to write tour state: {}", e)))?;

        self.completed.store(true, Ordering::SeqCst);
        info!("Tour completion recorded at {}.", self.path.display());
        Ok(())
    }
}
