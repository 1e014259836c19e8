//! JSONL file writer for turn records.
//!
//! Each [`TurnRecord`] is serialized as a single JSON line with a `type`
//! field and `timestamp`, appended to the file via a buffered writer.
//! Persistence is fire-and-forget: a failing store logs and swallows the
//! error, never failing the turn.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tenderag_application::ports::turn_store::{TurnRecord, TurnStore};
use tracing::warn;

/// JSONL turn store that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on every record and
/// on `Drop`.
pub struct JsonlTurnStore {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTurnStore {
    /// Create a store appending to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create turn log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open turn log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TurnStore for JsonlTurnStore {
    fn record(&self, record: TurnRecord) {
        let timestamp = record
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        // Merge payload fields with type + timestamp at the top level
        let line_value = if let serde_json::Value::Object(mut map) = record.payload {
            map.insert(
                "type".to_string(),
                serde_json::Value::String(record.record_type),
            );
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
            serde_json::Value::Object(map)
        } else {
            serde_json::json!({
                "type": record.record_type,
                "timestamp": timestamp,
                "data": record.payload,
            })
        };

        let Ok(line) = serde_json::to_string(&line_value) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlTurnStore {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
