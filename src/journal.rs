use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use niche_engine::Goal;
use serde::Serialize;
use uuid::Uuid;

pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Lifecycle events of one scan-and-rank run. Serialized as JSONL with a
/// `kind` tag so the log stays grep-able per event type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanEvent {
    AppStart {
        model: String,
        niche_count: usize,
        goal: Goal,
    },
    ScanStart {
        request_id: Uuid,
        niche_count: usize,
        focus: Option<String>,
    },
    ScanOk {
        niches: usize,
    },
    ScanError {
        code: &'static str,
        error: String,
    },
    RankComputed {
        ranked: usize,
        top: Option<String>,
    },
    BoundaryLock {
        field: String,
        bound: String,
        requested: f64,
    },
    ExportWritten {
        path: String,
    },
}

#[derive(Serialize)]
struct JournalLine<'a> {
    ts: String,
    #[serde(flatten)]
    event: &'a ScanEvent,
}

/// Append-only JSONL event log, one file per UTC day. Write failures are
/// logged and swallowed; the journal must never take the pipeline down.
pub struct ScanJournal {
    dir: PathBuf,
    day_key: String,
    file: File,
}

impl ScanJournal {
    pub fn open(dir: PathBuf) -> std::io::Result<Self> {
        create_dir_all(&dir)?;
        let day_key = Self::day_key();
        let file = Self::open_day_file(&dir, &day_key)?;
        Ok(Self { dir, day_key, file })
    }

    fn day_key() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    fn open_day_file(dir: &Path, day_key: &str) -> std::io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("scans-{}.jsonl", day_key)))
    }

    pub fn write_event(&mut self, event: ScanEvent) {
        let result = (|| -> std::io::Result<()> {
            // Roll to a fresh file when the UTC day changed under us.
            let today = Self::day_key();
            if today != self.day_key {
                self.file = Self::open_day_file(&self.dir, &today)?;
                self.day_key = today;
            }
            let line = JournalLine {
                ts: now_iso(),
                event: &event,
            };
            let line = serde_json::to_string(&line).unwrap_or_else(|_| "{}".to_string());
            writeln!(self.file, "{}", line)?;
            self.file.flush()?;
            Ok(())
        })();

        if let Err(e) = result {
            tracing::warn!("journal write failed: {}", e);
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
