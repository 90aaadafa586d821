//! JSONL-backed session store with in-memory caching.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{Exchange, InMemorySessionStore, SessionStore};
use crate::error::{CoursemateError, Result};

const SESSIONS_FILE: &str = "sessions.jsonl";

/// One line of the sessions file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExchangeRecord {
    session_id: String,
    question: String,
    answer: String,
    at: DateTime<Utc>,
}

/// Exchanges appended to `<dir>/sessions.jsonl` and replayed on open.
///
/// Only exchanges are persisted; a session created but never used does not
/// survive a restart, which is indistinguishable from an empty one.
pub struct JsonlSessionStore {
    path: PathBuf,
    cache: InMemorySessionStore,
    writer: Mutex<()>,
}

impl JsonlSessionStore {
    /// Open (or create) the store under `dir`
    pub fn open(dir: impl AsRef<Path>, max_history: usize) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        let path = dir.as_ref().join(SESSIONS_FILE);
        let cache = InMemorySessionStore::new(max_history);

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let mut replayed = 0usize;
            for (index, raw) in reader.split(b'\n').enumerate() {
                let line = match String::from_utf8(raw?) {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Skipping non-UTF-8 line {} in {}: {}", index + 1, path.display(), e);
                        continue;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<ExchangeRecord>(&line) {
                    Ok(record) => {
                        cache.push(&record.session_id, Exchange::new(record.question, record.answer))?;
                        replayed += 1;
                    }
                    Err(e) => warn!("Skipping corrupt line {} in {}: {}", index + 1, path.display(), e),
                }
            }
            debug!("Replayed {} exchanges from {}", replayed, path.display());
        }

        Ok(Self {
            path,
            cache,
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_line(&self, record: &ExchangeRecord) -> Result<()> {
        let _guard = self
            .writer
            .lock()
            .map_err(|e| CoursemateError::Session(e.to_string()))?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(record)?)?;
        Ok(())
    }
}

impl SessionStore for JsonlSessionStore {
    fn create_session(&self) -> Result<String> {
        self.cache.create_session()
    }

    fn history(&self, session_id: &str) -> Result<Option<String>> {
        self.cache.history(session_id)
    }

    fn append_exchange(&self, session_id: &str, question: &str, answer: &str) -> Result<()> {
        let record = ExchangeRecord {
            session_id: session_id.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            at: Utc::now(),
        };
        self.append_line(&record)?;
        self.cache.append_exchange(session_id, question, answer)
    }
}
