//! Leaderboard stores: in-memory and JSON-file backed.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::ScoreEntry;

/// Leaderboard queries default to the top 10, best first.
pub const DEFAULT_TOP_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("leaderboard storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("leaderboard data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Where submitted scores end up and where leaderboard reads come from.
///
/// `top` returns at most `limit` entries sorted by score descending.
/// Implementations are shared across threads (the reporter worker writes
/// while the presentation layer reads), hence `&self` methods and the
/// `Send + Sync` bound.
pub trait ScoreStore: Send + Sync {
    fn record(&self, entry: ScoreEntry) -> Result<(), StoreError>;
    fn top(&self, limit: usize) -> Result<Vec<ScoreEntry>, StoreError>;
}

/// In-memory store; keeps every submission for the lifetime of the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<ScoreEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn record(&self, entry: ScoreEntry) -> Result<(), StoreError> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn top(&self, limit: usize) -> Result<Vec<ScoreEntry>, StoreError> {
        let entries = self.entries.lock().unwrap();
        Ok(top_of(&entries, limit))
    }
}

/// Store backed by a single JSON file holding an array of entries.
///
/// The whole file is rewritten on every record; fine for the handful of
/// scores a local leaderboard holds. A missing file reads as empty.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles between threads.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl ScoreStore for JsonFileStore {
    fn record(&self, entry: ScoreEntry) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap();
        let mut entries = self.load()?;
        entries.push(entry);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&entries)?)?;
        Ok(())
    }

    fn top(&self, limit: usize) -> Result<Vec<ScoreEntry>, StoreError> {
        let _guard = self.lock.lock().unwrap();
        Ok(top_of(&self.load()?, limit))
    }
}

fn top_of(entries: &[ScoreEntry], limit: usize) -> Vec<ScoreEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(username: &str, score: u32) -> ScoreEntry {
        ScoreEntry {
            username: username.to_string(),
            score,
        }
    }

    #[test]
    fn test_memory_store_orders_descending() {
        let store = MemoryStore::new();
        store.record(entry("a", 100)).unwrap();
        store.record(entry("b", 300)).unwrap();
        store.record(entry("c", 200)).unwrap();

        let top = store.top(DEFAULT_TOP_LIMIT).unwrap();
        let scores: Vec<u32> = top.iter().map(|e| e.score).collect();
        assert_eq!(scores, [300, 200, 100]);
    }

    #[test]
    fn test_memory_store_truncates_to_limit() {
        let store = MemoryStore::new();
        for i in 0..15 {
            store.record(entry("p", i * 10)).unwrap();
        }
        assert_eq!(store.top(DEFAULT_TOP_LIMIT).unwrap().len(), 10);
        assert_eq!(store.top(3).unwrap().len(), 3);
    }

    #[test]
    fn test_json_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores").join("leaderboard.json");
        let store = JsonFileStore::new(&path);

        assert!(store.top(DEFAULT_TOP_LIMIT).unwrap().is_empty());

        store.record(entry("a", 512)).unwrap();
        store.record(entry("b", 2048)).unwrap();

        // A fresh store over the same file sees the persisted entries.
        let reopened = JsonFileStore::new(&path);
        let top = reopened.top(DEFAULT_TOP_LIMIT).unwrap();
        assert_eq!(top[0], entry("b", 2048));
        assert_eq!(top[1], entry("a", 512));
    }

    #[test]
    fn test_json_file_store_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard.json");
        fs::write(&path, b"not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.top(DEFAULT_TOP_LIMIT),
            Err(StoreError::Malformed(_))
        ));
    }
}
