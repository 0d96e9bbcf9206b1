//! High score persistence
//!
//! A single integer record. Stores never fail loudly: a bad or missing record
//! reads as 0, and a failed write is logged while the in-memory score carries on.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Persistence collaborator for the best score
pub trait ScoreStore {
    fn load_high_score(&self) -> u64;
    fn save_high_score(&mut self, score: u64);
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("high score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("high score file {path} is corrupt: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk record
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct HighScoreRecord {
    high_score: u64,
}

/// `{"high_score": n}` in a JSON file
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record. `Ok(None)` when there is no file yet.
    pub fn read(&self) -> Result<Option<u64>, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let record: HighScoreRecord =
            serde_json::from_str(&json).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(record.high_score))
    }

    pub fn write(&self, score: u64) -> Result<(), StoreError> {
        let record = HighScoreRecord { high_score: score };
        let json = serde_json::to_string(&record).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl ScoreStore for JsonScoreStore {
    fn load_high_score(&self) -> u64 {
        match self.read() {
            Ok(Some(score)) => {
                log::info!("Loaded high score {}", score);
                score
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                0
            }
            Err(e) => {
                log::warn!("{}; treating high score as 0", e);
                0
            }
        }
    }

    fn save_high_score(&mut self, score: u64) {
        match self.write(score) {
            Ok(()) => log::debug!("High score {} saved", score),
            Err(e) => log::error!("Failed to save high score {}: {}", score, e),
        }
    }
}

/// In-process store; clones share the same value
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    score: Arc<AtomicU64>,
}

impl MemoryScoreStore {
    pub fn new(score: u64) -> Self {
        Self {
            score: Arc::new(AtomicU64::new(score)),
        }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_high_score(&self) -> u64 {
        self.score.load(Ordering::Acquire)
    }

    fn save_high_score(&mut self, score: u64) {
        self.score.store(score, Ordering::Release);
    }
}
