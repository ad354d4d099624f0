//! Best-distance record
//!
//! A single numeric slot that only ever goes up. Read once when a run
//! starts, written at game over only when beaten.

use crate::persistence::{KeyValueStore, StoreError};

/// Storage key for the best score
pub const STORAGE_KEY: &str = "parkour_horde_highscore";

/// High score ratchet over a key-value store
#[derive(Debug)]
pub struct HighScore<S: KeyValueStore> {
    store: S,
    best: u64,
}

impl<S: KeyValueStore> HighScore<S> {
    /// Read the stored best; a missing or unreadable value counts as zero
    pub fn load(store: S) -> Self {
        let best = match read_best(&store) {
            Ok(Some(best)) => {
                log::info!("Loaded high score {}", best);
                best
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                0
            }
            Err(e) => {
                log::warn!("High score unreadable ({}), starting fresh", e);
                0
            }
        };
        Self { store, best }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Offer a finished run's score
    ///
    /// Returns `Ok(true)` when it became the new best. The in-memory best is
    /// raised even if the write fails.
    pub fn submit(&mut self, score: u64) -> Result<bool, StoreError> {
        if score <= self.best {
            return Ok(false);
        }
        self.best = score;
        self.store.set(STORAGE_KEY, &score.to_string())?;
        log::info!("High score saved ({})", score);
        Ok(true)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn read_best<S: KeyValueStore>(store: &S) -> Result<Option<u64>, StoreError> {
    let Some(raw) = store.get(STORAGE_KEY)? else {
        return Ok(None);
    };
    parse_score(&raw)
        .map(Some)
        .ok_or_else(|| StoreError::InvalidValue {
            key: STORAGE_KEY.to_string(),
            value: raw,
        })
}

/// Whole metres; fractional values from older saves are truncated
fn parse_score(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(score) = raw.parse::<u64>() {
        return Some(score);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v as u64),
        _ => None,
    }
}
