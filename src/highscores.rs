//! High score persistence
//!
//! A single integer stored as a decimal string under a fixed key. The
//! simulation only sees the [`ScoreStore`] port; LocalStorage backs it on
//! the web and [`MemoryScoreStore`] everywhere else.

use crate::error::StorageError;

/// Storage key for the best score
pub const STORAGE_KEY: &str = "star_dodge_high_score";

/// Get/set access to the persisted high score
pub trait ScoreStore {
    /// Stored value; absent or malformed content reads as 0
    fn get(&self) -> Result<u32, StorageError>;
    fn set(&mut self, score: u32) -> Result<(), StorageError>;
}

/// Decode a stored value. Anything but plain ASCII digits counts as absent.
pub fn parse_high_score(raw: Option<&str>) -> u32 {
    match raw {
        Some(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().unwrap_or(0)
        }
        _ => 0,
    }
}

/// Encode a value for storage
pub fn format_high_score(score: u32) -> String {
    score.to_string()
}

/// In-process store holding the raw encoded value
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    raw: Option<String>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with arbitrary stored content
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn get(&self) -> Result<u32, StorageError> {
        Ok(parse_high_score(self.raw()))
    }

    fn set(&mut self, score: u32) -> Result<(), StorageError> {
        self.raw = Some(format_high_score(score));
        Ok(())
    }
}

/// Best score known to this session, written through on every new record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    best: u32,
}

impl HighScore {
    /// Read the stored value; storage failures fall back to 0
    pub fn load(store: &impl ScoreStore) -> Self {
        let best = match store.get() {
            Ok(best) => {
                log::info!("Loaded high score {}", best);
                best
            }
            Err(e) => {
                log::warn!("High score unavailable, starting at 0: {}", e);
                0
            }
        };
        Self { best }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Record `score`; returns true when it beat the previous best.
    ///
    /// Write failures are logged and swallowed, so the record still holds
    /// for the rest of this run.
    pub fn observe(&mut self, score: u32, store: &mut impl ScoreStore) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(e) = store.set(score) {
            log::warn!("Failed to save high score {}: {}", score, e);
        }
        true
    }
}

/// High score in the browser's LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageScores;

#[cfg(target_arch = "wasm32")]
impl LocalStorageScores {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageScores {
    fn get(&self) -> Result<u32, StorageError> {
        let raw = Self::storage()?
            .get_item(STORAGE_KEY)
            .map_err(|e| StorageError::Read(format!("{:?}", e)))?;
        Ok(parse_high_score(raw.as_deref()))
    }

    fn set(&mut self, score: u32) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(STORAGE_KEY, &format_high_score(score))
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Storage that is always full
    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn get(&self) -> Result<u32, StorageError> {
            Err(StorageError::Unavailable)
        }

        fn set(&mut self, _score: u32) -> Result<(), StorageError> {
            Err(StorageError::Write("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_parse_high_score() {
        assert_eq!(parse_high_score(Some("42")), 42);
        assert_eq!(parse_high_score(Some("0")), 0);
        assert_eq!(parse_high_score(None), 0);
        assert_eq!(parse_high_score(Some("")), 0);
        assert_eq!(parse_high_score(Some("-3")), 0);
        assert_eq!(parse_high_score(Some("+3")), 0);
        assert_eq!(parse_high_score(Some("12abc")), 0);
        assert_eq!(parse_high_score(Some("4.5")), 0);
        assert_eq!(parse_high_score(Some("99999999999999999999")), 0);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryScoreStore::new();
        assert_eq!(store.get(), Ok(0));
        store.set(17).unwrap();
        assert_eq!(store.raw(), Some("17"));
        assert_eq!(store.get(), Ok(17));
    }

    #[test]
    fn test_observe_only_writes_records() {
        let mut store = MemoryScoreStore::with_raw("10");
        let mut high = HighScore::load(&store);
        assert_eq!(high.best(), 10);

        assert!(!high.observe(5, &mut store));
        assert!(!high.observe(10, &mut store));
        assert_eq!(store.raw(), Some("10"));

        assert!(high.observe(11, &mut store));
        assert_eq!(high.best(), 11);
        assert_eq!(store.raw(), Some("11"));
    }

    #[test]
    fn test_malformed_store_reads_zero() {
        let store = MemoryScoreStore::with_raw("not a number");
        assert_eq!(HighScore::load(&store).best(), 0);
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let mut store = BrokenStore;
        let mut high = HighScore::load(&store);
        assert_eq!(high.best(), 0);
        assert!(high.observe(3, &mut store));
        assert_eq!(high.best(), 3, "record kept for the session");
    }
}
