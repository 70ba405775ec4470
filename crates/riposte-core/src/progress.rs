//! Level progress and the level-select roster.
//!
//! Progress is a single integer: the highest unlocked level. It starts at
//! [`DEFAULT_UNLOCKED_LEVEL`] and only ever rises. A [`LevelSelect`] roster
//! lists opponents in a ring; an entry can be picked once the stored level
//! reaches its `required_level`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ProgressError;

/// Unlocked level of a fresh profile.
pub const DEFAULT_UNLOCKED_LEVEL: u32 = 1;

/// Persistent "highest unlocked level" storage.
pub trait ProgressStore {
    /// Returns the highest unlocked level.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn highest_unlocked(&self) -> Result<u32, ProgressError>;

    /// Raises the highest unlocked level to `level`. Lower values are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read or written.
    ///
    /// # Returns
    ///
    /// True if the stored level changed.
    fn unlock(&mut self, level: u32) -> Result<bool, ProgressError>;

    /// Returns true if content gated at `required` is available.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn is_unlocked(&self, required: u32) -> Result<bool, ProgressError> {
        Ok(self.highest_unlocked()? >= required)
    }
}

/// In-memory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryProgress {
    unlocked: u32,
}

impl Default for MemoryProgress {
    fn default() -> Self {
        Self {
            unlocked: DEFAULT_UNLOCKED_LEVEL,
        }
    }
}

impl MemoryProgress {
    /// Creates a fresh profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgress {
    fn highest_unlocked(&self) -> Result<u32, ProgressError> {
        Ok(self.unlocked)
    }

    fn unlock(&mut self, level: u32) -> Result<bool, ProgressError> {
        if level > self.unlocked {
            self.unlocked = level;
            return Ok(true);
        }
        Ok(false)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ProgressFile {
    unlocked_level: u32,
}

/// JSON file store. A missing file reads as a fresh profile.
///
/// Writes go to a sibling temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileProgress {
    path: PathBuf,
}

impl JsonFileProgress {
    /// Uses the file at `path`, which need not exist yet.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonFileProgress {
    fn highest_unlocked(&self) -> Result<u32, ProgressError> {
        if !self.path.exists() {
            return Ok(DEFAULT_UNLOCKED_LEVEL);
        }
        let text = fs::read_to_string(&self.path)?;
        let file: ProgressFile = serde_json::from_str(&text)?;
        Ok(file.unlocked_level)
    }

    fn unlock(&mut self, level: u32) -> Result<bool, ProgressError> {
        if level <= self.highest_unlocked()? {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&ProgressFile {
            unlocked_level: level,
        })?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;
        tracing::debug!(level, path = %self.path.display(), "level unlocked");
        Ok(true)
    }
}

// =============================================================================
// Level select
// =============================================================================

/// One selectable opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    /// Display or scene name.
    pub name: String,
    /// Level that must be unlocked before this entry can be picked.
    pub required_level: u32,
}

impl LevelEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(name: impl Into<String>, required_level: u32) -> Self {
        Self {
            name: name.into(),
            required_level,
        }
    }
}

/// Ring of [`LevelEntry`] with a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LevelSelect {
    entries: Vec<LevelEntry>,
    cursor: usize,
}

impl LevelSelect {
    /// Creates a roster with the cursor on the first entry.
    #[must_use]
    pub fn new(entries: Vec<LevelEntry>) -> Self {
        Self { entries, cursor: 0 }
    }

    /// Returns all entries in ring order.
    #[must_use]
    pub fn entries(&self) -> &[LevelEntry] {
        &self.entries
    }

    /// Returns the cursor position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the entry under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&LevelEntry> {
        self.entries.get(self.cursor)
    }

    /// Moves the cursor forward, wrapping at the end.
    pub fn next(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = (self.cursor + 1) % self.entries.len();
        }
    }

    /// Moves the cursor back, wrapping at the start.
    pub fn prev(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = (self.cursor + self.entries.len() - 1) % self.entries.len();
        }
    }

    /// Returns the entry under the cursor if it is unlocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn select<S: ProgressStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Option<&LevelEntry>, ProgressError> {
        let Some(entry) = self.current() else {
            return Ok(None);
        };
        if store.is_unlocked(entry.required_level)? {
            Ok(Some(entry))
        } else {
            tracing::info!(level = %entry.name, required = entry.required_level, "level is locked");
            Ok(None)
        }
    }

    /// Returns the entries currently unlocked, in ring order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn unlocked<S: ProgressStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Vec<&LevelEntry>, ProgressError> {
        let highest = store.highest_unlocked()?;
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.required_level <= highest)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> LevelSelect {
        LevelSelect::new(vec![
            LevelEntry::new("chef", 1),
            LevelEntry::new("butcher", 2),
            LevelEntry::new("baker", 3),
        ])
    }

    mod store_tests {
        use super::*;

        #[test]
        fn memory_store_only_raises() {
            let mut store = MemoryProgress::new();
            assert_eq!(store.highest_unlocked().unwrap(), 1);
            assert!(store.unlock(3).unwrap());
            assert!(!store.unlock(2).unwrap());
            assert_eq!(store.highest_unlocked().unwrap(), 3);
        }

        #[test]
        fn missing_file_is_fresh_profile() {
            let dir = tempfile::tempdir().unwrap();
            let store = JsonFileProgress::new(dir.path().join("progress.json"));
            assert_eq!(store.highest_unlocked().unwrap(), DEFAULT_UNLOCKED_LEVEL);
            assert!(!store.path().exists());
        }

        #[test]
        fn file_store_persists_across_instances() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("save").join("progress.json");

            let mut store = JsonFileProgress::new(&path);
            assert!(store.unlock(2).unwrap());
            assert!(!store.unlock(1).unwrap());

            let reopened = JsonFileProgress::new(&path);
            assert_eq!(reopened.highest_unlocked().unwrap(), 2);
            assert!(reopened.is_unlocked(2).unwrap());
            assert!(!reopened.is_unlocked(3).unwrap());
        }

        #[test]
        fn corrupt_file_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("progress.json");
            fs::write(&path, "not json").unwrap();
            let store = JsonFileProgress::new(&path);
            assert!(matches!(store.highest_unlocked(), Err(ProgressError::Json(_))));
        }
    }

    mod select_tests {
        use super::*;

        #[test]
        fn cursor_wraps_both_ways() {
            let mut select = roster();
            select.prev();
            assert_eq!(select.cursor(), 2);
            select.next();
            assert_eq!(select.cursor(), 0);
            select.next();
            assert_eq!(select.current().unwrap().name, "butcher");
        }

        #[test]
        fn locked_entry_is_not_selected() {
            let mut select = roster();
            let mut store = MemoryProgress::new();
            assert_eq!(select.select(&store).unwrap().unwrap().name, "chef");

            select.next();
            assert!(select.select(&store).unwrap().is_none());

            store.unlock(2).unwrap();
            assert_eq!(select.select(&store).unwrap().unwrap().name, "butcher");
            assert_eq!(select.unlocked(&store).unwrap().len(), 2);
        }

        #[test]
        fn empty_roster_is_inert() {
            let mut select = LevelSelect::default();
            select.next();
            select.prev();
            assert!(select.current().is_none());
            assert!(select.select(&MemoryProgress::new()).unwrap().is_none());
        }
    }
}
