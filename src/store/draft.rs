//! Persistence for the in-progress quarter draft.
//!
//! A CLI process ends between `record` commands, so the working copy is
//! kept on disk until it is saved or discarded.

use crate::editor::QuarterDraft;
use crate::store::{read_json, remove_if_exists, write_json_atomic};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed slot for the working draft.
#[derive(Debug, Clone)]
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved draft, if any. A malformed draft file reads as no draft.
    pub fn load(&self) -> Option<QuarterDraft> {
        read_json(&self.path, "draft")
    }

    /// The saved draft, or a fresh one for the quarter containing `now`.
    pub fn load_or_new(&self, now: DateTime<Utc>) -> QuarterDraft {
        self.load().unwrap_or_else(|| {
            debug!("Starting a new draft");
            QuarterDraft::for_quarter_of(now)
        })
    }

    pub fn save(&self, draft: &QuarterDraft) -> Result<()> {
        write_json_atomic(&self.path, draft)
    }

    /// Delete the draft file. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        remove_if_exists(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::CategoryId;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_load_or_new_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = DraftStore::new(temp_dir.path().join("draft.json"));
        let now = Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap();

        assert!(store.load().is_none());
        assert_eq!(store.load_or_new(now).quarter_id, "2025-Q1");
    }

    #[test]
    fn test_save_load_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = DraftStore::new(temp_dir.path().join("draft.json"));

        let mut draft = QuarterDraft::new("2024-Q4");
        draft.add_entry(CategoryId::Bitcoin, "Cold Wallet", 45_000.0);
        store.save(&draft).unwrap();

        assert!(store.path().exists());
        assert_eq!(store.load(), Some(draft));
        assert!(store.clear().unwrap());
        assert!(store.load().is_none());
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn test_malformed_draft_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("draft.json");
        std::fs::write(&path, "{\"quarter_id\": 7}").unwrap();

        assert!(DraftStore::new(&path).load().is_none());
    }
}
