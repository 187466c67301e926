//! Persisted record collection.
//!
//! The whole collection lives in one JSON file that is read once at startup
//! and rewritten wholesale after every change.

use crate::categories::CategoryId;
use crate::models::{Entry, QuarterData, WealthRecord};
use crate::store::{read_json, write_json_atomic};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-backed storage slot for the record collection.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    /// Create a store backed by `path`. Nothing is read until [`RecordStore::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether anything has been persisted yet.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load all records, sorted by timestamp.
    ///
    /// Returns an empty collection when the file is absent or cannot be
    /// parsed; this never fails.
    pub fn load(&self) -> Vec<WealthRecord> {
        let mut records: Vec<WealthRecord> = read_json(&self.path, "record store").unwrap_or_default();
        sort_by_timestamp(&mut records);
        debug!("Loaded {} records from {}", records.len(), self.path.display());
        records
    }

    /// Persist the full collection, replacing prior content.
    pub fn save(&self, records: &[WealthRecord]) -> Result<()> {
        write_json_atomic(&self.path, records)?;
        info!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// In-memory record collection, kept sorted by timestamp ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBook {
    records: Vec<WealthRecord>,
}

impl RecordBook {
    /// Wrap records, sorting them by timestamp.
    pub fn new(mut records: Vec<WealthRecord>) -> Self {
        sort_by_timestamp(&mut records);
        Self { records }
    }

    /// Open the book from a store, falling back to demo data when nothing
    /// has been persisted yet and `seed_demo_data` is set.
    pub fn open(store: &RecordStore, seed_demo_data: bool, now: DateTime<Utc>) -> Self {
        if !store.exists() && seed_demo_data {
            info!("No saved records found, starting with demo data");
            return Self::new(seed_records(now));
        }
        Self::new(store.load())
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[WealthRecord] {
        &self.records
    }

    /// The most recent record.
    pub fn latest(&self) -> Option<&WealthRecord> {
        self.records.last()
    }

    /// Look up a record by quarter label.
    pub fn get(&self, label: &str) -> Option<&WealthRecord> {
        self.records.iter().find(|r| r.id == label)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert a record, replacing any record with the same label.
    ///
    /// Returns the replaced record, if any. The collection stays sorted by
    /// timestamp.
    pub fn upsert(&mut self, record: WealthRecord) -> Option<WealthRecord> {
        let replaced = self
            .records
            .iter()
            .position(|r| r.id == record.id)
            .map(|idx| self.records.remove(idx));

        if replaced.is_some() {
            debug!("Replacing existing record {}", record.id);
        }

        self.records.push(record);
        sort_by_timestamp(&mut self.records);
        replaced
    }
}

fn sort_by_timestamp(records: &mut [WealthRecord]) {
    records.sort_by_key(|r| r.timestamp);
}

/// Demo collection used on first run.
pub fn seed_records(now: DateTime<Utc>) -> Vec<WealthRecord> {
    let timestamp = (now - Duration::days(90)).timestamp_millis();

    let data = QuarterData::empty()
        .with(
            CategoryId::CashNoInterest,
            vec![
                Entry::new("1", "Salary card", 3000.0),
                Entry::new("2", "Cash", 5000.0),
            ],
        )
        .with(
            CategoryId::CashInterest,
            vec![Entry::new("3", "Saving", 20_000.0)],
        )
        .with(
            CategoryId::RealEstate,
            vec![Entry::new("4", "Apartment", 3_500_000.0)],
        )
        .with(
            CategoryId::Bitcoin,
            vec![Entry::new("5", "Cold Wallet", 45_000.0)],
        )
        .with(
            CategoryId::StocksIndex,
            vec![Entry::new("6", "S&P 500", 120_000.0)],
        )
        .with(CategoryId::Pension, vec![Entry::new("7", "401k", 50_000.0)]);

    vec![WealthRecord {
        id: "2024-Q1".to_string(),
        timestamp,
        data,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, timestamp: i64, value: f64) -> WealthRecord {
        WealthRecord {
            id: id.to_string(),
            timestamp,
            data: QuarterData::empty().with(CategoryId::Bonds, vec![Entry::new("b", "Bond", value)]),
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().join("records.json"));

        assert!(!store.exists());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("records.json");
        std::fs::write(&path, "[{\"id\": \"2024-Q1\", \"timest").unwrap();

        let store = RecordStore::new(&path);
        assert!(store.exists());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().join("nested").join("records.json"));

        let records = vec![record("2024-Q2", 200, 2.0), record("2024-Q1", 100, 1.0)];
        store.save(&records).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "2024-Q1");
        assert_eq!(loaded[1].id, "2024-Q2");
        assert_eq!(loaded[1].data.get(CategoryId::Bonds)[0].value, 2.0);
    }

    #[test]
    fn test_save_overwrites_prior_content() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().join("records.json"));

        store
            .save(&[record("2024-Q1", 1, 1.0), record("2024-Q2", 2, 2.0)])
            .unwrap();
        store.save(&[record("2024-Q3", 3, 3.0)]).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "2024-Q3");
    }

    #[test]
    fn test_loads_fixture_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("records.json");
        std::fs::write(&path, include_str!("../../fixtures/wealth_records.json")).unwrap();

        let book = RecordBook::new(RecordStore::new(&path).load());
        assert_eq!(book.len(), 3);
        assert_eq!(book.latest().map(|r| r.id.as_str()), Some("2024-Q3"));
        assert_eq!(
            book.get("2024-Q2").map(|r| r.data.get(CategoryId::Rsu).len()),
            Some(1)
        );
    }

    #[test]
    fn test_upsert_replaces_same_label() {
        let mut book = RecordBook::new(vec![
            record("2024-Q1", 100, 1.0),
            record("2024-Q2", 200, 2.0),
            record("2024-Q3", 300, 3.0),
        ]);

        let replaced = book.upsert(record("2024-Q2", 400, 20.0));

        assert_eq!(replaced.map(|r| r.timestamp), Some(200));
        assert_eq!(book.len(), 3);
        let q2 = book.get("2024-Q2").unwrap();
        assert_eq!(q2.data.get(CategoryId::Bonds)[0].value, 20.0);

        let timestamps: Vec<_> = book.records().iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![100, 300, 400]);
    }

    #[test]
    fn test_upsert_new_label_appends_sorted() {
        let mut book = RecordBook::new(vec![record("2024-Q2", 200, 2.0)]);

        assert!(book.upsert(record("2024-Q1", 100, 1.0)).is_none());

        assert_eq!(book.len(), 2);
        assert_eq!(book.records()[0].id, "2024-Q1");
        assert_eq!(book.latest().map(|r| r.id.as_str()), Some("2024-Q2"));
    }

    #[test]
    fn test_open_seeds_only_when_nothing_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().join("records.json"));
        let now = Utc::now();

        let seeded = RecordBook::open(&store, true, now);
        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded.records()[0].id, "2024-Q1");
        assert_eq!(
            seeded.records()[0].timestamp,
            (now - Duration::days(90)).timestamp_millis()
        );

        assert!(RecordBook::open(&store, false, now).is_empty());

        std::fs::write(store.path(), "not json").unwrap();
        assert!(RecordBook::open(&store, true, now).is_empty());
    }
}
