//! Data models for the wealth tracker.
//!
//! This module contains the persisted record shapes (entries, quarter data,
//! wealth records) and the derived metric structures produced by the
//! aggregator.

use crate::categories::CategoryId;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single line item inside a category, e.g. one bank account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Identifier, unique within its category list.
    pub id: String,
    /// Free-text label.
    pub label: String,
    /// Amount in the tracking currency.
    pub value: f64,
}

impl Entry {
    /// Creates a new entry.
    pub fn new(id: impl Into<String>, label: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value,
        }
    }
}

/// Entries for every category of one quarter.
///
/// Backed by a fixed array indexed by [`CategoryId::index`], so every
/// category is always present (possibly with an empty list).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuarterData {
    entries: [Vec<Entry>; CategoryId::COUNT],
}

impl QuarterData {
    /// Creates quarter data with every category empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entries of one category, in insertion order.
    pub fn get(&self, category: CategoryId) -> &[Entry] {
        &self.entries[category.index()]
    }

    /// Mutable entry list of one category.
    pub fn get_mut(&mut self, category: CategoryId) -> &mut Vec<Entry> {
        &mut self.entries[category.index()]
    }

    /// Replaces the entries of one category.
    pub fn set(&mut self, category: CategoryId, entries: Vec<Entry>) {
        self.entries[category.index()] = entries;
    }

    /// Builder-style variant of [`QuarterData::set`].
    pub fn with(mut self, category: CategoryId, entries: Vec<Entry>) -> Self {
        self.set(category, entries);
        self
    }

    /// Iterates categories in canonical order with their entries.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &[Entry])> {
        CategoryId::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    /// True when no category has any entry.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Vec::is_empty)
    }

    /// Total number of entries across categories.
    pub fn entry_count(&self) -> usize {
        self.entries.iter().map(Vec::len).sum()
    }
}

impl Serialize for QuarterData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CategoryId::COUNT))?;
        for (category, entries) in self.iter() {
            map.serialize_entry(category.key(), entries)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for QuarterData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QuarterDataVisitor;

        impl<'de> Visitor<'de> for QuarterDataVisitor {
            type Value = QuarterData;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from category key to a list of entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<QuarterData, A::Error> {
                let mut data = QuarterData::empty();
                while let Some(key) = access.next_key::<String>()? {
                    match CategoryId::from_key(&key) {
                        Some(category) => {
                            let entries: Vec<Entry> = access.next_value()?;
                            data.set(category, entries);
                        }
                        None => {
                            tracing::debug!("Ignoring unknown category key: {}", key);
                            access.next_value::<serde::de::IgnoredAny>()?;
                        }
                    }
                }
                Ok(data)
            }
        }

        deserializer.deserialize_map(QuarterDataVisitor)
    }
}

/// A saved quarterly snapshot. Identity is the quarter label in `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WealthRecord {
    /// Quarter label, e.g. `2024-Q1`.
    pub id: String,
    /// Creation instant in Unix milliseconds.
    pub timestamp: i64,
    /// Per-category entries.
    pub data: QuarterData,
}

impl WealthRecord {
    /// Creation instant as a UTC datetime, if representable.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Returns the `YYYY-Qn` label for the quarter containing `date`.
pub fn quarter_label<T: Datelike>(date: &T) -> String {
    let quarter = (date.month0() / 3) + 1;
    format!("{}-Q{}", date.year(), quarter)
}

/// Short badge for a quarter label: the part after the first `-`.
pub fn quarter_badge(label: &str) -> &str {
    label.split_once('-').map(|(_, q)| q).unwrap_or(label)
}

/// Derived global totals for one quarter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    /// Everything, real estate included.
    pub total_assets: f64,
    /// Liquid-ish holdings; see the aggregator for the exact formula.
    pub disposable_assets: f64,
    /// Pension plus index funds.
    pub total_market_index: f64,
}

/// One slice of a distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: f64,
    /// Hex colour.
    pub color: String,
}

/// Identifier of a summarised category group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupId {
    Cash,
    Stock,
}

/// One category inside a [`CalculatedGroup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupChild {
    pub id: CategoryId,
    pub label: String,
    pub total: f64,
    /// Share of the group total, 0 when the group is empty.
    pub percentage_of_group: f64,
}

/// Summary of a category group (cash or stock).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedGroup {
    pub id: GroupId,
    pub label: String,
    pub total: f64,
    /// Share of total assets, 0 when total assets are 0.
    pub percentage_of_total: f64,
    pub children: Vec<GroupChild>,
}

/// Everything the aggregator derives from one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterMetrics {
    pub groups: Vec<CalculatedGroup>,
    pub metrics: GlobalMetrics,
    pub total_assets_chart: Vec<ChartSlice>,
    pub disposable_assets_chart: Vec<ChartSlice>,
}

impl QuarterMetrics {
    /// Metrics for "no record at all".
    pub fn empty() -> Self {
        Self {
            groups: Vec::new(),
            metrics: GlobalMetrics::default(),
            total_assets_chart: Vec::new(),
            disposable_assets_chart: Vec::new(),
        }
    }

    /// Looks up a group summary.
    #[cfg(test)]
    pub fn group(&self, id: GroupId) -> Option<&CalculatedGroup> {
        self.groups.iter().find(|g| g.id == id)
    }
}

/// Global metrics of one stored record, for the trends view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Quarter label.
    pub name: String,
    pub timestamp: i64,
    pub total_assets: f64,
    pub disposable_assets: f64,
    pub total_market_index: f64,
}
