//! Asset categories and their display metadata.
//!
//! The category set is closed and known at build time. Every quarter
//! record carries exactly one entry list per category.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an asset category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryId {
    RealEstate,
    CashNoInterest,
    CashInterest,
    /// Cash held in a brokerage account.
    CashStock,
    Bonds,
    Rsu,
    StocksIndividual,
    /// Index funds.
    StocksIndex,
    Pension,
    Bitcoin,
}

impl CategoryId {
    /// Number of categories.
    pub const COUNT: usize = 10;

    /// All categories in canonical order.
    pub const ALL: [CategoryId; Self::COUNT] = [
        CategoryId::RealEstate,
        CategoryId::CashNoInterest,
        CategoryId::CashInterest,
        CategoryId::CashStock,
        CategoryId::Bonds,
        CategoryId::Rsu,
        CategoryId::StocksIndividual,
        CategoryId::StocksIndex,
        CategoryId::Pension,
        CategoryId::Bitcoin,
    ];

    /// Position of this category in [`CategoryId::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The persisted key, e.g. `CASH_NO_INTEREST`.
    pub fn key(self) -> &'static str {
        match self {
            CategoryId::RealEstate => "REAL_ESTATE",
            CategoryId::CashNoInterest => "CASH_NO_INTEREST",
            CategoryId::CashInterest => "CASH_INTEREST",
            CategoryId::CashStock => "CASH_STOCK",
            CategoryId::Bonds => "BONDS",
            CategoryId::Rsu => "RSU",
            CategoryId::StocksIndividual => "STOCKS_INDIVIDUAL",
            CategoryId::StocksIndex => "STOCKS_INDEX",
            CategoryId::Pension => "PENSION",
            CategoryId::Bitcoin => "BITCOIN",
        }
    }

    /// Look up a category by its persisted key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Display metadata for this category.
    pub fn meta(self) -> &'static CategoryMeta {
        let meta = &CATEGORY_METADATA[self.index()];
        debug_assert_eq!(meta.id, self, "metadata table out of order");
        meta
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.meta().label)
    }
}

impl FromStr for CategoryId {
    type Err = String;

    /// Accepts `REAL_ESTATE`, `real-estate`, `real_estate` and friends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_uppercase();
        match normalized.as_str() {
            "CASH" => Err(
                "ambiguous category 'cash': use cash-no-interest, cash-interest or cash-stock"
                    .to_string(),
            ),
            "INDEX" | "INDEX_FUNDS" => Ok(CategoryId::StocksIndex),
            "STOCKS" | "INDIVIDUAL_STOCKS" => Ok(CategoryId::StocksIndividual),
            "BTC" => Ok(CategoryId::Bitcoin),
            key => Self::from_key(key).ok_or_else(|| {
                let known: Vec<String> = Self::ALL
                    .iter()
                    .map(|c| c.key().to_lowercase().replace('_', "-"))
                    .collect();
                format!("unknown category '{}' (expected one of: {})", s, known.join(", "))
            }),
        }
    }
}

/// Coarse grouping shown next to each category in the record form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryGroup {
    Asset,
    Cash,
    Stock,
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryGroup::Asset => write!(f, "Asset"),
            CategoryGroup::Cash => write!(f, "Cash"),
            CategoryGroup::Stock => write!(f, "Stock"),
        }
    }
}

/// Static display data for a category.
#[derive(Debug)]
pub struct CategoryMeta {
    pub id: CategoryId,
    pub label: &'static str,
    pub group: CategoryGroup,
    /// Chart colour as a hex string.
    pub color: &'static str,
}

/// Metadata indexed by [`CategoryId::index`].
pub static CATEGORY_METADATA: [CategoryMeta; CategoryId::COUNT] = [
    CategoryMeta {
        id: CategoryId::RealEstate,
        label: "Real estate",
        group: CategoryGroup::Asset,
        color: "#6366f1",
    },
    CategoryMeta {
        id: CategoryId::CashNoInterest,
        label: "Non-interest cash",
        group: CategoryGroup::Cash,
        color: "#10b981",
    },
    CategoryMeta {
        id: CategoryId::CashInterest,
        label: "Interest-bearing cash",
        group: CategoryGroup::Cash,
        color: "#34d399",
    },
    CategoryMeta {
        id: CategoryId::CashStock,
        label: "Brokerage cash",
        group: CategoryGroup::Cash,
        color: "#6ee7b7",
    },
    CategoryMeta {
        id: CategoryId::Bonds,
        label: "Bonds",
        group: CategoryGroup::Asset,
        color: "#f59e0b",
    },
    CategoryMeta {
        id: CategoryId::Rsu,
        label: "RSU",
        group: CategoryGroup::Stock,
        color: "#ef4444",
    },
    CategoryMeta {
        id: CategoryId::StocksIndividual,
        label: "Individual stocks",
        group: CategoryGroup::Stock,
        color: "#f87171",
    },
    CategoryMeta {
        id: CategoryId::StocksIndex,
        label: "Index funds",
        group: CategoryGroup::Stock,
        color: "#fb7185",
    },
    CategoryMeta {
        id: CategoryId::Pension,
        label: "Pension",
        group: CategoryGroup::Asset,
        color: "#8b5cf6",
    },
    CategoryMeta {
        id: CategoryId::Bitcoin,
        label: "Bitcoin",
        group: CategoryGroup::Asset,
        color: "#f97316",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_matches_index() {
        for category in CategoryId::ALL {
            assert_eq!(category.meta().id, category);
        }
    }

    #[test]
    fn test_key_round_trip() {
        for category in CategoryId::ALL {
            assert_eq!(CategoryId::from_key(category.key()), Some(category));
        }
        assert_eq!(CategoryId::from_key("GOLD"), None);
    }

    #[test]
    fn test_from_str_variants() {
        assert_eq!("REAL_ESTATE".parse::<CategoryId>(), Ok(CategoryId::RealEstate));
        assert_eq!("real-estate".parse::<CategoryId>(), Ok(CategoryId::RealEstate));
        assert_eq!("cash_stock".parse::<CategoryId>(), Ok(CategoryId::CashStock));
        assert_eq!("index".parse::<CategoryId>(), Ok(CategoryId::StocksIndex));
        assert_eq!("btc".parse::<CategoryId>(), Ok(CategoryId::Bitcoin));
        assert!("cash".parse::<CategoryId>().is_err());
        assert!("gold".parse::<CategoryId>().is_err());
    }

    #[test]
    fn test_serde_key() {
        let json = serde_json::to_string(&CategoryId::StocksIndividual).unwrap();
        assert_eq!(json, "\"STOCKS_INDIVIDUAL\"");
    }
}
