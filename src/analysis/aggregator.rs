//! Quarterly metrics aggregation.
//!
//! Rolls one quarter record up into per-category sums, the three global
//! metrics, two chart distributions and the cash/stock group summaries.
//! Pure and total: an all-empty record yields all-zero metrics.

use crate::categories::CategoryId;
use crate::models::{
    CalculatedGroup, ChartSlice, Entry, GlobalMetrics, GroupChild, GroupId, QuarterData,
    QuarterMetrics, WealthRecord,
};

/// Sum of all entry values (0 for an empty list).
pub fn sum_entries(entries: &[Entry]) -> f64 {
    // `Sum for f64` starts from -0.0, which would render as "-0".
    entries.iter().fold(0.0, |acc, e| acc + e.value)
}

/// `part / whole * 100`, or 0 when the result would be undefined.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let pct = (part / whole) * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// Per-category sums in canonical order.
pub fn category_totals(data: &QuarterData) -> Vec<(CategoryId, f64)> {
    data.iter()
        .map(|(category, entries)| (category, sum_entries(entries)))
        .collect()
}

/// Compute every derived figure for one record.
pub fn calculate_quarter_metrics(record: &WealthRecord) -> QuarterMetrics {
    let data = &record.data;
    let get_sum = |category: CategoryId| sum_entries(data.get(category));

    let cash_total = get_sum(CategoryId::CashNoInterest)
        + get_sum(CategoryId::CashInterest)
        + get_sum(CategoryId::CashStock);

    let stock_total = get_sum(CategoryId::Rsu)
        + get_sum(CategoryId::StocksIndividual)
        + get_sum(CategoryId::StocksIndex);

    let real_estate_total = get_sum(CategoryId::RealEstate);
    let bonds_total = get_sum(CategoryId::Bonds);
    let pension_total = get_sum(CategoryId::Pension);
    let bitcoin_total = get_sum(CategoryId::Bitcoin);
    let rsu_total = get_sum(CategoryId::Rsu);
    let index_funds_total = get_sum(CategoryId::StocksIndex);
    let individual_stocks_total = get_sum(CategoryId::StocksIndividual);

    let total_market_index = pension_total + index_funds_total;
    let total_assets = real_estate_total
        + cash_total
        + bonds_total
        + stock_total
        + pension_total
        + bitcoin_total;
    // Pension counts as disposable through the market-index term; real estate does not.
    let disposable_assets = cash_total
        + rsu_total
        + total_market_index
        + bonds_total
        + individual_stocks_total
        + bitcoin_total;

    let total_assets_chart = positive_slices(vec![
        slice("Real estate", real_estate_total, CategoryId::RealEstate),
        slice("Cash", cash_total, CategoryId::CashNoInterest),
        slice("Bonds", bonds_total, CategoryId::Bonds),
        slice("Stocks", stock_total, CategoryId::Rsu),
        slice("Bitcoin", bitcoin_total, CategoryId::Bitcoin),
        slice("Pension", pension_total, CategoryId::Pension),
    ]);

    let disposable_assets_chart = positive_slices(vec![
        slice("Cash", cash_total, CategoryId::CashNoInterest),
        slice("RSU", rsu_total, CategoryId::Rsu),
        slice("Total market index", total_market_index, CategoryId::StocksIndex),
        slice("Bonds", bonds_total, CategoryId::Bonds),
        slice(
            "Individual stocks",
            individual_stocks_total,
            CategoryId::StocksIndividual,
        ),
        slice("Bitcoin", bitcoin_total, CategoryId::Bitcoin),
    ]);

    let groups = vec![
        group_summary(
            GroupId::Cash,
            "Cash accounts",
            total_assets,
            &[
                (CategoryId::CashNoInterest, "No interest"),
                (CategoryId::CashInterest, "Interest-bearing"),
                (CategoryId::CashStock, "Brokerage cash"),
            ],
            &get_sum,
        ),
        group_summary(
            GroupId::Stock,
            "Stocks",
            total_assets,
            &[
                (CategoryId::Rsu, "RSU"),
                (CategoryId::StocksIndividual, "Individual stocks"),
                (CategoryId::StocksIndex, "Index funds"),
            ],
            &get_sum,
        ),
    ];

    QuarterMetrics {
        groups,
        metrics: GlobalMetrics {
            total_assets,
            disposable_assets,
            total_market_index,
        },
        total_assets_chart,
        disposable_assets_chart,
    }
}

fn slice(name: &str, value: f64, color_of: CategoryId) -> ChartSlice {
    ChartSlice {
        name: name.to_string(),
        value,
        color: color_of.meta().color.to_string(),
    }
}

/// Keep only slices strictly above zero.
fn positive_slices(slices: Vec<ChartSlice>) -> Vec<ChartSlice> {
    slices.into_iter().filter(|s| s.value > 0.0).collect()
}

fn group_summary(
    id: GroupId,
    label: &str,
    total_assets: f64,
    members: &[(CategoryId, &str)],
    get_sum: &dyn Fn(CategoryId) -> f64,
) -> CalculatedGroup {
    let total = members
        .iter()
        .fold(0.0, |acc, (category, _)| acc + get_sum(*category));

    let children = members
        .iter()
        .map(|(category, child_label)| {
            let child_total = get_sum(*category);
            GroupChild {
                id: *category,
                label: child_label.to_string(),
                total: child_total,
                percentage_of_group: percentage(child_total, total),
            }
        })
        .collect();

    CalculatedGroup {
        id,
        label: label.to_string(),
        total,
        percentage_of_total: percentage(total, total_assets),
        children,
    }
}
