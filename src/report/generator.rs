//! Markdown and JSON rendering of the dashboard, record form and trends views.

use crate::analysis::{calculate_quarter_metrics, percentage, quarter_over_quarter, trend_points};
use crate::categories::CategoryId;
use crate::editor::QuarterDraft;
use crate::models::{quarter_badge, CalculatedGroup, ChartSlice, QuarterMetrics, TrendPoint, WealthRecord};
use crate::report::format::{
    escape_cell, format_change, format_currency, format_percent, share_bar, sparkline,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

const BAR_WIDTH: usize = 20;

/// Everything the dashboard shows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    /// Label of the record shown, `None` when there are no records.
    pub quarter: Option<String>,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub metrics: QuarterMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}

impl DashboardReport {
    /// Dashboard for the given (latest) record.
    pub fn new(record: Option<&WealthRecord>, generated_at: DateTime<Utc>) -> Self {
        Self {
            quarter: record.map(|r| r.id.clone()),
            generated_at,
            metrics: record
                .map(calculate_quarter_metrics)
                .unwrap_or_else(QuarterMetrics::empty),
            advice: None,
        }
    }

    pub fn with_advice(mut self, advice: Option<String>) -> Self {
        self.advice = advice;
        self
    }
}

/// Time series of the global metrics across all records.
#[derive(Debug, Clone, Serialize)]
pub struct TrendsReport {
    pub points: Vec<TrendPoint>,
    /// Total-assets change versus the previous point.
    pub changes: Vec<Option<f64>>,
}

impl TrendsReport {
    /// Build from records sorted oldest first.
    pub fn from_records(records: &[WealthRecord]) -> Self {
        let points = trend_points(records);
        let changes = quarter_over_quarter(&points);
        Self { points, changes }
    }
}

/// Render the dashboard.
pub fn generate_dashboard_markdown(report: &DashboardReport) -> String {
    let mut output = String::new();

    output.push_str("# WealthTrack Dashboard\n\n");

    let quarter = match report.quarter {
        Some(ref quarter) => quarter,
        None => {
            output.push_str(&generate_welcome_section());
            return output;
        }
    };

    output.push_str(&format!("- **Quarter:** {}\n", quarter));
    output.push_str(&format!(
        "- **Generated:** {}\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str(&generate_overview_section(&report.metrics));
    output.push_str(&generate_distribution_section(
        "Total Assets Distribution",
        &report.metrics.total_assets_chart,
    ));
    output.push_str(&generate_distribution_section(
        "Disposable Assets Distribution",
        &report.metrics.disposable_assets_chart,
    ));
    output.push_str(&generate_groups_section(&report.metrics.groups));

    if let Some(ref advice) = report.advice {
        output.push_str("## AI Advice\n\n");
        output.push_str(advice.trim());
        output.push_str("\n\n");
    }

    output.push_str(&generate_footer());
    output
}

fn generate_welcome_section() -> String {
    let mut section = String::new();

    section.push_str("## Welcome to WealthTrack\n\n");
    section.push_str("No quarterly records yet. Start by adding your first entries:\n\n");
    section.push_str("```\n");
    section.push_str("wealthtrack record add --category cash-interest --label Saving --value 20000\n");
    section.push_str("wealthtrack record save\n");
    section.push_str("```\n");

    section
}

fn generate_overview_section(metrics: &QuarterMetrics) -> String {
    let m = &metrics.metrics;
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str("| Total assets | Disposable assets | Market index exposure |\n");
    section.push_str("|---:|---:|---:|\n");
    section.push_str(&format!(
        "| **{}** | {} | {} |\n\n",
        format_currency(m.total_assets),
        format_currency(m.disposable_assets),
        format_currency(m.total_market_index)
    ));

    section
}

fn generate_distribution_section(title: &str, slices: &[ChartSlice]) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title));

    if slices.is_empty() {
        section.push_str("_Nothing to show._\n\n");
        return section;
    }

    let total: f64 = slices.iter().map(|s| s.value).sum();

    section.push_str("| Slice | Amount | Share | |\n");
    section.push_str("|:---|---:|---:|:---|\n");
    for slice in slices {
        let share = percentage(slice.value, total);
        section.push_str(&format!(
            "| {} | {} | {} | `{}` |\n",
            escape_cell(&slice.name),
            format_currency(slice.value),
            format_percent(share),
            share_bar(share, BAR_WIDTH)
        ));
    }
    section.push('\n');

    section
}

fn generate_groups_section(groups: &[CalculatedGroup]) -> String {
    let mut section = String::new();

    section.push_str("## Group Summaries\n\n");

    for group in groups {
        section.push_str(&format!(
            "### {}: {} ({} of total assets)\n\n",
            group.label,
            format_currency(group.total),
            format_percent(group.percentage_of_total)
        ));
        section.push_str("| Category | Amount | Share of group |\n");
        section.push_str("|:---|---:|---:|\n");
        for child in &group.children {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&child.label),
                format_currency(child.total),
                format_percent(child.percentage_of_group)
            ));
        }
        section.push('\n');
    }

    section
}

/// Render the record-entry form for a draft.
///
/// With `active` set only that category's rows are listed; otherwise every
/// non-empty category is.
pub fn generate_record_form_markdown(draft: &QuarterDraft, active: Option<CategoryId>) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Record: {}\n\n", draft.quarter_id));

    output.push_str("## Categories\n\n");
    output.push_str("| Key | Category | Group | Entries | Total |\n");
    output.push_str("|:---|:---|:---|---:|---:|\n");
    let mut grand_total = 0.0;
    for (category, total) in draft.category_totals() {
        let marker = if Some(category) == active { " ◀" } else { "" };
        output.push_str(&format!(
            "| `{}` | {}{} | {} | {} | {} |\n",
            category.key(),
            category,
            marker,
            category.meta().group,
            draft.data.get(category).len(),
            format_currency(total)
        ));
        grand_total += total;
    }
    output.push_str(&format!(
        "| | **All categories** | | {} | **{}** |\n\n",
        draft.data.entry_count(),
        format_currency(grand_total)
    ));

    let shown: Vec<CategoryId> = match active {
        Some(category) => vec![category],
        None => CategoryId::ALL
            .iter()
            .copied()
            .filter(|&c| !draft.data.get(c).is_empty())
            .collect(),
    };

    if shown.is_empty() {
        output.push_str("_The draft is empty. Add a row with `wealthtrack record add --category <CATEGORY>`._\n");
        return output;
    }

    for category in shown {
        output.push_str(&generate_category_rows(draft, category));
    }

    output
}

fn generate_category_rows(draft: &QuarterDraft, category: CategoryId) -> String {
    let mut section = String::new();
    let entries = draft.data.get(category);

    section.push_str(&format!("## {} (`{}`)\n\n", category, category.key()));

    if entries.is_empty() {
        section.push_str(&format!(
            "_No entries yet. Add one with `wealthtrack record add --category {}`._\n\n",
            category.key().to_lowercase().replace('_', "-")
        ));
        return section;
    }

    section.push_str("| ID | Label | Value |\n");
    section.push_str("|:---|:---|---:|\n");
    for entry in entries {
        let label = if entry.label.is_empty() {
            "_(unnamed)_".to_string()
        } else {
            escape_cell(&entry.label)
        };
        section.push_str(&format!(
            "| `{}` | {} | {} |\n",
            entry.id,
            label,
            format_currency(entry.value)
        ));
    }
    section.push_str(&format!(
        "\n**Category total:** {}\n\n",
        format_currency(draft.category_total(category))
    ));

    section
}

/// Render the trends view.
pub fn generate_trends_markdown(report: &TrendsReport) -> String {
    let mut output = String::new();

    output.push_str("# Wealth Trends\n\n");

    if report.points.is_empty() {
        output.push_str("No records yet. Save a quarter with `wealthtrack record save` to start tracking.\n");
        return output;
    }

    output.push_str("## Quarterly Series\n\n");
    output.push_str("| Quarter | Total assets | Disposable assets | Market index | Change |\n");
    output.push_str("|:---|---:|---:|---:|---:|\n");
    for (point, change) in report.points.iter().zip(&report.changes) {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            escape_cell(&point.name),
            format_currency(point.total_assets),
            format_currency(point.disposable_assets),
            format_currency(point.total_market_index),
            change.map(format_change).unwrap_or_else(|| "-".to_string())
        ));
    }
    output.push('\n');

    output.push_str("## Sparklines\n\n```\n");
    let series: [(&str, Vec<f64>); 3] = [
        ("Total assets", report.points.iter().map(|p| p.total_assets).collect()),
        ("Disposable", report.points.iter().map(|p| p.disposable_assets).collect()),
        ("Market index", report.points.iter().map(|p| p.total_market_index).collect()),
    ];
    for (name, values) in &series {
        output.push_str(&format!("{:<14}{}\n", name, sparkline(values)));
    }
    output.push_str("```\n\n");

    output.push_str("## History\n\n");
    for point in report.points.iter().rev() {
        let recorded = DateTime::<Utc>::from_timestamp_millis(point.timestamp)
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        output.push_str(&format!(
            "- **[{}]** {}: {} (recorded {})\n",
            quarter_badge(&point.name),
            point.name,
            format_currency(point.total_assets),
            recorded
        ));
    }
    output.push('\n');

    output
}

fn generate_footer() -> String {
    "---\n\n*Generated by WealthTrack*\n".to_string()
}

/// Serialize any view as pretty JSON.
pub fn generate_json_report<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered output to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entry, QuarterData};
    use chrono::TimeZone;

    fn scenario_a() -> WealthRecord {
        WealthRecord {
            id: "2024-Q1".to_string(),
            timestamp: 1_711_929_600_000,
            data: QuarterData::empty()
                .with(
                    CategoryId::CashNoInterest,
                    vec![Entry::new("1", "Card", 3000.0), Entry::new("2", "Cash", 5000.0)],
                )
                .with(CategoryId::RealEstate, vec![Entry::new("4", "Flat", 3_500_000.0)])
                .with(CategoryId::Bitcoin, vec![Entry::new("5", "Wallet", 45_000.0)])
                .with(CategoryId::StocksIndex, vec![Entry::new("6", "S&P 500", 120_000.0)])
                .with(CategoryId::Pension, vec![Entry::new("7", "401k", 50_000.0)]),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_dashboard_markdown() {
        let report = DashboardReport::new(Some(&scenario_a()), now())
            .with_advice(Some("Keep diversifying.".to_string()));
        let markdown = generate_dashboard_markdown(&report);

        assert!(markdown.contains("# WealthTrack Dashboard"));
        assert!(markdown.contains("- **Quarter:** 2024-Q1"));
        assert!(markdown.contains("| **¥3,723,000** | ¥223,000 | ¥170,000 |"));
        assert!(markdown.contains("## Total Assets Distribution"));
        assert!(markdown.contains("## Disposable Assets Distribution"));
        assert!(markdown.contains("### Cash accounts: ¥8,000"));
        assert!(markdown.contains("### Stocks: ¥120,000"));
        assert!(markdown.contains("## AI Advice\n\nKeep diversifying."));
        // Zero slices are left out of the charts.
        assert!(!markdown.contains("| Bonds |"));
    }

    #[test]
    fn test_dashboard_empty_state() {
        let report = DashboardReport::new(None, now());
        let markdown = generate_dashboard_markdown(&report);

        assert!(markdown.contains("## Welcome to WealthTrack"));
        assert!(markdown.contains("record add"));
        assert!(!markdown.contains("## Overview"));
    }

    #[test]
    fn test_dashboard_json() {
        let report = DashboardReport::new(Some(&scenario_a()), now());
        let json = generate_json_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["quarter"], "2024-Q1");
        assert_eq!(value["metrics"]["total_assets"], 3_723_000.0);
        assert_eq!(value["total_assets_chart"].as_array().map(Vec::len), Some(5));
        assert!(value.get("advice").is_none());
    }

    #[test]
    fn test_record_form_all_non_empty_categories() {
        let draft = QuarterDraft::from_record(&scenario_a());
        let markdown = generate_record_form_markdown(&draft, None);

        assert!(markdown.contains("# Record: 2024-Q1"));
        assert!(markdown.contains("| `REAL_ESTATE` | Real estate | Asset | 1 | ¥3,500,000 |"));
        assert!(markdown.contains("**¥3,723,000**"));
        assert!(markdown.contains("## Bitcoin (`BITCOIN`)"));
        assert!(!markdown.contains("## Bonds (`BONDS`)"));
    }

    #[test]
    fn test_record_form_active_category() {
        let draft = QuarterDraft::from_record(&scenario_a());

        let markdown = generate_record_form_markdown(&draft, Some(CategoryId::CashNoInterest));
        assert!(markdown.contains("| `1` | Card | ¥3,000 |"));
        assert!(markdown.contains("**Category total:** ¥8,000"));
        assert!(!markdown.contains("## Bitcoin (`BITCOIN`)"));

        let markdown = generate_record_form_markdown(&draft, Some(CategoryId::Bonds));
        assert!(markdown.contains("--category bonds"));
    }

    #[test]
    fn test_table_cells_escape_pipes() {
        let mut record = scenario_a();
        record.id = "2024|Q1".to_string();
        record
            .data
            .get_mut(CategoryId::Bonds)
            .push(Entry::new("9", "Bank A | Bank B", 2_000.0));

        let draft = QuarterDraft::from_record(&record);
        let markdown = generate_record_form_markdown(&draft, Some(CategoryId::Bonds));
        assert!(markdown.contains("| `9` | Bank A \\| Bank B | ¥2,000 |"));

        let trends = generate_trends_markdown(&TrendsReport::from_records(&[record]));
        assert!(trends.contains("| 2024\\|Q1 | ¥3,725,000 |"));
        let row = trends
            .lines()
            .find(|line| line.starts_with("| 2024"))
            .unwrap();
        assert_eq!(row.matches(" | ").count(), 4);
    }

    #[test]
    fn test_record_form_empty_draft() {
        let markdown = generate_record_form_markdown(&QuarterDraft::new("2024-Q4"), None);
        assert!(markdown.contains("The draft is empty"));
    }

    #[test]
    fn test_trends_markdown() {
        let mut q2 = scenario_a();
        q2.id = "2024-Q2".to_string();
        q2.timestamp = 1_719_792_000_000;
        q2.data
            .get_mut(CategoryId::Bonds)
            .push(Entry::new("8", "Treasury", 10_000.0));

        let report = TrendsReport::from_records(&[scenario_a(), q2]);
        let markdown = generate_trends_markdown(&report);

        assert!(markdown.contains("| 2024-Q1 | ¥3,723,000 | ¥223,000 | ¥170,000 | - |"));
        assert!(markdown.contains("| 2024-Q2 | ¥3,733,000 | ¥233,000 | ¥170,000 | +¥10,000 |"));
        assert!(markdown.contains("Total assets  ▁█"));

        let q2_pos = markdown.find("- **[Q2]** 2024-Q2").unwrap();
        let q1_pos = markdown.find("- **[Q1]** 2024-Q1").unwrap();
        assert!(q2_pos < q1_pos);
        assert!(markdown.contains("(recorded 2024-04-01)"));
    }

    #[test]
    fn test_trends_empty() {
        let markdown = generate_trends_markdown(&TrendsReport::from_records(&[]));
        assert!(markdown.contains("No records yet"));
    }

    #[test]
    fn test_write_report() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("out.md");
        write_report("# hi\n", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hi\n");
    }
}
