//! Cross-quarter trend series.

use crate::analysis::aggregator::calculate_quarter_metrics;
use crate::models::{TrendPoint, WealthRecord};

/// One point per record, in the order given (oldest first for a sorted book).
pub fn trend_points(records: &[WealthRecord]) -> Vec<TrendPoint> {
    records
        .iter()
        .map(|record| {
            let metrics = calculate_quarter_metrics(record).metrics;
            TrendPoint {
                name: record.id.clone(),
                timestamp: record.timestamp,
                total_assets: metrics.total_assets,
                disposable_assets: metrics.disposable_assets,
                total_market_index: metrics.total_market_index,
            }
        })
        .collect()
}

/// Change of total assets between consecutive points; the first is `None`.
pub fn quarter_over_quarter(points: &[TrendPoint]) -> Vec<Option<f64>> {
    let mut changes = Vec::with_capacity(points.len());
    let mut previous: Option<f64> = None;

    for point in points {
        changes.push(previous.map(|prev| point.total_assets - prev));
        previous = Some(point.total_assets);
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::CategoryId;
    use crate::models::{Entry, QuarterData};

    fn record(id: &str, timestamp: i64, cash: f64, house: f64) -> WealthRecord {
        WealthRecord {
            id: id.to_string(),
            timestamp,
            data: QuarterData::empty()
                .with(CategoryId::CashInterest, vec![Entry::new("1", "Saving", cash)])
                .with(CategoryId::RealEstate, vec![Entry::new("2", "Flat", house)]),
        }
    }

    #[test]
    fn test_trend_points_follow_record_order() {
        let records = vec![
            record("2024-Q1", 1, 10_000.0, 500_000.0),
            record("2024-Q2", 2, 15_000.0, 500_000.0),
        ];
        let points = trend_points(&records);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "2024-Q1");
        assert_eq!(points[0].total_assets, 510_000.0);
        assert_eq!(points[0].disposable_assets, 10_000.0);
        assert_eq!(points[1].total_assets, 515_000.0);
        assert_eq!(points[1].total_market_index, 0.0);
    }

    #[test]
    fn test_trend_points_empty() {
        assert!(trend_points(&[]).is_empty());
    }

    #[test]
    fn test_quarter_over_quarter() {
        let records = vec![
            record("2024-Q1", 1, 10_000.0, 0.0),
            record("2024-Q2", 2, 15_000.0, 0.0),
            record("2024-Q3", 3, 12_000.0, 0.0),
        ];
        let changes = quarter_over_quarter(&trend_points(&records));

        assert_eq!(changes, vec![None, Some(5_000.0), Some(-3_000.0)]);
    }
}
