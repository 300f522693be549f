//! Usage aggregation over monthly and annual calendar windows.

use std::collections::BTreeMap;

use campus_core::models::{AnnualTotal, Commodity, EnrichedReading, MonthlyTotal};

// ── UsageAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that sums enriched readings into calendar buckets.
///
/// Buckets are truncations of the period-end date, not rolling windows.
/// Buildings with zero matching readings for the requested commodity simply
/// do not appear (no zero-fill). Output is sorted by building, then period.
pub struct UsageAggregator;

impl UsageAggregator {
    /// Sum usage per (building, calendar month). Month key format: `"%Y-%m"`.
    pub fn aggregate_monthly(
        enriched: &[EnrichedReading],
        commodity: Commodity,
    ) -> Vec<MonthlyTotal> {
        // BTreeMap keys give the stable (building, period) ordering for free.
        let mut map: BTreeMap<(String, String), f64> = BTreeMap::new();

        for entry in enriched.iter().filter(|e| e.reading.commodity == commodity) {
            let key = (
                entry.building_label().to_string(),
                entry.reading.period_end.format("%Y-%m").to_string(),
            );
            *map.entry(key).or_insert(0.0) += entry.reading.quantity;
        }

        map.into_iter()
            .map(|((building, month), total_use)| MonthlyTotal {
                building,
                month,
                total_use,
            })
            .collect()
    }

    /// Sum usage per (building, calendar year).
    pub fn aggregate_annual(
        enriched: &[EnrichedReading],
        commodity: Commodity,
    ) -> Vec<AnnualTotal> {
        use chrono::Datelike;

        let mut map: BTreeMap<(String, i32), f64> = BTreeMap::new();

        for entry in enriched.iter().filter(|e| e.reading.commodity == commodity) {
            let key = (
                entry.building_label().to_string(),
                entry.reading.period_end.year(),
            );
            *map.entry(key).or_insert(0.0) += entry.reading.quantity;
        }

        map.into_iter()
            .map(|((building, year), total_use)| AnnualTotal {
                building,
                year,
                total_use,
            })
            .collect()
    }

    /// Mean of each building's monthly totals (the facade's
    /// avg-monthly-use column).
    pub fn monthly_means(monthly: &[MonthlyTotal]) -> BTreeMap<String, f64> {
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for total in monthly {
            let entry = sums.entry(total.building.clone()).or_insert((0.0, 0));
            entry.0 += total.total_use;
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(building, (sum, count))| (building, sum / count as f64))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::models::Reading;
    use chrono::NaiveDate;

    fn make_enriched(building: &str, commodity: Commodity, date: &str, quantity: f64) -> EnrichedReading {
        EnrichedReading {
            reading: Reading {
                building_key: format!("key-{building}"),
                commodity,
                period_end: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                quantity,
            },
            building: Some(building.to_string()),
            classification: None,
            latitude: None,
            longitude: None,
        }
    }

    // ── aggregate_monthly ─────────────────────────────────────────────────────

    #[test]
    fn test_monthly_groups_by_calendar_month() {
        let enriched = vec![
            make_enriched("B1", Commodity::Electric, "2022-01-05", 100.0),
            make_enriched("B1", Commodity::Electric, "2022-01-20", 50.0),
            make_enriched("B1", Commodity::Electric, "2022-02-10", 30.0),
        ];
        let monthly = UsageAggregator::aggregate_monthly(&enriched, Commodity::Electric);

        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].month, "2022-01");
        assert!((monthly[0].total_use - 150.0).abs() < 1e-9);
        assert_eq!(monthly[1].month, "2022-02");
        assert!((monthly[1].total_use - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_filters_by_commodity() {
        let enriched = vec![
            make_enriched("B1", Commodity::Electric, "2022-01-05", 100.0),
            make_enriched("B1", Commodity::NaturalGas, "2022-01-05", 999.0),
        ];
        let monthly = UsageAggregator::aggregate_monthly(&enriched, Commodity::Electric);

        assert_eq!(monthly.len(), 1);
        assert!((monthly[0].total_use - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_sorted_by_building_then_month() {
        let enriched = vec![
            make_enriched("Zebra Hall", Commodity::Electric, "2022-02-05", 1.0),
            make_enriched("Alpha Hall", Commodity::Electric, "2022-03-05", 2.0),
            make_enriched("Zebra Hall", Commodity::Electric, "2022-01-05", 3.0),
        ];
        let monthly = UsageAggregator::aggregate_monthly(&enriched, Commodity::Electric);

        let keys: Vec<(&str, &str)> = monthly
            .iter()
            .map(|m| (m.building.as_str(), m.month.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Alpha Hall", "2022-03"),
                ("Zebra Hall", "2022-01"),
                ("Zebra Hall", "2022-02"),
            ]
        );
    }

    #[test]
    fn test_monthly_empty_input() {
        assert!(UsageAggregator::aggregate_monthly(&[], Commodity::Water).is_empty());
    }

    #[test]
    fn test_monthly_unmatched_reading_grouped_by_account_key() {
        let mut entry = make_enriched("B1", Commodity::Electric, "2022-01-05", 10.0);
        entry.building = None;
        let monthly = UsageAggregator::aggregate_monthly(&[entry], Commodity::Electric);

        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].building, "key-B1");
    }

    // ── aggregate_annual ──────────────────────────────────────────────────────

    #[test]
    fn test_annual_matches_worked_example() {
        // Readings (B1, ELECTRIC): 2022-01-15 → 100, 2022-06-15 → 50,
        // 2023-01-15 → 200. Annual totals: 2022 → 150, 2023 → 200.
        let enriched = vec![
            make_enriched("B1", Commodity::Electric, "2022-01-15", 100.0),
            make_enriched("B1", Commodity::Electric, "2022-06-15", 50.0),
            make_enriched("B1", Commodity::Electric, "2023-01-15", 200.0),
        ];
        let annual = UsageAggregator::aggregate_annual(&enriched, Commodity::Electric);

        assert_eq!(annual.len(), 2);
        assert_eq!(annual[0].year, 2022);
        assert!((annual[0].total_use - 150.0).abs() < 1e-9);
        assert_eq!(annual[1].year, 2023);
        assert!((annual[1].total_use - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_annual_negative_quantities_sum_through() {
        let enriched = vec![
            make_enriched("B1", Commodity::SolarPv, "2022-01-15", -100.0),
            make_enriched("B1", Commodity::SolarPv, "2022-06-15", 40.0),
        ];
        let annual = UsageAggregator::aggregate_annual(&enriched, Commodity::SolarPv);
        assert!((annual[0].total_use + 60.0).abs() < 1e-9);
    }

    // ── monthly/annual consistency ────────────────────────────────────────────

    #[test]
    fn test_monthly_totals_sum_to_annual_total() {
        let enriched = vec![
            make_enriched("B1", Commodity::Electric, "2022-01-15", 100.0),
            make_enriched("B1", Commodity::Electric, "2022-01-20", 25.0),
            make_enriched("B1", Commodity::Electric, "2022-06-15", 50.0),
            make_enriched("B1", Commodity::Electric, "2022-11-01", 12.5),
        ];
        let monthly = UsageAggregator::aggregate_monthly(&enriched, Commodity::Electric);
        let annual = UsageAggregator::aggregate_annual(&enriched, Commodity::Electric);

        let monthly_sum: f64 = monthly
            .iter()
            .filter(|m| m.month.starts_with("2022-"))
            .map(|m| m.total_use)
            .sum();
        assert_eq!(annual.len(), 1);
        assert!((monthly_sum - annual[0].total_use).abs() < 1e-9);
    }

    // ── monthly_means ─────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_means() {
        let enriched = vec![
            make_enriched("B1", Commodity::Electric, "2022-01-15", 100.0),
            make_enriched("B1", Commodity::Electric, "2022-02-15", 50.0),
            make_enriched("B2", Commodity::Electric, "2022-01-15", 10.0),
        ];
        let monthly = UsageAggregator::aggregate_monthly(&enriched, Commodity::Electric);
        let means = UsageAggregator::monthly_means(&monthly);

        assert!((means["B1"] - 75.0).abs() < 1e-9);
        assert!((means["B2"] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_means_empty() {
        assert!(UsageAggregator::monthly_means(&[]).is_empty());
    }
}
