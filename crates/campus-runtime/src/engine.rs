//! Scoring engine: immutable dataset + score cache + tier configuration.
//!
//! The natural service shape for the pipeline — reference data loaded once
//! at startup, per-request results computed independently with no locking,
//! since every input is read-only after load.

use campus_core::models::{Commodity, CompareMode, Tier};
use campus_core::tiers::TierConfig;
use campus_data::query::{building_series, rows_from_scores, BuildingSeries, Dataset, QueryRow};
use serde::Serialize;

use crate::cache::ScoreCache;

// ── CommoditySummary ──────────────────────────────────────────────────────────

/// Per-commodity tier counts for the all-commodity overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommoditySummary {
    pub commodity: Commodity,
    pub buildings: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unknown: usize,
}

// ── ScoringEngine ─────────────────────────────────────────────────────────────

/// Serves scored, filtered, tiered queries over one loaded dataset.
pub struct ScoringEngine {
    dataset: Dataset,
    cache: ScoreCache,
    tiers: TierConfig,
}

impl ScoringEngine {
    pub fn new(dataset: Dataset, tiers: TierConfig) -> Self {
        Self {
            dataset,
            cache: ScoreCache::new(),
            tiers,
        }
    }

    /// Scored rows for one commodity, optionally restricted to a
    /// classification, tiered in the given comparison mode.
    pub fn query(
        &mut self,
        commodity: Commodity,
        classification: Option<&str>,
        mode: CompareMode,
    ) -> Vec<QueryRow> {
        let scores = self.cache.scores(&self.dataset, commodity);
        rows_from_scores(scores, classification, mode, &self.tiers)
    }

    /// Monthly/annual usage series for a single building.
    pub fn building_series(&self, commodity: Commodity, building: &str) -> BuildingSeries {
        building_series(&self.dataset, commodity, building)
    }

    /// Tier counts for every commodity, through the shared cache.
    pub fn summary(&mut self, mode: CompareMode) -> Vec<CommoditySummary> {
        Commodity::ALL
            .iter()
            .map(|&commodity| {
                let rows = self.query(commodity, None, mode);
                let count = |tier: Tier| rows.iter().filter(|r| r.tier == tier).count();
                CommoditySummary {
                    commodity,
                    buildings: rows.len(),
                    high: count(Tier::High),
                    medium: count(Tier::Medium),
                    low: count(Tier::Low),
                    unknown: count(Tier::Unknown),
                }
            })
            .collect()
    }

    pub fn cache(&self) -> &ScoreCache {
        &self.cache
    }

    pub fn tier_config(&self) -> &TierConfig {
        &self.tiers
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::models::{BuildingInfo, Reading};
    use campus_data::query;
    use chrono::NaiveDate;

    fn make_reading(key: &str, commodity: Commodity, date: &str, quantity: f64) -> Reading {
        Reading {
            building_key: key.to_string(),
            commodity,
            period_end: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            quantity,
        }
    }

    fn make_dataset() -> Dataset {
        Dataset {
            readings: vec![
                make_reading("1001", Commodity::Electric, "2022-01-15", 150.0),
                make_reading("1001", Commodity::Electric, "2023-01-15", 200.0),
                make_reading("1002", Commodity::Electric, "2022-03-01", 100.0),
                make_reading("1002", Commodity::Electric, "2023-03-01", 300.0),
                make_reading("1001", Commodity::Water, "2022-03-01", 40.0),
            ],
            buildings: vec![
                BuildingInfo {
                    account_number: "1001".to_string(),
                    building_name: "Pacific Hall".to_string(),
                    classification: "Lab".to_string(),
                },
                BuildingInfo {
                    account_number: "1002".to_string(),
                    building_name: "Bonner Hall".to_string(),
                    classification: "Lab".to_string(),
                },
            ],
            coordinates: vec![],
        }
    }

    #[test]
    fn test_engine_query_matches_facade() {
        let dataset = make_dataset();
        let config = TierConfig::default();
        let mut engine = ScoringEngine::new(dataset.clone(), config);

        let from_engine = engine.query(Commodity::Electric, None, CompareMode::SelfHistory);
        let direct = query::query(
            &dataset,
            Commodity::Electric,
            None,
            CompareMode::SelfHistory,
            &config,
        );
        assert_eq!(from_engine, direct);
    }

    #[test]
    fn test_engine_repeat_queries_hit_cache() {
        let mut engine = ScoringEngine::new(make_dataset(), TierConfig::default());

        engine.query(Commodity::Electric, None, CompareMode::SelfHistory);
        engine.query(Commodity::Electric, Some("Lab"), CompareMode::PeerGroup);

        assert_eq!(engine.cache().misses(), 1);
        assert_eq!(engine.cache().hits(), 1);
    }

    #[test]
    fn test_engine_summary_counts_tiers() {
        let mut engine = ScoringEngine::new(make_dataset(), TierConfig::default());
        let summary = engine.summary(CompareMode::SelfHistory);

        assert_eq!(summary.len(), Commodity::ALL.len());

        let electric = summary
            .iter()
            .find(|s| s.commodity == Commodity::Electric)
            .unwrap();
        assert_eq!(electric.buildings, 2);
        // cv ≈ 0.202 → Low, cv ≈ 0.707 → High.
        assert_eq!(electric.low, 1);
        assert_eq!(electric.high, 1);

        let water = summary
            .iter()
            .find(|s| s.commodity == Commodity::Water)
            .unwrap();
        // Single year of water data → cv undefined → Unknown.
        assert_eq!(water.buildings, 1);
        assert_eq!(water.unknown, 1);

        let gas = summary
            .iter()
            .find(|s| s.commodity == Commodity::NaturalGas)
            .unwrap();
        assert_eq!(gas.buildings, 0);
    }

    #[test]
    fn test_engine_building_series() {
        let engine = ScoringEngine::new(make_dataset(), TierConfig::default());
        let series = engine.building_series(Commodity::Electric, "Pacific Hall");
        assert_eq!(series.annual.len(), 2);
    }
}
