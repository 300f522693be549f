//! Query facade composing the full scoring pipeline.
//!
//! The single entry point the surrounding application calls: filter by
//! commodity, score, optionally filter by classification, attach the
//! avg-monthly-use figure and the risk tier. A filter combination that
//! matches nothing yields an empty Vec, never an error.

use std::collections::BTreeMap;

use campus_core::models::{
    AnnualTotal, BuildingCoordinate, BuildingInfo, Commodity, CompareMode, MonthlyTotal,
    Reading, ScoredRecord, Tier,
};
use campus_core::tiers::{classify, TierConfig};
use serde::Serialize;

use crate::aggregator::UsageAggregator;
use crate::resolver;
use crate::scorer;

// ── Dataset ───────────────────────────────────────────────────────────────────

/// The three immutable input tables, loaded once per process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub readings: Vec<Reading>,
    pub buildings: Vec<BuildingInfo>,
    pub coordinates: Vec<BuildingCoordinate>,
}

// ── Output rows ───────────────────────────────────────────────────────────────

/// One row of the facade's output surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRow {
    pub building: String,
    pub classification: Option<String>,
    pub mean_annual: f64,
    pub cv: Option<f64>,
    pub z_score: Option<f64>,
    pub tier: Tier,
    pub avg_monthly_use: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Scored records plus the per-building monthly means for one commodity —
/// the unit the runtime cache stores.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommodityScores {
    pub records: Vec<ScoredRecord>,
    pub monthly_means: BTreeMap<String, f64>,
}

/// Monthly and annual totals for a single building (the charting surface).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingSeries {
    pub building: String,
    pub monthly: Vec<MonthlyTotal>,
    pub annual: Vec<AnnualTotal>,
}

// ── Pipeline stages ───────────────────────────────────────────────────────────

/// Score every building for one commodity: resolve → aggregate annually →
/// score, plus the monthly means the facade attaches later. No filtering
/// or tiering happens here, so peer groups are always complete.
pub fn score_commodity(dataset: &Dataset, commodity: Commodity) -> CommodityScores {
    let (enriched, report) =
        resolver::resolve(&dataset.readings, &dataset.buildings, &dataset.coordinates);
    tracing::debug!(
        commodity = commodity.code(),
        readings = report.readings_total,
        unmatched_buildings = report.unmatched_buildings,
        unmatched_coordinates = report.unmatched_coordinates,
        "scoring commodity"
    );

    let annual = UsageAggregator::aggregate_annual(&enriched, commodity);
    let monthly = UsageAggregator::aggregate_monthly(&enriched, commodity);
    let meta = scorer::building_meta(&enriched);

    CommodityScores {
        records: scorer::score(&annual, &meta),
        monthly_means: UsageAggregator::monthly_means(&monthly),
    }
}

/// Turn scored records into facade rows: classification filter, monthly
/// mean, tier.
pub fn rows_from_scores(
    scores: &CommodityScores,
    classification: Option<&str>,
    mode: CompareMode,
    config: &TierConfig,
) -> Vec<QueryRow> {
    scores
        .records
        .iter()
        .filter(|record| match classification {
            Some(filter) => record.classification.as_deref() == Some(filter),
            None => true,
        })
        .map(|record| QueryRow {
            building: record.building.clone(),
            classification: record.classification.clone(),
            mean_annual: record.mean_annual,
            cv: record.cv,
            z_score: record.z_score,
            tier: classify(mode.metric(record), mode, config),
            avg_monthly_use: scores.monthly_means.get(&record.building).copied(),
            latitude: record.latitude,
            longitude: record.longitude,
        })
        .collect()
}

/// The full facade query in one call.
pub fn query(
    dataset: &Dataset,
    commodity: Commodity,
    classification: Option<&str>,
    mode: CompareMode,
    config: &TierConfig,
) -> Vec<QueryRow> {
    let scores = score_commodity(dataset, commodity);
    rows_from_scores(&scores, classification, mode, config)
}

/// Monthly and annual series for one building under one commodity.
///
/// Returns empty series when the building has no matching readings.
pub fn building_series(dataset: &Dataset, commodity: Commodity, building: &str) -> BuildingSeries {
    let (enriched, _) =
        resolver::resolve(&dataset.readings, &dataset.buildings, &dataset.coordinates);

    let monthly = UsageAggregator::aggregate_monthly(&enriched, commodity)
        .into_iter()
        .filter(|m| m.building == building)
        .collect();
    let annual = UsageAggregator::aggregate_annual(&enriched, commodity)
        .into_iter()
        .filter(|a| a.building == building)
        .collect();

    BuildingSeries {
        building: building.to_string(),
        monthly,
        annual,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
