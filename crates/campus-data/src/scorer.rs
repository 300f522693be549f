//! Variability scoring: per-building CV and classification-relative z-score.
//!
//! All undefined statistics (a single year of data, a zero mean, a
//! degenerate peer group) are `None` and are excluded from the group
//! moments used to score other buildings — they never panic and never
//! masquerade as zero.

use std::collections::BTreeMap;

use campus_core::models::{AnnualTotal, EnrichedReading, ScoredRecord, VarianceRecord};
use campus_core::stats;

// ── BuildingMeta ──────────────────────────────────────────────────────────────

/// Classification and coordinates attached to a building label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingMeta {
    pub classification: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Collect per-building metadata from the enriched readings.
///
/// Readings for one building all carry identical metadata (the joins are
/// keyed lookups), so the first occurrence wins.
pub fn building_meta(enriched: &[EnrichedReading]) -> BTreeMap<String, BuildingMeta> {
    let mut meta: BTreeMap<String, BuildingMeta> = BTreeMap::new();
    for entry in enriched {
        meta.entry(entry.building_label().to_string())
            .or_insert_with(|| BuildingMeta {
                classification: entry.classification.clone(),
                latitude: entry.latitude,
                longitude: entry.longitude,
            });
    }
    meta
}

// ── score ─────────────────────────────────────────────────────────────────────

/// Score every building present in `annual`.
///
/// 1. Sample mean and sample std (n−1) of each building's annual totals;
///    one year of data → std `None`.
/// 2. `cv = std / mean`, `None` for a zero mean; a negative mean keeps its
///    sign.
/// 3. CVs grouped by classification — `None` classifications form their own
///    unclassified group rather than being dropped.
/// 4. `z = (cv − group_mean) / group_std` over the group's finite CVs;
///    `None` when the group has fewer than two finite CVs or zero spread.
pub fn score(
    annual: &[AnnualTotal],
    meta: &BTreeMap<String, BuildingMeta>,
) -> Vec<ScoredRecord> {
    // ── Step 1–2: per-building variance records ───────────────────────────────
    let mut per_building: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for total in annual {
        per_building
            .entry(total.building.as_str())
            .or_default()
            .push(total.total_use);
    }

    let mut records: Vec<VarianceRecord> = Vec::with_capacity(per_building.len());
    for (building, totals) in &per_building {
        let Some(mean_annual) = stats::mean(totals) else {
            continue;
        };
        let std_annual = stats::sample_std(totals);
        let cv = std_annual.and_then(|std| stats::cv_from(mean_annual, std));
        let building_meta = meta.get(*building).cloned().unwrap_or_default();

        records.push(VarianceRecord {
            building: (*building).to_string(),
            mean_annual,
            std_annual,
            cv,
            classification: building_meta.classification,
            latitude: building_meta.latitude,
            longitude: building_meta.longitude,
        });
    }

    // ── Step 3: group finite CVs by classification ────────────────────────────
    let mut groups: BTreeMap<Option<String>, Vec<f64>> = BTreeMap::new();
    for record in &records {
        if let Some(cv) = record.cv {
            groups
                .entry(record.classification.clone())
                .or_default()
                .push(cv);
        }
    }

    let moments: BTreeMap<Option<String>, (f64, f64)> = groups
        .into_iter()
        .filter_map(|(classification, cvs)| {
            stats::group_moments(&cvs).map(|m| (classification, m))
        })
        .collect();

    // ── Step 4: z-scores ──────────────────────────────────────────────────────
    records
        .into_iter()
        .map(|variance| {
            let z_score = variance.cv.and_then(|cv| {
                let (group_mean, group_std) = moments.get(&variance.classification)?;
                if *group_std == 0.0 {
                    return None;
                }
                let z = (cv - group_mean) / group_std;
                z.is_finite().then_some(z)
            });
            ScoredRecord::from_variance(variance, z_score)
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
