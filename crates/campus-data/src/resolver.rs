//! Joins readings to building identity, classification and coordinates.
//!
//! Both joins are left-preserving: a reading that matches nothing is kept
//! with `None` fields. Join keys are compared as trimmed strings and never
//! coerced to numbers, so leading zeros and formatting differences cannot
//! silently break the join.

use std::collections::HashMap;

use campus_core::models::{BuildingCoordinate, BuildingInfo, EnrichedReading, Reading};
use tracing::warn;

// ── JoinReport ────────────────────────────────────────────────────────────────

/// Observable data-quality counters for one resolve pass.
///
/// Unmatched rows are not errors; they flow through the pipeline as `None`
/// fields. The counts exist so callers and tests can see the gap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinReport {
    /// Total readings processed.
    pub readings_total: usize,
    /// Readings whose account key matched no building metadata row.
    pub unmatched_buildings: usize,
    /// Readings whose resolved building name had no coordinate row.
    pub unmatched_coordinates: usize,
}

// ── resolve ───────────────────────────────────────────────────────────────────

/// Enrich every reading with building metadata and coordinates.
///
/// Pure transform: readings are never filtered, re-coded or reordered. An
/// empty classification string in the metadata is surfaced as `None` so the
/// scorer groups those buildings into the unclassified bucket.
pub fn resolve(
    readings: &[Reading],
    buildings: &[BuildingInfo],
    coordinates: &[BuildingCoordinate],
) -> (Vec<EnrichedReading>, JoinReport) {
    let by_account: HashMap<&str, &BuildingInfo> = buildings
        .iter()
        .map(|b| (b.account_number.trim(), b))
        .collect();
    let by_name: HashMap<&str, &BuildingCoordinate> = coordinates
        .iter()
        .map(|c| (c.building_name.trim(), c))
        .collect();

    let mut report = JoinReport {
        readings_total: readings.len(),
        ..JoinReport::default()
    };

    let mut enriched: Vec<EnrichedReading> = Vec::with_capacity(readings.len());
    for reading in readings {
        let info = by_account.get(reading.building_key.trim()).copied();

        let (building, classification) = match info {
            Some(info) => {
                let classification = match info.classification.trim() {
                    "" => None,
                    label => Some(label.to_string()),
                };
                (Some(info.building_name.clone()), classification)
            }
            None => {
                report.unmatched_buildings += 1;
                (None, None)
            }
        };

        let coordinate = building
            .as_deref()
            .and_then(|name| by_name.get(name.trim()).copied());
        if building.is_some() && coordinate.is_none() {
            report.unmatched_coordinates += 1;
        }

        enriched.push(EnrichedReading {
            reading: reading.clone(),
            building,
            classification,
            latitude: coordinate.map(|c| c.latitude),
            longitude: coordinate.map(|c| c.longitude),
        });
    }

    if report.unmatched_buildings > 0 || report.unmatched_coordinates > 0 {
        warn!(
            unmatched_buildings = report.unmatched_buildings,
            unmatched_coordinates = report.unmatched_coordinates,
            total = report.readings_total,
            "join gaps while resolving readings"
        );
    }

    (enriched, report)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
