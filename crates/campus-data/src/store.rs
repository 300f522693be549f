//! Normalisation of raw tables into canonical domain records.
//!
//! The reading store owns the messy edge of the pipeline: header names with
//! embedded line breaks, the historical "Building Name" → "Building" rename,
//! and per-row values that fail to parse. Missing required columns are fatal
//! for the load; bad rows are skipped with a counted warning.

use campus_core::error::{CampusError, Result};
use campus_core::models::{BuildingCoordinate, BuildingInfo, Commodity, Reading};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::reader::RawTable;

// ── Canonical column names ────────────────────────────────────────────────────

/// Readings table: building-linking key.
pub const COL_ACCOUNT_KEY: &str = "CAAN";
/// Readings table: commodity wire code.
pub const COL_COMMODITY: &str = "CommodityCode";
/// Readings table: metering period end date.
pub const COL_PERIOD_END: &str = "EndDate";
/// Readings table: usage quantity.
pub const COL_USE: &str = "Use";

/// Building metadata table.
pub const COL_INFO_ACCOUNT: &str = "Building Capital Asset Account Number";
pub const COL_BUILDING: &str = "Building";
pub const COL_CLASSIFICATION: &str = "Building Classification";

/// Coordinate table.
pub const COL_LATITUDE: &str = "Latitude";
pub const COL_LONGITUDE: &str = "Longitude";

// ── Header normalisation ──────────────────────────────────────────────────────

/// Canonicalise one raw header name: strip embedded line breaks, trim
/// surrounding whitespace, and fold the historical "Building Name" header
/// into "Building".
fn canonical_column(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let cleaned = cleaned.trim();
    if cleaned == "Building Name" {
        COL_BUILDING.to_string()
    } else {
        cleaned.to_string()
    }
}

fn canonical_columns(table: &RawTable) -> Vec<String> {
    table.columns.iter().map(|c| canonical_column(c)).collect()
}

fn require_column(table: &RawTable, canonical: &[String], name: &str) -> Result<usize> {
    canonical
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| CampusError::MissingColumn {
            table: table.name.clone(),
            column: name.to_string(),
        })
}

fn cell<'a>(row: &'a [String], idx: usize) -> &'a str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

// ── Date parsing ──────────────────────────────────────────────────────────────

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a period-end cell. Spreadsheet exports vary between plain dates
/// and midnight timestamps; both are accepted.
fn parse_period_end(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    None
}

// ── Reading store ─────────────────────────────────────────────────────────────

/// Normalise the raw readings table into canonical [`Reading`] records.
///
/// Quantities are passed through unvalidated — negative and zero usage are
/// legitimate (net-metered solar export, credits). Rows whose key is empty
/// or whose commodity/date/quantity fail to parse are skipped and counted;
/// a missing required column is a fatal [`CampusError::MissingColumn`].
pub fn load_readings(table: &RawTable) -> Result<Vec<Reading>> {
    let canonical = canonical_columns(table);
    let key_idx = require_column(table, &canonical, COL_ACCOUNT_KEY)?;
    let commodity_idx = require_column(table, &canonical, COL_COMMODITY)?;
    let date_idx = require_column(table, &canonical, COL_PERIOD_END)?;
    let use_idx = require_column(table, &canonical, COL_USE)?;

    let mut readings: Vec<Reading> = Vec::with_capacity(table.rows.len());
    let mut skipped_key = 0usize;
    let mut skipped_commodity = 0usize;
    let mut skipped_date = 0usize;
    let mut skipped_quantity = 0usize;

    for row in &table.rows {
        let building_key = cell(row, key_idx);
        if building_key.is_empty() {
            skipped_key += 1;
            continue;
        }

        let Some(commodity) = Commodity::from_code(cell(row, commodity_idx)) else {
            skipped_commodity += 1;
            continue;
        };

        let Some(period_end) = parse_period_end(cell(row, date_idx)) else {
            skipped_date += 1;
            continue;
        };

        let Ok(quantity) = cell(row, use_idx).parse::<f64>() else {
            skipped_quantity += 1;
            continue;
        };

        readings.push(Reading {
            building_key: building_key.to_string(),
            commodity,
            period_end,
            quantity,
        });
    }

    let skipped = skipped_key + skipped_commodity + skipped_date + skipped_quantity;
    if skipped > 0 {
        warn!(
            table = %table.name,
            skipped_key,
            skipped_commodity,
            skipped_date,
            skipped_quantity,
            "skipped unparseable reading rows"
        );
    }
    debug!(
        table = %table.name,
        loaded = readings.len(),
        skipped,
        "readings loaded"
    );

    Ok(readings)
}

// ── Reference-table loaders ───────────────────────────────────────────────────

/// Load the building metadata table. Rows without an account number or a
/// building name cannot participate in any join and are skipped; an empty
/// classification is kept (the resolver surfaces it as unclassified).
pub fn load_building_info(table: &RawTable) -> Result<Vec<BuildingInfo>> {
    let canonical = canonical_columns(table);
    let account_idx = require_column(table, &canonical, COL_INFO_ACCOUNT)?;
    let name_idx = require_column(table, &canonical, COL_BUILDING)?;
    let class_idx = require_column(table, &canonical, COL_CLASSIFICATION)?;

    let mut buildings: Vec<BuildingInfo> = Vec::with_capacity(table.rows.len());
    let mut skipped = 0usize;

    for row in &table.rows {
        let account_number = cell(row, account_idx);
        let building_name = cell(row, name_idx);
        if account_number.is_empty() || building_name.is_empty() {
            skipped += 1;
            continue;
        }
        buildings.push(BuildingInfo {
            account_number: account_number.to_string(),
            building_name: building_name.to_string(),
            classification: cell(row, class_idx).to_string(),
        });
    }

    if skipped > 0 {
        warn!(table = %table.name, skipped, "skipped incomplete building rows");
    }
    debug!(table = %table.name, loaded = buildings.len(), "building metadata loaded");

    Ok(buildings)
}

/// Load the coordinate table. A building may legitimately lack coordinates;
/// rows with an empty name or unparseable latitude/longitude are skipped.
pub fn load_coordinates(table: &RawTable) -> Result<Vec<BuildingCoordinate>> {
    let canonical = canonical_columns(table);
    let name_idx = require_column(table, &canonical, COL_BUILDING)?;
    let lat_idx = require_column(table, &canonical, COL_LATITUDE)?;
    let lon_idx = require_column(table, &canonical, COL_LONGITUDE)?;

    let mut coordinates: Vec<BuildingCoordinate> = Vec::with_capacity(table.rows.len());
    let mut skipped = 0usize;

    for row in &table.rows {
        let building_name = cell(row, name_idx);
        let latitude = cell(row, lat_idx).parse::<f64>();
        let longitude = cell(row, lon_idx).parse::<f64>();
        match (building_name.is_empty(), latitude, longitude) {
            (false, Ok(latitude), Ok(longitude)) => coordinates.push(BuildingCoordinate {
                building_name: building_name.to_string(),
                latitude,
                longitude,
            }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(table = %table.name, skipped, "skipped incomplete coordinate rows");
    }
    debug!(table = %table.name, loaded = coordinates.len(), "coordinates loaded");

    Ok(coordinates)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
