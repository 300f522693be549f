mod bootstrap;

use anyhow::Result;
use campus_core::models::CompareMode;
use campus_core::settings::Settings;
use campus_data::query::{BuildingSeries, Dataset, QueryRow};
use campus_data::reader::RawTable;
use campus_data::store;
use campus_runtime::engine::{CommoditySummary, ScoringEngine};
use clap::Parser;

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("campus-monitor v{} starting", env!("CARGO_PKG_VERSION"));

    let commodity = settings.commodity()?;
    let mode = settings.compare_mode()?;
    let tiers = settings.tier_config();

    let dataset = load_dataset(&settings)?;
    tracing::info!(
        readings = dataset.readings.len(),
        buildings = dataset.buildings.len(),
        coordinates = dataset.coordinates.len(),
        "dataset loaded"
    );

    let mut engine = ScoringEngine::new(dataset, tiers);
    let json = settings.format == "json";

    if let Some(building) = &settings.building {
        let series = engine.building_series(commodity, building);
        if series.monthly.is_empty() {
            println!("No usage records for this building.");
        } else if json {
            println!("{}", serde_json::to_string_pretty(&series)?);
        } else {
            print_series(&series);
        }
    } else if settings.all {
        let summary = engine.summary(mode);
        if json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }
    } else {
        let rows = engine.query(commodity, settings.classification.as_deref(), mode);
        if rows.is_empty() {
            println!("No data available for this selection.");
        } else if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            print_rows(&rows, mode);
        }
    }

    Ok(())
}

// ── Dataset loading ───────────────────────────────────────────────────────────

fn load_dataset(settings: &Settings) -> Result<Dataset> {
    let readings = RawTable::from_csv_path(&settings.readings)?;
    let buildings = RawTable::from_csv_path(&settings.buildings)?;
    let coordinates = RawTable::from_csv_path(&settings.coordinates)?;

    Ok(Dataset {
        readings: store::load_readings(&readings)?,
        buildings: store::load_building_info(&buildings)?,
        coordinates: store::load_coordinates(&coordinates)?,
    })
}

// ── Plain-text views ──────────────────────────────────────────────────────────

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "n/a".to_string(),
    }
}

fn print_rows(rows: &[QueryRow], mode: CompareMode) {
    println!(
        "{:<32} {:<20} {:>14} {:>10} {:>10} {:>14} {:>8}",
        "Building",
        "Classification",
        "Mean Annual",
        "CV",
        "Z-score",
        "Avg Monthly",
        "Tier",
    );
    for row in rows {
        println!(
            "{:<32} {:<20} {:>14.2} {:>10} {:>10} {:>14} {:>8}",
            row.building,
            row.classification.as_deref().unwrap_or("(unclassified)"),
            row.mean_annual,
            fmt_opt(row.cv),
            fmt_opt(row.z_score),
            fmt_opt(row.avg_monthly_use),
            row.tier,
        );
    }
    println!();
    println!(
        "{} buildings, tiered on {}",
        rows.len(),
        mode.metric_name()
    );
}

fn print_summary(summary: &[CommoditySummary]) {
    println!(
        "{:<18} {:>10} {:>6} {:>8} {:>6} {:>9}",
        "Commodity", "Buildings", "High", "Medium", "Low", "Unknown",
    );
    for entry in summary {
        println!(
            "{:<18} {:>10} {:>6} {:>8} {:>6} {:>9}",
            entry.commodity.label(),
            entry.buildings,
            entry.high,
            entry.medium,
            entry.low,
            entry.unknown,
        );
    }
}

fn print_series(series: &BuildingSeries) {
    println!("Usage series for {}", series.building);
    println!();
    println!("{:<10} {:>14}", "Month", "Total Use");
    for month in &series.monthly {
        println!("{:<10} {:>14.2}", month.month, month.total_use);
    }
    println!();
    println!("{:<10} {:>14}", "Year", "Total Use");
    for year in &series.annual {
        println!("{:<10} {:>14.2}", year.year, year.total_use);
    }
}
