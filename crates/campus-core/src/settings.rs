use clap::Parser;
use std::path::PathBuf;

use crate::error::{CampusError, Result};
use crate::models::{Commodity, CompareMode};
use crate::tiers::TierConfig;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Usage variability scoring for campus utility meters
#[derive(Parser, Debug, Clone)]
#[command(
    name = "campus-monitor",
    about = "Usage variability scoring for campus utility meters",
    version
)]
pub struct Settings {
    /// Utility commodity to score
    #[arg(long, default_value = "electric", value_parser = [
        "electric", "gas", "hotwater", "solarpv", "reclaimedwater", "chilledwater", "water",
    ])]
    pub commodity: String,

    /// Restrict results to one building classification
    #[arg(long)]
    pub classification: Option<String>,

    /// Comparison mode: tier on own CV or on the peer-group z-score
    #[arg(long, default_value = "self", value_parser = ["self", "peer"])]
    pub compare: String,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Score every commodity and print a per-tier summary
    #[arg(long)]
    pub all: bool,

    /// Print the monthly/annual series for one building instead of scores
    #[arg(long)]
    pub building: Option<String>,

    /// Meter readings CSV
    #[arg(long, default_value = "data/utility_readings.csv")]
    pub readings: PathBuf,

    /// Building metadata CSV
    #[arg(long, default_value = "data/building_info.csv")]
    pub buildings: PathBuf,

    /// Building coordinates CSV
    #[arg(long, default_value = "data/building_coordinates.csv")]
    pub coordinates: PathBuf,

    /// Tier threshold config file (JSON); defaults to
    /// ~/.campus-monitor/config.json when present
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the CV medium threshold
    #[arg(long)]
    pub cv_low: Option<f64>,

    /// Override the CV high threshold
    #[arg(long)]
    pub cv_high: Option<f64>,

    /// Override the z-score medium threshold
    #[arg(long, allow_hyphen_values = true)]
    pub z_low: Option<f64>,

    /// Override the z-score high threshold
    #[arg(long, allow_hyphen_values = true)]
    pub z_high: Option<f64>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,
}

impl Settings {
    /// The selected commodity as a typed value.
    pub fn commodity(&self) -> Result<Commodity> {
        Commodity::parse(&self.commodity)
            .ok_or_else(|| CampusError::Config(format!("unknown commodity '{}'", self.commodity)))
    }

    /// The selected comparison mode as a typed value.
    pub fn compare_mode(&self) -> Result<CompareMode> {
        CompareMode::from_arg(&self.compare)
            .ok_or_else(|| CampusError::Config(format!("unknown compare mode '{}'", self.compare)))
    }

    /// Resolve the effective tier configuration: the config file (explicit
    /// path, or the default location), then any CLI flag overrides on top.
    pub fn tier_config(&self) -> TierConfig {
        let mut config = match &self.config {
            Some(path) => TierConfig::load_from(path),
            None => TierConfig::load(),
        };

        if let Some(v) = self.cv_low {
            config.self_cv.low = v;
        }
        if let Some(v) = self.cv_high {
            config.self_cv.high = v;
        }
        if let Some(v) = self.z_low {
            config.peer_z.low = v;
        }
        if let Some(v) = self.z_high {
            config.peer_z.high = v;
        }

        config
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::TierThresholds;

    fn parse(args: &[&str]) -> Settings {
        let mut full = vec!["campus-monitor"];
        full.extend_from_slice(args);
        Settings::parse_from(full)
    }

    // ── defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_defaults() {
        let settings = parse(&[]);
        assert_eq!(settings.commodity, "electric");
        assert_eq!(settings.compare, "self");
        assert_eq!(settings.format, "table");
        assert!(settings.classification.is_none());
        assert!(!settings.all);
        assert_eq!(settings.readings, PathBuf::from("data/utility_readings.csv"));
    }

    // ── typed accessors ───────────────────────────────────────────────────────

    #[test]
    fn test_commodity_accessor() {
        let settings = parse(&["--commodity", "chilledwater"]);
        assert_eq!(settings.commodity().unwrap(), Commodity::ChilledWater);
    }

    #[test]
    fn test_compare_mode_accessor() {
        let settings = parse(&["--compare", "peer"]);
        assert_eq!(settings.compare_mode().unwrap(), CompareMode::PeerGroup);
    }

    // ── tier config resolution ────────────────────────────────────────────────

    #[test]
    fn test_tier_config_from_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("thresholds.json");
        TierConfig {
            self_cv: TierThresholds { low: 0.3, high: 0.6 },
            peer_z: TierThresholds { low: -0.5, high: 0.5 },
        }
        .save_to(&path)
        .unwrap();

        let settings = parse(&["--config", path.to_str().unwrap()]);
        let config = settings.tier_config();
        assert_eq!(config.self_cv.high, 0.6);
        assert_eq!(config.peer_z.high, 0.5);
    }

    #[test]
    fn test_tier_config_cli_overrides_win() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("thresholds.json");
        TierConfig::default().save_to(&path).unwrap();

        let settings = parse(&[
            "--config",
            path.to_str().unwrap(),
            "--cv-high",
            "0.6",
            "--z-low",
            "-0.5",
        ]);
        let config = settings.tier_config();
        assert_eq!(config.self_cv.high, 0.6);
        assert_eq!(config.peer_z.low, -0.5);
        // Untouched values stay at the file's (default) settings.
        assert_eq!(config.self_cv.low, 0.3);
    }

    #[test]
    fn test_tier_config_missing_explicit_file_uses_defaults() {
        let settings = parse(&["--config", "/nonexistent/thresholds.json"]);
        assert_eq!(settings.tier_config(), TierConfig::default());
    }
}
