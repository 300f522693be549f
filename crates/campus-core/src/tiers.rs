//! Tier thresholds and the risk classifier.
//!
//! Thresholds are configuration, not constants: observed feeds disagree on
//! the exact cut-offs (0.5 vs 0.6 for a "high" CV), so the defaults below
//! can be overridden per run via CLI flags or a JSON config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::{CompareMode, Tier};

// ── TierThresholds ────────────────────────────────────────────────────────────

/// A pair of cut-offs for one metric: `High` above `high`, `Medium` above
/// `low`, `Low` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub low: f64,
    pub high: f64,
}

impl TierThresholds {
    /// Map a defined metric value to its tier. Comparisons are strict, so a
    /// value exactly at a threshold falls into the lower tier.
    pub fn classify(&self, value: f64) -> Tier {
        if value > self.high {
            Tier::High
        } else if value > self.low {
            Tier::Medium
        } else {
            Tier::Low
        }
    }
}

// ── TierConfig ────────────────────────────────────────────────────────────────

fn default_self_cv() -> TierThresholds {
    TierThresholds { low: 0.3, high: 0.5 }
}

fn default_peer_z() -> TierThresholds {
    TierThresholds { low: -1.0, high: 1.0 }
}

/// Mode-specific thresholds for the tier classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Cut-offs applied to the CV in self-comparison mode.
    #[serde(default = "default_self_cv")]
    pub self_cv: TierThresholds,
    /// Cut-offs applied to the z-score in peer-comparison mode.
    #[serde(default = "default_peer_z")]
    pub peer_z: TierThresholds,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            self_cv: default_self_cv(),
            peer_z: default_peer_z(),
        }
    }
}

impl TierConfig {
    /// Return the default path to the persisted config file.
    /// Uses `~/.campus-monitor/config.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".campus-monitor").join("config.json")
    }

    /// Load thresholds from the default path, falling back to the defaults
    /// when the file is absent or unreadable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load thresholds from an explicit path.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "unreadable tier config; using defaults");
                Self::default()
            }
        }
    }

    /// Atomically write thresholds to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Thresholds for the given comparison mode.
    pub fn for_mode(&self, mode: CompareMode) -> TierThresholds {
        match mode {
            CompareMode::SelfHistory => self.self_cv,
            CompareMode::PeerGroup => self.peer_z,
        }
    }
}

// ── classify ──────────────────────────────────────────────────────────────────

/// Map a possibly-missing metric value to a tier.
///
/// A pure, total function: the missing sentinel (and any non-finite value)
/// yields [`Tier::Unknown`] rather than an error, so callers can feed every
/// scored record through without pre-filtering.
pub fn classify(value: Option<f64>, mode: CompareMode, config: &TierConfig) -> Tier {
    let Some(v) = value else {
        return Tier::Unknown;
    };
    if !v.is_finite() {
        return Tier::Unknown;
    }
    config.for_mode(mode).classify(v)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
