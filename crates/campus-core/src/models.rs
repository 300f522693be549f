use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Commodity ─────────────────────────────────────────────────────────────────

/// Utility commodity measured by a campus meter.
///
/// Serialises to the wire codes used by the utility feed (`ELECTRIC`,
/// `NATURALGAS`, …); [`Commodity::label`] carries the human-facing name
/// shown by consumers ("Electrical", "Gas", …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Commodity {
    #[serde(rename = "ELECTRIC")]
    Electric,
    #[serde(rename = "NATURALGAS")]
    NaturalGas,
    #[serde(rename = "HOTWATER")]
    HotWater,
    #[serde(rename = "SOLARPV")]
    SolarPv,
    #[serde(rename = "RECLAIMEDWATER")]
    ReclaimedWater,
    #[serde(rename = "CHILLEDWATER")]
    ChilledWater,
    #[serde(rename = "WATER")]
    Water,
}

impl Commodity {
    /// Every commodity, in display order.
    pub const ALL: [Commodity; 7] = [
        Commodity::Electric,
        Commodity::NaturalGas,
        Commodity::HotWater,
        Commodity::SolarPv,
        Commodity::ReclaimedWater,
        Commodity::ChilledWater,
        Commodity::Water,
    ];

    /// Wire code as it appears in the readings table.
    pub fn code(&self) -> &'static str {
        match self {
            Commodity::Electric => "ELECTRIC",
            Commodity::NaturalGas => "NATURALGAS",
            Commodity::HotWater => "HOTWATER",
            Commodity::SolarPv => "SOLARPV",
            Commodity::ReclaimedWater => "RECLAIMEDWATER",
            Commodity::ChilledWater => "CHILLEDWATER",
            Commodity::Water => "WATER",
        }
    }

    /// Human-facing utility name.
    pub fn label(&self) -> &'static str {
        match self {
            Commodity::Electric => "Electrical",
            Commodity::NaturalGas => "Gas",
            Commodity::HotWater => "Hot Water",
            Commodity::SolarPv => "Solar PV",
            Commodity::ReclaimedWater => "ReClaimed Water",
            Commodity::ChilledWater => "Chilled Water",
            Commodity::Water => "Water",
        }
    }

    /// Strict wire-code parse used by the reading store.
    ///
    /// Trims surrounding whitespace and ignores case; anything that is not
    /// one of the seven known codes yields `None`.
    pub fn from_code(code: &str) -> Option<Commodity> {
        let trimmed = code.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(trimmed))
    }

    /// Lenient parse accepting either the wire code or the display label,
    /// case-insensitively and ignoring internal spaces (`"hotwater"`,
    /// `"Hot Water"` and `"HOTWATER"` all resolve to [`Commodity::HotWater`]).
    pub fn parse(input: &str) -> Option<Commodity> {
        let normalised: String = input
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL.iter().copied().find(|c| {
            c.code().to_ascii_lowercase() == normalised
                || c.label().to_ascii_lowercase().replace(' ', "") == normalised
        })
    }
}

impl std::fmt::Display for Commodity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

// ── Input records ─────────────────────────────────────────────────────────────

/// A single normalised meter reading.
///
/// Immutable once loaded; the full set is read-only input to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Trimmed raw asset-account number linking the reading to building
    /// metadata. Never coerced to a number (leading zeros are significant).
    pub building_key: String,
    /// Which utility the meter measures.
    pub commodity: Commodity,
    /// End date of the metering period.
    pub period_end: NaiveDate,
    /// Usage quantity. May be negative or zero (net-metered solar export).
    pub quantity: f64,
}

/// Static building identity and classification metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingInfo {
    /// Asset-account number; the join key against [`Reading::building_key`].
    pub account_number: String,
    /// Unique building name.
    pub building_name: String,
    /// Functional classification label. May be empty when the campus has
    /// not categorised the building.
    pub classification: String,
}

/// Static geographic reference data, joined by building name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingCoordinate {
    pub building_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

// ── Derived records ───────────────────────────────────────────────────────────

/// A reading joined with building metadata and coordinates.
///
/// The join is left-preserving: a reading with no metadata match keeps
/// `None` fields rather than being dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedReading {
    pub reading: Reading,
    /// Resolved building name; `None` when the account key had no match.
    pub building: Option<String>,
    pub classification: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl EnrichedReading {
    /// Grouping label for aggregation: the resolved building name, or the
    /// raw account key when the reading matched no metadata row.
    pub fn building_label(&self) -> &str {
        self.building
            .as_deref()
            .unwrap_or(&self.reading.building_key)
    }
}

/// Summed usage for one building over one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub building: String,
    /// Month key in `"%Y-%m"` format, e.g. `"2024-01"`.
    pub month: String,
    pub total_use: f64,
}

/// Summed usage for one building over one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualTotal {
    pub building: String,
    pub year: i32,
    pub total_use: f64,
}

/// Per-building variability statistics over the available years.
///
/// Undefined statistics (a single year of data, a zero mean) are `None`,
/// never NaN, so downstream threshold logic cannot silently compare them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceRecord {
    pub building: String,
    /// Sample mean of the annual totals.
    pub mean_annual: f64,
    /// Sample standard deviation (n−1); `None` with fewer than two years.
    pub std_annual: Option<f64>,
    /// Coefficient of variation, `std_annual / mean_annual`; `None` when the
    /// mean is zero or the std is undefined. Sign is preserved for negative
    /// means (net export exceeding consumption).
    pub cv: Option<f64>,
    pub classification: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A [`VarianceRecord`] plus its classification-relative z-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub building: String,
    pub mean_annual: f64,
    pub std_annual: Option<f64>,
    pub cv: Option<f64>,
    /// Standardised deviation of `cv` from the classification peer group.
    /// `None` when the group has fewer than two finite CVs or zero spread.
    pub z_score: Option<f64>,
    pub classification: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ScoredRecord {
    /// Assemble a scored record from its variance stage and z-score.
    pub fn from_variance(variance: VarianceRecord, z_score: Option<f64>) -> Self {
        Self {
            building: variance.building,
            mean_annual: variance.mean_annual,
            std_annual: variance.std_annual,
            cv: variance.cv,
            z_score,
            classification: variance.classification,
            latitude: variance.latitude,
            longitude: variance.longitude,
        }
    }
}

// ── CompareMode / Tier ────────────────────────────────────────────────────────

/// Which metric a building is tiered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareMode {
    /// Tier on the building's own CV.
    #[serde(rename = "self")]
    SelfHistory,
    /// Tier on the z-score against classification peers.
    #[serde(rename = "peer")]
    PeerGroup,
}

impl CompareMode {
    /// Parse the CLI argument form (`"self"` / `"peer"`).
    pub fn from_arg(input: &str) -> Option<CompareMode> {
        match input.trim().to_ascii_lowercase().as_str() {
            "self" => Some(CompareMode::SelfHistory),
            "peer" => Some(CompareMode::PeerGroup),
            _ => None,
        }
    }

    /// The metric this mode tiers on, for one scored record.
    pub fn metric(&self, record: &ScoredRecord) -> Option<f64> {
        match self {
            CompareMode::SelfHistory => record.cv,
            CompareMode::PeerGroup => record.z_score,
        }
    }

    /// Short metric name for table headers.
    pub fn metric_name(&self) -> &'static str {
        match self {
            CompareMode::SelfHistory => "CV",
            CompareMode::PeerGroup => "Z-score",
        }
    }
}

/// Discretised risk level for a building's usage variability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Low,
    Medium,
    High,
    /// The metric was undefined for this building.
    Unknown,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tier::Low => "Low",
            Tier::Medium => "Medium",
            Tier::High => "High",
            Tier::Unknown => "Unknown",
        };
        f.pad(name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
