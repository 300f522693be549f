//! Core domain types and calculations for the campus usage monitor.
//!
//! Holds the data model (readings, building metadata, scored records), the
//! error taxonomy, the numeric statistics helpers, the tier thresholds and
//! the CLI settings shared by every other crate in the workspace.

pub mod error;
pub mod models;
pub mod settings;
pub mod stats;
pub mod tiers;
