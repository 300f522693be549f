//! Runtime layer for the campus usage monitor.
//!
//! Owns the cross-invocation state the pipeline itself must not have: the
//! fingerprint-keyed score cache and the engine that serves queries over an
//! immutable dataset.

pub mod cache;
pub mod engine;

pub use campus_core as core;
pub use campus_data as data;
