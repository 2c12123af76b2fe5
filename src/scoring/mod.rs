//! Accuracy scoring of reconstructed reads.
//!
//! - [`edit_distance`]: unit-cost Levenshtein distance
//! - [`accuracy`]: edit-distance histograms over reads joined to templates
//! - [`per_base`]: calls at a fixed position compared across the two parent
//!   reads and the merged read
//!
//! [`edit_distance`]: edit_distance::edit_distance

pub mod accuracy;
pub mod edit_distance;
pub mod per_base;

pub use accuracy::{AccuracySummary, EditDistanceHistogram};
pub use edit_distance::edit_distance;
pub use per_base::{index_parents, AnalysisError, PerBaseComparison, PerBaseConfig};
