//! Quality-score calibration.
//!
//! Every base of a reconciled read is compared with the template base at the
//! same position and tallied by the Phred score the tool reported for it.
//! Per bucket, the observed mismatch rate and its exact binomial confidence
//! interval are converted back to the Phred scale, so that reported and
//! empirical qualities can be plotted against each other.
//!
//! - [`phred`]: Phred score and error probability conversions
//! - [`binomial`]: Clopper–Pearson interval
//! - [`buckets`]: per-quality tallies and calibration rows
//! - [`occurrence`]: how often each quality value is reported

pub mod binomial;
pub mod buckets;
pub mod occurrence;
pub mod phred;

use thiserror::Error;

pub use binomial::clopper_pearson;
pub use buckets::{CalibrationConfig, CalibrationRow, QualityBuckets};
pub use occurrence::QualityOccurrence;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("Significance level must lie strictly between 0 and 1, got {0}")]
    InvalidAlpha(f64),

    #[error("Event count {k} exceeds trial count {n}")]
    CountsOutOfRange { n: u64, k: u64 },
}
