use std::collections::BTreeMap;

use serde::Serialize;

use crate::calibration::binomial::clopper_pearson;
use crate::calibration::phred::{
    error_probability_to_phred, phred_to_error_probability, DEFAULT_MAX_PHRED,
};
use crate::calibration::CalibrationError;
use crate::core::types::{decode_phred, PHRED_OFFSET};
use crate::matching::engine::ReconciledPair;
use crate::metrics::serialize_f64_na;

/// Default significance level for the confidence intervals
pub const DEFAULT_ALPHA: f64 = 0.01;

/// Configuration for quality-score calibration
#[derive(Debug, Clone)]
pub struct CalibrationConfig {
    /// Two-sided significance level of the Clopper–Pearson interval
    pub alpha: f64,
    /// Phred value reported when no mismatch was observed
    pub max_phred: f64,
    /// Quality encoding offset
    pub phred_offset: u8,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            max_phred: DEFAULT_MAX_PHRED,
            phred_offset: PHRED_OFFSET,
        }
    }
}

/// Match and mismatch tallies for one reported quality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketCounts {
    pub matches: u64,
    pub mismatches: u64,
}

impl BucketCounts {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.matches + self.mismatches
    }
}

/// Per-quality tallies of correct and incorrect bases.
///
/// Buckets are created on first observation; iteration is in ascending
/// Phred order.
#[derive(Debug, Clone, Default)]
pub struct QualityBuckets {
    buckets: BTreeMap<u8, BucketCounts>,
    phred_offset: u8,
    skipped_pairs: u64,
}

impl QualityBuckets {
    #[must_use]
    pub fn new(phred_offset: u8) -> Self {
        Self {
            buckets: BTreeMap::new(),
            phred_offset,
            skipped_pairs: 0,
        }
    }

    /// Tally one base observed at `phred`
    pub fn record(&mut self, phred: u8, is_match: bool) {
        let bucket = self.buckets.entry(phred).or_default();
        if is_match {
            bucket.matches += 1;
        } else {
            bucket.mismatches += 1;
        }
    }

    /// Tally every base of a read against the template it reconstructs.
    ///
    /// Pairs whose sequences differ in length, or reads whose quality string
    /// is not as long as the sequence, cannot be compared position by
    /// position; they are skipped entirely and `false` is returned.
    pub fn observe(&mut self, template: &[u8], sequence: &[u8], quality: &[u8]) -> bool {
        if template.len() != sequence.len() || quality.len() != sequence.len() {
            self.skipped_pairs += 1;
            return false;
        }
        for ((&expected, &called), &qual) in template.iter().zip(sequence).zip(quality) {
            self.record(decode_phred(qual, self.phred_offset), expected == called);
        }
        true
    }

    /// Tally a reconciled pair
    pub fn observe_pair(&mut self, pair: &ReconciledPair<'_>) -> bool {
        self.observe(&pair.template.sequence, &pair.read.sequence, &pair.read.quality)
    }

    #[must_use]
    pub fn get(&self, phred: u8) -> Option<&BucketCounts> {
        self.buckets.get(&phred)
    }

    /// Pairs excluded because of a length mismatch
    #[must_use]
    pub fn skipped_pairs(&self) -> u64 {
        self.skipped_pairs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, BucketCounts)> + '_ {
        self.buckets.iter().map(|(&q, &c)| (q, c))
    }

    /// Compute one calibration row per bucket, in ascending Phred order.
    ///
    /// # Errors
    ///
    /// Returns `CalibrationError::InvalidAlpha` for an alpha outside `(0, 1)`.
    pub fn finalize(
        &self,
        config: &CalibrationConfig,
    ) -> Result<Vec<CalibrationRow>, CalibrationError> {
        self.iter()
            .map(|(phred, counts)| CalibrationRow::from_counts(phred, counts, config))
            .collect()
    }
}

/// Predicted versus observed error for one reported quality
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationRow {
    pub predicted_phred: u8,
    pub predicted_error: f64,
    pub n_matches: u64,
    pub n_mismatches: u64,
    pub n_total: u64,
    #[serde(serialize_with = "serialize_f64_na")]
    pub p_mismatch: f64,
    pub p_mismatch_lower: f64,
    pub p_mismatch_upper: f64,
    #[serde(serialize_with = "serialize_f64_na")]
    pub observed_phred: f64,
    pub observed_phred_lower: f64,
    pub observed_phred_upper: f64,
}

impl CalibrationRow {
    /// Derive the calibration statistics for one bucket.
    ///
    /// An empty bucket has a not-a-number observed error.
    ///
    /// # Errors
    ///
    /// Returns `CalibrationError::InvalidAlpha` for an alpha outside `(0, 1)`.
    pub fn from_counts(
        phred: u8,
        counts: BucketCounts,
        config: &CalibrationConfig,
    ) -> Result<Self, CalibrationError> {
        let n_total = counts.total();
        #[allow(clippy::cast_precision_loss)]
        let p_mismatch = if n_total == 0 {
            f64::NAN
        } else {
            counts.mismatches as f64 / n_total as f64
        };
        let (p_lower, p_upper) = clopper_pearson(n_total, counts.mismatches, config.alpha)?;

        Ok(Self {
            predicted_phred: phred,
            predicted_error: phred_to_error_probability(phred),
            n_matches: counts.matches,
            n_mismatches: counts.mismatches,
            n_total,
            p_mismatch,
            p_mismatch_lower: p_lower,
            p_mismatch_upper: p_upper,
            observed_phred: error_probability_to_phred(p_mismatch, config.max_phred),
            // The transform is decreasing, so the bounds swap
            observed_phred_lower: error_probability_to_phred(p_upper, config.max_phred),
            observed_phred_upper: error_probability_to_phred(p_lower, config.max_phred),
        })
    }
}
