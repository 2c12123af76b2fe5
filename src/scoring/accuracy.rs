//! Reconstruction accuracy of merged reads against their templates.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::matching::engine::ReconciledPair;
use crate::metrics::serialize_optional_na;
use crate::scoring::edit_distance::edit_distance;
use crate::utils::count_to_f64;

/// Frequency of each edit distance, ordered by ascending distance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDistanceHistogram {
    counts: BTreeMap<usize, u64>,
}

impl EditDistanceHistogram {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, distance: usize) {
        *self.counts.entry(distance).or_insert(0) += 1;
    }

    /// Number of recorded observations
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Sum of all recorded distances
    #[must_use]
    pub fn distance_sum(&self) -> u64 {
        self.counts
            .iter()
            .map(|(&distance, &count)| distance as u64 * count)
            .sum()
    }

    #[must_use]
    pub fn count(&self, distance: usize) -> u64 {
        self.counts.get(&distance).copied().unwrap_or(0)
    }

    /// `(distance, count)` pairs in ascending distance order
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.counts.iter().map(|(&d, &c)| (d, c))
    }
}

/// Space-separated `distance:count` tokens, e.g. `0:98 1:2`
impl fmt::Display for EditDistanceHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (distance, count)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{distance}:{count}")?;
        }
        Ok(())
    }
}

/// Accumulates edit distances over reconciled pairs
#[derive(Debug, Clone, Default)]
pub struct AccuracySummary {
    pub histogram: EditDistanceHistogram,
}

impl AccuracySummary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Score one pair and return its edit distance
    pub fn observe(&mut self, pair: &ReconciledPair<'_>) -> usize {
        let distance = edit_distance(&pair.template.sequence, &pair.read.sequence);
        self.histogram.record(distance);
        distance
    }

    /// Number of scored reads
    #[must_use]
    pub fn reads(&self) -> u64 {
        self.histogram.total()
    }

    /// Mean edit distance per nucleotide, in percent, rounded to three decimals.
    ///
    /// `None` when no read was scored or the fragment length is zero.
    #[must_use]
    pub fn avg_divergence_per_nt(&self, fragment_length: usize) -> Option<f64> {
        let reads = self.reads();
        if reads == 0 || fragment_length == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.histogram.distance_sum() as f64 / reads as f64;
        let percent = mean / count_to_f64(fragment_length) * 100.0;
        Some(round_to_thousandths(percent))
    }
}

/// Round to three decimals, ties to even
fn round_to_thousandths(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}

/// Accuracy result for a fixed fragment length run
#[derive(Debug, Clone, Serialize)]
pub struct AccuracyRow {
    pub program: String,
    pub filename: String,
    pub nfrags: u64,
    pub fraglen: usize,
    pub total_sequences: usize,
    pub total_reads: u64,
    pub dropped_reads: i64,
    #[serde(serialize_with = "serialize_optional_na")]
    pub avg_divergence_per_nt: Option<f64>,
    pub edit_distances: String,
}

/// Accuracy result for a run simulated from a fragment length distribution
#[derive(Debug, Clone, Serialize)]
pub struct AccuracyDistributionRow {
    pub program: String,
    pub filename: String,
    pub nfrags: u64,
    pub fraglen_distribution: String,
    pub quality_shift: i32,
    pub total_sequences: usize,
    pub total_reads: u64,
    pub dropped_reads: i64,
    pub edit_distances: String,
}

/// Reads the tool lost, relative to the number of simulated fragments.
///
/// Negative when duplicated templates let more reads through than fragments
/// were simulated.
#[must_use]
pub fn dropped_reads(nfrags: u64, total_reads: u64) -> i64 {
    i64::try_from(nfrags).unwrap_or(i64::MAX) - i64::try_from(total_reads).unwrap_or(i64::MAX)
}
