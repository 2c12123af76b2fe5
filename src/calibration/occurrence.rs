use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::record::Read;
use crate::core::types::decode_phred;

/// Highest quality of the Illumina 1.8 range; 0 through this value are
/// always reported, even when never observed
pub const REPORTED_QUALITY_CEILING: u8 = 41;

/// How often each quality value is reported in a set of reads
#[derive(Debug, Clone)]
pub struct QualityOccurrence {
    counts: BTreeMap<u8, u64>,
    phred_offset: u8,
}

impl QualityOccurrence {
    #[must_use]
    pub fn new(phred_offset: u8) -> Self {
        let counts = (0..=REPORTED_QUALITY_CEILING).map(|q| (q, 0)).collect();
        Self {
            counts,
            phred_offset,
        }
    }

    /// Count every quality character of a read
    pub fn observe(&mut self, read: &Read) {
        for &qual in &read.quality {
            *self
                .counts
                .entry(decode_phred(qual, self.phred_offset))
                .or_insert(0) += 1;
        }
    }

    #[must_use]
    pub fn count(&self, phred: u8) -> u64 {
        self.counts.get(&phred).copied().unwrap_or(0)
    }

    /// Total quality characters seen
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(&q, &c)| (q, c))
    }

    /// One row per quality value, labelled with the simulation parameters
    #[must_use]
    pub fn rows(&self, quality_shift: i32, read_label: &str) -> Vec<QualityOccurrenceRow> {
        self.iter()
            .map(|(quality_score, count)| QualityOccurrenceRow {
                quality_shift,
                read: read_label.to_string(),
                quality_score,
                count,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityOccurrenceRow {
    pub quality_shift: i32,
    pub read: String,
    pub quality_score: u8,
    pub count: u64,
}
