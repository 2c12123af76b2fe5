//! Position-resolved comparison of a merged read with its two parent reads.
//!
//! For a fixed position inside the fragment, the calls and qualities of the
//! forward parent, the reverse parent (reverse complemented) and the merged
//! read are collected. Positions where the parents agree show how a tool
//! combines concordant qualities; positions where they disagree show how it
//! resolves conflicts.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::core::record::{ParentRead, ParentReads, Read};
use crate::core::types::{decode_phred, ParentAgreement, PHRED_OFFSET};
use crate::matching::engine::ParentTriple;
use crate::matching::header::{normalize_header, HeaderError};

/// Fragment length used by the per-base simulations
pub const DEFAULT_FRAGMENT_LENGTH: usize = 31;

/// Position inspected in every fragment (the middle of a 31 nt fragment)
pub const DEFAULT_POSITION: usize = 15;

/// Separator between read id and mate suffix in the parent headers (`@id/1`)
pub const DEFAULT_PARENT_SEPARATOR: u8 = b'/';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error(
        "{anomalies} merged reads deviate from the expected fragment length \
         ({merged} merged, {matching} matching, {mismatching} mismatching)"
    )]
    LengthAnomaly {
        anomalies: usize,
        merged: usize,
        matching: usize,
        mismatching: usize,
    },
}

/// Configuration for the per-base comparison
#[derive(Debug, Clone)]
pub struct PerBaseConfig {
    /// Expected length of every merged read
    pub fragment_length: usize,
    /// Zero-based position compared in each read
    pub position: usize,
    /// Header separator for parent and merged reads
    pub separator: u8,
    /// Quality encoding offset
    pub phred_offset: u8,
}

impl Default for PerBaseConfig {
    fn default() -> Self {
        Self {
            fragment_length: DEFAULT_FRAGMENT_LENGTH,
            position: DEFAULT_POSITION,
            separator: DEFAULT_PARENT_SEPARATOR,
            phred_offset: PHRED_OFFSET,
        }
    }
}

/// Index the sequencer reads by canonical id.
///
/// Forward reads are kept as they are, reverse reads are reverse complemented
/// with their qualities reversed; both are truncated to the fragment length.
/// A later read with the same id replaces an earlier one.
///
/// # Errors
///
/// Returns `HeaderError` if a parent header has no recognized prefix.
pub fn index_parents(
    forward: impl IntoIterator<Item = Read>,
    reverse: impl IntoIterator<Item = Read>,
    config: &PerBaseConfig,
) -> Result<ParentReads, HeaderError> {
    let mut parents = ParentReads::default();
    for read in forward {
        let id = normalize_header(&read.name, config.separator)?;
        parents
            .forward
            .insert(id, ParentRead::forward(&read, config.fragment_length));
    }
    for read in reverse {
        let id = normalize_header(&read.name, config.separator)?;
        parents
            .reverse
            .insert(id, ParentRead::reverse(&read, config.fragment_length));
    }
    Ok(parents)
}

/// Calls and qualities at the inspected position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionCall {
    pub name: String,
    pub agreement: ParentAgreement,
    pub forward_base: u8,
    pub reverse_base: u8,
    pub merged_base: u8,
    pub forward_quality: u8,
    pub reverse_quality: u8,
    pub merged_quality: u8,
}

/// One CSV row of the per-base comparison
#[derive(Debug, Clone, Serialize)]
pub struct PerBaseRow {
    pub name: String,
    pub program: String,
    #[serde(rename = "type")]
    pub kind: ParentAgreement,
    pub nt1: char,
    pub nt2: char,
    pub new_nt: char,
    pub qs1: u8,
    pub qs2: u8,
    pub new_qs: u8,
}

/// Accumulated per-base comparison over all reconciled triples
#[derive(Debug, Clone, Default)]
pub struct PerBaseComparison {
    pub matching: Vec<PositionCall>,
    pub mismatching: Vec<PositionCall>,
    /// Merged reads (or their parents) too short or too long for the fragment
    pub length_anomalies: usize,
    /// Triples observed
    pub merged: usize,
}

impl PerBaseComparison {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare one merged read with its parents at the configured position
    pub fn observe(&mut self, triple: &ParentTriple<'_>, config: &PerBaseConfig) {
        self.merged += 1;

        if triple.merged.sequence.len() != config.fragment_length {
            self.length_anomalies += 1;
            return;
        }

        let pos = config.position;
        let calls = (
            triple.forward.sequence.get(pos),
            triple.reverse.sequence.get(pos),
            triple.merged.sequence.get(pos),
            triple.forward.quality.get(pos),
            triple.reverse.quality.get(pos),
            triple.merged.quality.get(pos),
        );
        let (Some(&nt1), Some(&nt2), Some(&new_nt), Some(&q1), Some(&q2), Some(&new_q)) = calls
        else {
            self.length_anomalies += 1;
            return;
        };

        let agreement = if nt1 == nt2 {
            ParentAgreement::Match
        } else {
            ParentAgreement::Mismatch
        };

        let call = PositionCall {
            name: triple.merged.display_name(),
            agreement,
            forward_base: nt1,
            reverse_base: nt2,
            merged_base: new_nt,
            forward_quality: decode_phred(q1, config.phred_offset),
            reverse_quality: decode_phred(q2, config.phred_offset),
            merged_quality: decode_phred(new_q, config.phred_offset),
        };

        match agreement {
            ParentAgreement::Match => self.matching.push(call),
            ParentAgreement::Mismatch => self.mismatching.push(call),
        }
    }

    /// Fail if any length anomaly was seen; anomalies point at a tool defect
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::LengthAnomaly` carrying all counts.
    pub fn into_checked(self) -> Result<Self, AnalysisError> {
        if self.length_anomalies == 0 {
            return Ok(self);
        }
        warn!(
            "{} of {} merged reads have an unexpected length",
            self.length_anomalies, self.merged
        );
        Err(AnalysisError::LengthAnomaly {
            anomalies: self.length_anomalies,
            merged: self.merged,
            matching: self.matching.len(),
            mismatching: self.mismatching.len(),
        })
    }

    /// CSV rows: all matching positions first, then all mismatching ones
    #[must_use]
    pub fn rows(&self, program: &str) -> Vec<PerBaseRow> {
        self.matching
            .iter()
            .chain(&self.mismatching)
            .map(|call| PerBaseRow {
                name: call.name.clone(),
                program: program.to_string(),
                kind: call.agreement,
                nt1: char::from(call.forward_base),
                nt2: char::from(call.reverse_base),
                new_nt: char::from(call.merged_base),
                qs1: call.forward_quality,
                qs2: call.reverse_quality,
                new_qs: call.merged_quality,
            })
            .collect()
    }
}
