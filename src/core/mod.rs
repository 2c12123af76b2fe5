//! Core data types for merged-read evaluation.
//!
//! - [`Template`]: a ground-truth simulated fragment from a FASTA file
//! - [`Read`]: a four-line FASTQ record as written by a merging tool
//! - [`TemplateSet`]: templates keyed by identifier, the join side for accuracy
//!   and calibration
//! - [`ParentReads`]: forward and reverse input reads keyed by identifier, the
//!   join side for per-base comparisons
//! - [`MergingTool`], [`PrefixConvention`]: tool metadata
//!
//! ## Header decorations
//!
//! Merging tools keep the template identifier in the read header but decorate it:
//!
//! | Tool | Merged read header |
//! |------|--------------------|
//! | AdapterRemoval, ClipAndMerge | `@M_<id>...` |
//! | leeHom, seqtk/adna, bbmerge, fastp, SeqPrep | `@<id>...` |
//!
//! Unmerged reads are written with `@F_` or `@R_` and never reconciled.
//!
//! [`Template`]: record::Template
//! [`Read`]: record::Read
//! [`TemplateSet`]: record::TemplateSet
//! [`ParentReads`]: record::ParentReads
//! [`MergingTool`]: types::MergingTool
//! [`PrefixConvention`]: types::PrefixConvention

pub mod record;
pub mod types;
