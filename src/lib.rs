//! # merge-eval
//!
//! A library for evaluating paired-end read merging tools against simulated
//! ground truth.
//!
//! Read merging tools (AdapterRemoval, leeHom, fastp, ...) reconstruct a DNA
//! fragment from the two reads sequenced from its ends. When the fragments are
//! simulated, each merged read can be joined back to the fragment it came from
//! and scored.
//!
//! `merge-eval` does this in three steps:
//!
//! - **Parsing**: two-line FASTA templates and four-line FASTQ reads, plain
//!   or gzipped (detected by magic number)
//! - **Reconciliation**: tool-specific header decorations are stripped and
//!   each merged read is joined to its template, or to its two parent reads
//! - **Scoring**: edit distance per read, per-quality calibration with exact
//!   binomial confidence intervals, and per-position parent comparisons
//!
//! ## Example
//!
//! ```rust,no_run
//! use merge_eval::matching::ReconciliationEngine;
//! use merge_eval::parsing::{fasta::read_templates, fastq::read_fastq};
//! use merge_eval::scoring::AccuracySummary;
//! use std::path::Path;
//!
//! let templates = read_templates(Path::new("templates.fa.gz")).unwrap();
//! let reads = read_fastq(Path::new("merged.fq.gz")).unwrap();
//!
//! let mut engine = ReconciliationEngine::new(&templates, b'-');
//! let mut summary = AccuracySummary::new();
//! for pair in engine.reconcile_all(reads).unwrap() {
//!     summary.observe(&pair);
//! }
//! println!("{}", summary.histogram);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Templates, reads and tool metadata
//! - [`parsing`]: FASTA and FASTQ parsers with gzip detection
//! - [`matching`]: Header normalization and the reconciliation engine
//! - [`scoring`]: Edit distance and per-base comparisons
//! - [`calibration`]: Phred conversions and confidence intervals
//! - [`metrics`]: CSV output of result rows
//! - [`cli`]: Command-line interface implementation

pub mod calibration;
pub mod cli;
pub mod core;
pub mod matching;
pub mod metrics;
pub mod parsing;
pub mod scoring;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::record::{ParentReads, Read, Template, TemplateSet};
pub use core::types::*;
pub use matching::engine::{ReconciliationEngine, ReconciliationStats};
