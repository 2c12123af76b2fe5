//! Header normalization and the reconciliation engine.
//!
//! This module joins the reads written by a merging tool back to the ground
//! truth they came from:
//!
//! - [`header`]: strips tool decorations from read headers and discards
//!   unmerged reads
//! - [`ReconciliationEngine`]: hash join of normalized reads against a
//!   [`TemplateSet`] (accuracy and calibration) or against [`ParentReads`]
//!   (per-base comparison)
//!
//! ## Example
//!
//! ```rust,no_run
//! use merge_eval::core::record::{Read, Template, TemplateSet};
//! use merge_eval::matching::ReconciliationEngine;
//!
//! let templates: TemplateSet = vec![Template::new("t1", "ACGT")].into_iter().collect();
//! let mut engine = ReconciliationEngine::new(&templates, b'-');
//!
//! let pairs = engine
//!     .reconcile_all(vec![Read::new("@M_t1-1", "ACGT", "IIII")])
//!     .unwrap();
//! assert_eq!(pairs.len(), 1);
//! assert_eq!(engine.stats().dropped(), 0);
//! ```
//!
//! [`TemplateSet`]: crate::core::record::TemplateSet
//! [`ParentReads`]: crate::core::record::ParentReads

pub mod engine;
pub mod header;

pub use engine::{ParentTriple, ReconciledPair, ReconciliationEngine, ReconciliationStats};
pub use header::HeaderError;
