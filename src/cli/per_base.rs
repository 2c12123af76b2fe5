//! Per-base command - how a tool resolves the parent calls at one position.
//!
//! The simulated fragments are as long as the merged reads should be, so the
//! forward read and the reverse-complemented reverse read cover the same
//! positions. At the inspected position the two parent calls either agree or
//! disagree; the merged call and quality show how the tool combined them.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::cli::{base_name, report_reconciliation, OutputFormat};
use crate::core::types::{MergingTool, PHRED_OFFSET};
use crate::matching::engine::ReconciliationEngine;
use crate::metrics::writer::{write_csv, write_csv_to};
use crate::parsing::fastq::{read_fastq, FastqReader};
use crate::scoring::per_base::{
    index_parents, PerBaseComparison, PerBaseConfig, DEFAULT_FRAGMENT_LENGTH, DEFAULT_POSITION,
};
use crate::utils::validation::{parse_separator, validate_fragment_geometry};

/// Arguments for the per-base command
#[derive(Args)]
pub struct PerBaseArgs {
    /// Forward reads given to the tool (FASTQ, optionally gzipped)
    #[arg(required = true)]
    pub forward: PathBuf,

    /// Reverse reads given to the tool (FASTQ, optionally gzipped)
    #[arg(required = true)]
    pub reverse: PathBuf,

    /// Merged reads written by the tool (FASTQ, optionally gzipped)
    #[arg(required = true)]
    pub merged: PathBuf,

    /// Name of the merging tool, written into the program column
    #[arg(short, long)]
    pub tool: String,

    /// Simulated fragment length; parents are truncated to it
    #[arg(long, default_value_t = DEFAULT_FRAGMENT_LENGTH)]
    pub fragment_length: usize,

    /// Zero-based position inspected in every read
    #[arg(long, default_value_t = DEFAULT_POSITION)]
    pub position: usize,

    /// Header separator; it and everything after it are removed
    #[arg(long, default_value = "/", value_parser = parse_separator)]
    pub separator: u8,

    /// Write the per-read calls as CSV to this file
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Totals printed after the comparison
#[derive(Debug, Serialize)]
struct PerBaseSummary {
    filename: String,
    total_sequences: usize,
    total_merged: usize,
    matching: usize,
    mismatching: usize,
    incorrect_length: usize,
    unpaired: usize,
}

/// Execute the per-base command
///
/// # Errors
///
/// Returns an error if an input cannot be read, a header has no recognized
/// prefix, the output cannot be written, or any merged read has an
/// unexpected length. In the last case the results are still written first.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: PerBaseArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    validate_fragment_geometry(args.fragment_length, args.position)?;
    let tool = MergingTool::parse(&args.tool);
    let config = PerBaseConfig {
        fragment_length: args.fragment_length,
        position: args.position,
        separator: args.separator,
        phred_offset: PHRED_OFFSET,
    };

    let forward = read_fastq(&args.forward)
        .with_context(|| format!("Failed to read forward reads: {}", args.forward.display()))?;
    let reverse = read_fastq(&args.reverse)
        .with_context(|| format!("Failed to read reverse reads: {}", args.reverse.display()))?;
    let parents = index_parents(forward, reverse, &config)
        .context("Failed to index parent reads")?;

    let reader = FastqReader::from_path(&args.merged)
        .with_context(|| format!("Failed to open merged reads: {}", args.merged.display()))?;
    let mut engine = ReconciliationEngine::new(&parents, config.separator);
    let mut comparison = PerBaseComparison::new();
    for read in reader {
        let read = read
            .with_context(|| format!("Failed to read merged reads: {}", args.merged.display()))?;
        let triple = engine
            .reconcile(read)
            .with_context(|| format!("Failed to reconcile reads in {}", args.merged.display()))?;
        if let Some(triple) = triple {
            comparison.observe(&triple, &config);
        }
    }
    let stats = engine.into_stats();
    report_reconciliation(&tool, &stats);

    let summary = PerBaseSummary {
        filename: base_name(&args.merged),
        total_sequences: parents.len(),
        total_merged: comparison.merged,
        matching: comparison.matching.len(),
        mismatching: comparison.mismatching.len(),
        incorrect_length: comparison.length_anomalies,
        unpaired: stats.unpaired,
    };
    let rows = comparison.rows(&tool.to_string());

    if let Some(out) = &args.out {
        write_csv(out, &rows, "per-base")?;
    }

    match format {
        OutputFormat::Text => {
            println!("\n{}:", summary.filename);
            println!("   total seqs: {}", summary.total_sequences);
            println!("   total merged: {}", summary.total_merged);
            println!("   matching count: {}", summary.matching);
            println!("   mismatching count: {}", summary.mismatching);
            println!("   incorrect length count: {}", summary.incorrect_length);
            if verbose {
                println!("   unpaired: {}", summary.unpaired);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "summary": summary,
                "reconciliation": stats,
                "rows": rows,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Csv => write_csv_to(io::stdout(), &rows)?,
    }

    comparison.into_checked()?;
    Ok(())
}
