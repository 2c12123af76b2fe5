//! Accuracy command - edit distances of merged reads against their templates.
//!
//! Simulations run either at a fixed fragment length (`--fraglen`), which
//! also reports the mean divergence per nucleotide, or from a named fragment
//! length distribution (`--fraglen-distribution`).

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Args};
use serde::Serialize;
use tracing::warn;

use crate::cli::{base_name, report_reconciliation, OutputFormat};
use crate::core::types::MergingTool;
use crate::matching::engine::{ReconciliationEngine, ReconciliationStats};
use crate::metrics::writer::{write_csv, write_csv_to};
use crate::parsing::fasta::read_templates;
use crate::parsing::fastq::FastqReader;
use crate::scoring::accuracy::{
    dropped_reads, AccuracyDistributionRow, AccuracyRow, AccuracySummary,
};
use crate::utils::validation::parse_separator;

/// Arguments for the accuracy command
#[derive(Args)]
#[command(group(
    ArgGroup::new("length")
        .required(true)
        .args(["fraglen", "fraglen_distribution"])
))]
pub struct AccuracyArgs {
    /// Simulated fragments (two-line FASTA, optionally gzipped)
    #[arg(required = true)]
    pub templates: PathBuf,

    /// Merged reads written by the tool (FASTQ, optionally gzipped)
    #[arg(required = true)]
    pub merged: PathBuf,

    /// Name of the merging tool, written into the program column
    #[arg(short, long)]
    pub tool: String,

    /// Number of fragments that were simulated
    #[arg(long)]
    pub nfrags: u64,

    /// Fixed fragment length of the simulation
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub fraglen: Option<u64>,

    /// Name of the fragment length distribution of the simulation
    #[arg(long)]
    pub fraglen_distribution: Option<String>,

    /// Quality shift applied by the simulator
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub quality_shift: i32,

    /// Header separator; it and everything after it are removed
    #[arg(long, default_value = "-", value_parser = parse_separator)]
    pub separator: u8,

    /// Write the result row as CSV to this file
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// One accuracy result, shaped by how the fragments were simulated
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum AccuracyReport {
    FixedLength(AccuracyRow),
    Distribution(AccuracyDistributionRow),
}

/// Execute the accuracy command
///
/// # Errors
///
/// Returns an error if an input cannot be read, a merged read header has no
/// recognized prefix, or the result cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: AccuracyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let tool = MergingTool::parse(&args.tool);

    let templates = read_templates(&args.templates)
        .with_context(|| format!("Failed to read templates: {}", args.templates.display()))?;
    if u64::try_from(templates.len()).ok() != Some(args.nfrags) {
        warn!(
            "{} templates loaded but {} fragments were simulated; possible duplicate fragments",
            templates.len(),
            args.nfrags
        );
    }

    let reader = FastqReader::from_path(&args.merged)
        .with_context(|| format!("Failed to open merged reads: {}", args.merged.display()))?;
    let mut engine = ReconciliationEngine::new(&templates, args.separator);
    let mut summary = AccuracySummary::new();
    for read in reader {
        let read = read
            .with_context(|| format!("Failed to read merged reads: {}", args.merged.display()))?;
        let pair = engine
            .reconcile(read)
            .with_context(|| format!("Failed to reconcile reads in {}", args.merged.display()))?;
        if let Some(pair) = pair {
            summary.observe(&pair);
        }
    }
    let stats = engine.into_stats();
    report_reconciliation(&tool, &stats);

    let total_reads = summary.reads();
    let report = if let Some(distribution) = args.fraglen_distribution.clone() {
        AccuracyReport::Distribution(AccuracyDistributionRow {
            program: tool.to_string(),
            filename: base_name(&args.merged),
            nfrags: args.nfrags,
            fraglen_distribution: distribution,
            quality_shift: args.quality_shift,
            total_sequences: templates.len(),
            total_reads,
            dropped_reads: dropped_reads(args.nfrags, total_reads),
            edit_distances: summary.histogram.to_string(),
        })
    } else {
        let fraglen = usize::try_from(args.fraglen.unwrap_or_default())
            .context("Fragment length does not fit in memory on this platform")?;
        AccuracyReport::FixedLength(AccuracyRow {
            program: tool.to_string(),
            filename: base_name(&args.merged),
            nfrags: args.nfrags,
            fraglen,
            total_sequences: templates.len(),
            total_reads,
            dropped_reads: dropped_reads(args.nfrags, total_reads),
            avg_divergence_per_nt: summary.avg_divergence_per_nt(fraglen),
            edit_distances: summary.histogram.to_string(),
        })
    };

    if let Some(out) = &args.out {
        match &report {
            AccuracyReport::FixedLength(row) => {
                write_csv(out, std::slice::from_ref(row), "accuracy")?;
            }
            AccuracyReport::Distribution(row) => {
                write_csv(out, std::slice::from_ref(row), "accuracy")?;
            }
        }
    }

    match format {
        OutputFormat::Text => print_text_report(&report, &stats, verbose),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "result": report,
                "reconciliation": stats,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Csv => match &report {
            AccuracyReport::FixedLength(row) => {
                write_csv_to(io::stdout(), std::slice::from_ref(row))?;
            }
            AccuracyReport::Distribution(row) => {
                write_csv_to(io::stdout(), std::slice::from_ref(row))?;
            }
        },
    }

    Ok(())
}

fn print_text_report(report: &AccuracyReport, stats: &ReconciliationStats, verbose: bool) {
    let (program, filename, nfrags, total_sequences, total_reads, dropped, edit_distances) =
        match report {
            AccuracyReport::FixedLength(row) => (
                &row.program,
                &row.filename,
                row.nfrags,
                row.total_sequences,
                row.total_reads,
                row.dropped_reads,
                &row.edit_distances,
            ),
            AccuracyReport::Distribution(row) => (
                &row.program,
                &row.filename,
                row.nfrags,
                row.total_sequences,
                row.total_reads,
                row.dropped_reads,
                &row.edit_distances,
            ),
        };

    println!("\nAccuracy of {program}: {filename}");
    match report {
        AccuracyReport::FixedLength(row) => println!("   Fragment length: {}", row.fraglen),
        AccuracyReport::Distribution(row) => println!(
            "   Fragment lengths: {} (quality shift {})",
            row.fraglen_distribution, row.quality_shift
        ),
    }
    println!("   Fragments: {nfrags} simulated, {total_sequences} templates");
    println!("   Reads: {total_reads} scored, {dropped} dropped");
    if let AccuracyReport::FixedLength(row) = report {
        match row.avg_divergence_per_nt {
            Some(divergence) => println!("   Divergence: {divergence}% per nucleotide"),
            None => println!("   Divergence: NA"),
        }
    }
    if edit_distances.is_empty() {
        println!("   Edit distances: none");
    } else {
        println!("   Edit distances: {edit_distances}");
    }

    if verbose {
        println!(
            "\n   Candidates: {} total → {} reconciled, {} unmerged, {} unassigned",
            stats.candidates, stats.reconciled, stats.unmerged, stats.unassigned
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::matching::engine::DEFAULT_TEMPLATE_SEPARATOR;
    use clap::Parser;

    fn parse(args: &[&str]) -> Result<AccuracyArgs, clap::Error> {
        let mut argv = vec!["merge-eval", "accuracy"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).map(|cli| match cli.command {
            Commands::Accuracy(args) => args,
            _ => unreachable!(),
        })
    }

    #[test]
    fn test_requires_a_length_mode() {
        assert!(parse(&["t.fa", "m.fq", "--tool", "fastp", "--nfrags", "10"]).is_err());
    }

    #[test]
    fn test_length_modes_are_exclusive() {
        let result = parse(&[
            "t.fa",
            "m.fq",
            "--tool",
            "fastp",
            "--nfrags",
            "10",
            "--fraglen",
            "100",
            "--fraglen-distribution",
            "uniform",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_distribution_mode_accepts_negative_shift() {
        let args = parse(&[
            "t.fa",
            "m.fq",
            "--tool",
            "leeHom",
            "--nfrags",
            "10",
            "--fraglen-distribution",
            "lognormal",
            "--quality-shift",
            "-10",
        ])
        .unwrap();
        assert_eq!(args.quality_shift, -10);
        assert_eq!(args.separator, DEFAULT_TEMPLATE_SEPARATOR);
    }
}
