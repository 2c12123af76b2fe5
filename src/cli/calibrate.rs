//! Calibrate command - reported base qualities versus observed error rates.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use crate::calibration::buckets::{CalibrationConfig, CalibrationRow, QualityBuckets};
use crate::calibration::phred::DEFAULT_MAX_PHRED;
use crate::cli::{report_reconciliation, OutputFormat};
use crate::core::types::{MergingTool, PHRED_OFFSET};
use crate::matching::engine::ReconciliationEngine;
use crate::metrics::serialize_f64_na;
use crate::metrics::writer::{write_csv, write_csv_to};
use crate::parsing::fasta::read_templates;
use crate::parsing::fastq::FastqReader;
use crate::utils::validation::{parse_alpha, parse_separator};

/// Arguments for the calibrate command
#[derive(Args)]
pub struct CalibrateArgs {
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

    /// Fragment length of the simulation
    #[arg(long)]
    pub fraglen: u64,

    /// Quality shift applied by the simulator
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub quality_shift: i32,

    /// Significance level of the confidence intervals
    #[arg(long, default_value = "0.01", value_parser = parse_alpha)]
    pub alpha: f64,

    /// Phred value reported for buckets without a mismatch
    #[arg(long, default_value_t = DEFAULT_MAX_PHRED)]
    pub max_phred: f64,

    /// Header separator; it and everything after it are removed
    #[arg(long, default_value = "-", value_parser = parse_separator)]
    pub separator: u8,

    /// Write the calibration table as CSV to this file
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// A calibration row labelled with the parameters of the run
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationRecord {
    pub program: String,
    pub nfrags: u64,
    pub fraglen: u64,
    pub qual_shift: i32,
    pub alpha: f64,
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

impl CalibrationRecord {
    fn new(row: CalibrationRow, args: &CalibrateArgs, program: &str) -> Self {
        Self {
            program: program.to_string(),
            nfrags: args.nfrags,
            fraglen: args.fraglen,
            qual_shift: args.quality_shift,
            alpha: args.alpha,
            predicted_phred: row.predicted_phred,
            predicted_error: row.predicted_error,
            n_matches: row.n_matches,
            n_mismatches: row.n_mismatches,
            n_total: row.n_total,
            p_mismatch: row.p_mismatch,
            p_mismatch_lower: row.p_mismatch_lower,
            p_mismatch_upper: row.p_mismatch_upper,
            observed_phred: row.observed_phred,
            observed_phred_lower: row.observed_phred_lower,
            observed_phred_upper: row.observed_phred_upper,
        }
    }
}

/// Execute the calibrate command
///
/// # Errors
///
/// Returns an error if an input cannot be read, a merged read header has no
/// recognized prefix, or the table cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: CalibrateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let tool = MergingTool::parse(&args.tool);
    let config = CalibrationConfig {
        alpha: args.alpha,
        max_phred: args.max_phred,
        phred_offset: PHRED_OFFSET,
    };

    let templates = read_templates(&args.templates)
        .with_context(|| format!("Failed to read templates: {}", args.templates.display()))?;
    let reader = FastqReader::from_path(&args.merged)
        .with_context(|| format!("Failed to open merged reads: {}", args.merged.display()))?;

    let mut engine = ReconciliationEngine::new(&templates, args.separator);
    let mut buckets = QualityBuckets::new(config.phred_offset);
    for read in reader {
        let read = read
            .with_context(|| format!("Failed to read merged reads: {}", args.merged.display()))?;
        let pair = engine
            .reconcile(read)
            .with_context(|| format!("Failed to reconcile reads in {}", args.merged.display()))?;
        if let Some(pair) = pair {
            buckets.observe_pair(&pair);
        }
    }
    let stats = engine.into_stats();
    report_reconciliation(&tool, &stats);
    if buckets.skipped_pairs() > 0 {
        warn!(
            "{} of {} reconciled reads do not line up with their template and were not tallied",
            buckets.skipped_pairs(),
            stats.reconciled
        );
    }

    let program = tool.to_string();
    let records: Vec<CalibrationRecord> = buckets
        .finalize(&config)?
        .into_iter()
        .map(|row| CalibrationRecord::new(row, &args, &program))
        .collect();
    info!("Calibrated {} quality values", records.len());

    if let Some(out) = &args.out {
        write_csv(out, &records, "calibration")?;
    }

    match format {
        OutputFormat::Text => {
            print_text_table(&program, &records, buckets.skipped_pairs(), verbose);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "program": program,
                "alpha": args.alpha,
                "reconciliation": stats,
                "skipped_length_mismatch": buckets.skipped_pairs(),
                "rows": records,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Csv => write_csv_to(io::stdout(), &records)?,
    }

    Ok(())
}

fn print_text_table(program: &str, records: &[CalibrationRecord], skipped: u64, verbose: bool) {
    println!("\nQuality calibration of {program}");
    if records.is_empty() {
        println!("   No bases were tallied");
        return;
    }
    println!(
        "\n   {:>9}  {:>12}  {:>12}  {:>8}  {:>23}",
        "Reported", "Bases", "Mismatches", "Observed", "Interval"
    );
    for record in records {
        let observed = if record.observed_phred.is_nan() {
            "NA".to_string()
        } else {
            format!("{:.2}", record.observed_phred)
        };
        println!(
            "   {:>9}  {:>12}  {:>12}  {:>8}  [{:>9.2}, {:>9.2}]",
            record.predicted_phred,
            record.n_total,
            record.n_mismatches,
            observed,
            record.observed_phred_lower,
            record.observed_phred_upper,
        );
    }
    if verbose && skipped > 0 {
        println!("\n   Reads skipped for length mismatch: {skipped}");
    }
}
