//! Command-line interface for merge-eval.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **accuracy**: Edit distances of merged reads against their templates
//! - **calibrate**: Reported versus observed base qualities
//! - **per-base**: Calls at one fragment position, merged read versus parents
//! - **qualities**: How often each quality value occurs in a FASTQ file
//!
//! ## Usage
//!
//! ```text
//! # Accuracy of a fixed-length simulation
//! merge-eval accuracy templates.fa.gz merged.fq --tool fastp \
//!     --nfrags 1000 --fraglen 100 --out acc.csv
//!
//! # Quality calibration
//! merge-eval calibrate templates.fa merged.fq.gz --tool leeHom \
//!     --nfrags 1000 --fraglen 120 --quality-shift -10
//!
//! # Per-base behaviour with JSON summary
//! merge-eval --format json per-base s1.fq s2.fq merged.fq --tool AdapterRemoval
//! ```

use std::path::Path;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::core::types::MergingTool;
use crate::matching::engine::ReconciliationStats;

pub mod accuracy;
pub mod calibrate;
pub mod per_base;
pub mod qualities;

#[derive(Parser)]
#[command(name = "merge-eval")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Evaluate paired-end read merging tools against simulated ground truth")]
#[command(
    long_about = "merge-eval scores the output of read merging tools against the fragments they were simulated from.\n\nMerged read headers are normalized to template identifiers, joined to the ground truth, and evaluated for:\n- Reconstruction accuracy (edit distance per read)\n- Calibration of the reported base qualities\n- Resolution of concordant and discordant parent calls at a fixed position"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score merged reads against their templates by edit distance
    Accuracy(accuracy::AccuracyArgs),

    /// Compare reported base qualities with observed error rates
    Calibrate(calibrate::CalibrateArgs),

    /// Compare merged reads with both parent reads at one position
    PerBase(per_base::PerBaseArgs),

    /// Count quality value occurrences in a FASTQ file
    Qualities(qualities::QualitiesArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// File name without its directory, as written into result rows
pub(crate) fn base_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Log the join breakdown, and warn when the headers do not follow the
/// convention the named tool is known to write
pub(crate) fn report_reconciliation(tool: &MergingTool, stats: &ReconciliationStats) {
    info!(
        "{} candidate reads: {} reconciled, {} unmerged, {} unassigned, {} unpaired",
        stats.candidates, stats.reconciled, stats.unmerged, stats.unassigned, stats.unpaired
    );
    if let (Some(expected), Some(seen)) = (tool.prefix_convention(), stats.dominant_convention()) {
        if expected != seen {
            warn!(
                "{tool} usually writes '{}' headers, but most reads used '{}'",
                String::from_utf8_lossy(expected.prefix()),
                String::from_utf8_lossy(seen.prefix())
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(Path::new("/data/run1/merged.fq.gz")), "merged.fq.gz");
        assert_eq!(base_name(Path::new("merged.fq")), "merged.fq");
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "merge-eval",
            "qualities",
            "reads.fq",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Qualities(_)));
    }
}
