//! Qualities command - occurrence of each quality value in a FASTQ file.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::calibration::occurrence::QualityOccurrence;
use crate::cli::{base_name, OutputFormat};
use crate::core::types::PHRED_OFFSET;
use crate::metrics::writer::{write_csv, write_csv_to};
use crate::parsing::fastq::FastqReader;

/// Arguments for the qualities command
#[derive(Args)]
pub struct QualitiesArgs {
    /// Reads to count (FASTQ, optionally gzipped)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Quality shift applied by the simulator
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub quality_shift: i32,

    /// Label for the read column (defaults to the file name)
    #[arg(long)]
    pub read: Option<String>,

    /// Write the counts as CSV to this file
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Execute the qualities command
///
/// # Errors
///
/// Returns an error if the input cannot be read or the counts cannot be
/// written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: QualitiesArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let reader = FastqReader::from_path(&args.input)
        .with_context(|| format!("Failed to open reads: {}", args.input.display()))?;

    let mut occurrence = QualityOccurrence::new(PHRED_OFFSET);
    let mut records = 0u64;
    for read in reader {
        let read = read.with_context(|| format!("Failed to read reads: {}", args.input.display()))?;
        occurrence.observe(&read);
        records += 1;
    }

    let label = args.read.clone().unwrap_or_else(|| base_name(&args.input));
    let rows = occurrence.rows(args.quality_shift, &label);

    if let Some(out) = &args.out {
        write_csv(out, &rows, "quality count")?;
    }

    match format {
        OutputFormat::Text => {
            println!("\nQuality values in {label}");
            if verbose {
                println!("   {records} records, {} quality values", occurrence.total());
            }
            for (quality, count) in occurrence.iter().filter(|&(_, count)| count > 0) {
                println!("   Q{quality:<3} {count}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Csv => write_csv_to(io::stdout(), &rows)?,
    }

    Ok(())
}
