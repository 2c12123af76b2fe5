//! Writing result rows as CSV.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

/// Write rows to a CSV file with a header line.
///
/// An empty slice produces an empty file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_csv<P: AsRef<Path>, T: Serialize>(
    path: P,
    rows: &[T],
    description: &str,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {description} file: {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write {description} row: {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {description} file: {}", path.display()))?;
    info!("Wrote {} {} rows to {}", rows.len(), description, path.display());
    Ok(())
}

/// Write rows as CSV to any writer (standard output for `--format csv`).
///
/// # Errors
///
/// Returns an error if a row cannot be serialized or the writer fails.
pub fn write_csv_to<W: Write, T: Serialize>(out: W, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
