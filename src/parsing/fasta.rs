//! Parser for simulated template FASTA files.
//!
//! Templates are written by the simulator as strict two-line records: a
//! header line and a single sequence line. Lines are read in pairs; the first
//! byte of the header (the `>` marker) is dropped and the rest becomes the
//! template identifier.
//!
//! Both plain and gzip-compressed files are accepted.

use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info};

use crate::core::record::{Template, TemplateSet};
use crate::parsing::compression::open_input;
use crate::parsing::{LineReader, ParseError};

/// Load all templates from a FASTA file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened or read.
pub fn read_templates(path: &Path) -> Result<TemplateSet, ParseError> {
    let reader = open_input(path)?;
    let templates = parse_templates(reader)?;
    info!(
        "Loaded {} templates from {}",
        templates.len(),
        path.display()
    );
    Ok(templates)
}

/// Parse two-line FASTA records from a reader.
///
/// A trailing header without a sequence line is dropped.
///
/// # Errors
///
/// Returns `ParseError::Io` if reading fails.
pub fn parse_templates<R: BufRead>(reader: R) -> Result<TemplateSet, ParseError> {
    let mut lines = LineReader::new(reader);
    let mut templates = TemplateSet::new();

    while let Some(header) = lines.next_line()? {
        let Some(sequence) = lines.next_line()? else {
            debug!("Dropping trailing FASTA header without a sequence line");
            break;
        };
        let id = header.get(1..).map(<[u8]>::to_vec).unwrap_or_default();
        templates.insert(Template::new(id, sequence));
    }

    Ok(templates)
}
