//! Parser for FASTQ files written by read simulators and merging tools.
//!
//! Records are taken four lines at a time (name, sequence, optional,
//! quality). [`FastqReader`] yields records one by one so large merged-read
//! files can be processed without materialising them; [`read_fastq`] collects
//! a whole file for callers that need random access.

use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info};

use crate::core::record::Read;
use crate::parsing::compression::open_input;
use crate::parsing::{LineReader, ParseError};

/// Streaming reader over four-line FASTQ records
pub struct FastqReader<R> {
    lines: LineReader<R>,
    finished: bool,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: LineReader::new(reader),
            finished: false,
        }
    }

    fn read_record(&mut self) -> Result<Option<Read>, ParseError> {
        let mut fields: [Vec<u8>; 4] = Default::default();
        for (i, field) in fields.iter_mut().enumerate() {
            match self.lines.next_line()? {
                Some(line) => *field = line,
                None => {
                    if i > 0 {
                        debug!("Dropping trailing partial FASTQ record ({i} of 4 lines)");
                    }
                    return Ok(None);
                }
            }
        }
        let [name, sequence, optional, quality] = fields;
        Ok(Some(Read {
            name,
            sequence,
            optional,
            quality,
        }))
    }
}

impl FastqReader<Box<dyn BufRead>> {
    /// Open a plain or gzip-compressed FASTQ file
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be opened.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        Ok(Self::new(open_input(path)?))
    }
}

impl<R: BufRead> Iterator for FastqReader<R> {
    type Item = Result<Read, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(read)) => Some(Ok(read)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Load every record of a FASTQ file, in file order.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened or read.
pub fn read_fastq(path: &Path) -> Result<Vec<Read>, ParseError> {
    let reads = FastqReader::from_path(path)?.collect::<Result<Vec<_>, _>>()?;
    info!("Loaded {} reads from {}", reads.len(), path.display());
    Ok(reads)
}
