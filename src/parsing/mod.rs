//! Parsers for the sequence files produced by read simulators and merging tools.
//!
//! This module provides:
//!
//! - **FASTA templates**: two-line records loaded into a [`TemplateSet`]
//! - **FASTQ reads**: four-line records, streamed with [`FastqReader`] or
//!   collected with [`read_fastq`]
//! - **Compression detection**: gzip is recognised by its magic number, not by
//!   the file extension
//!
//! Both parsers count lines rather than validating the formats' grammar. A file
//! whose line count is not a multiple of the record size silently loses its
//! trailing partial record. A FASTQ quality string is not checked against its
//! sequence; consumers that walk both in step decide what a mismatch means.
//!
//! ## Example
//!
//! ```rust,no_run
//! use merge_eval::parsing::{fasta::read_templates, fastq::read_fastq};
//! use std::path::Path;
//!
//! let templates = read_templates(Path::new("templates.fa.gz")).unwrap();
//! let reads = read_fastq(Path::new("merged.fq")).unwrap();
//! println!("{} templates, {} reads", templates.len(), reads.len());
//! ```
//!
//! [`TemplateSet`]: crate::core::record::TemplateSet
//! [`FastqReader`]: fastq::FastqReader
//! [`read_fastq`]: fastq::read_fastq

use std::io::BufRead;

use thiserror::Error;

pub mod compression;
pub mod fasta;
pub mod fastq;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads lines with trailing line terminators removed
pub(crate) struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
        }
    }

    /// Next line without its `\n` / `\r\n`, or `None` at end of input
    pub(crate) fn next_line(&mut self) -> Result<Option<Vec<u8>>, ParseError> {
        self.buf.clear();
        if self.inner.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        let mut end = self.buf.len();
        while end > 0 && matches!(self.buf[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        Ok(Some(self.buf[..end].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_line_reader_trims_terminators() {
        let mut reader = LineReader::new(Cursor::new(b"abc\r\ndef\n\nlast".to_vec()));
        assert_eq!(reader.next_line().unwrap(), Some(b"abc".to_vec()));
        assert_eq!(reader.next_line().unwrap(), Some(b"def".to_vec()));
        assert_eq!(reader.next_line().unwrap(), Some(Vec::new()));
        assert_eq!(reader.next_line().unwrap(), Some(b"last".to_vec()));
        assert_eq!(reader.next_line().unwrap(), None);
    }

    #[test]
    fn test_line_reader_keeps_inner_whitespace() {
        let mut reader = LineReader::new(Cursor::new(b"a b \n".to_vec()));
        assert_eq!(reader.next_line().unwrap(), Some(b"a b ".to_vec()));
    }
}
