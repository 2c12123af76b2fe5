//! Transparent gzip handling.
//!
//! Compression is detected from the first two bytes of the file, so a gzipped
//! file without a `.gz` extension (or a plain file with one) is still read
//! correctly.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::parsing::ParseError;

/// The two leading bytes of every gzip member
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Check whether the file at `path` starts with the gzip magic number.
///
/// Files shorter than two bytes are reported as not gzipped.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened or read.
pub fn is_gzipped(path: &Path) -> Result<bool, ParseError> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let mut filled = 0;
    while filled < magic.len() {
        let n = file.read(&mut magic[filled..])?;
        if n == 0 {
            return Ok(false);
        }
        filled += n;
    }
    Ok(magic == GZIP_MAGIC)
}

/// Open `path` for buffered reading, decompressing if it is gzipped.
///
/// The returned reader owns the file handle, which is closed when the reader
/// is dropped.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    let gzipped = is_gzipped(path)?;
    let file = File::open(path)?;

    if gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
