//! Normalization of merged-read headers to canonical template identifiers.
//!
//! Merging tools decorate the template identifier they copy into the read
//! header. A merged read from AdapterRemoval looks like `@M_frag_17-1`, the
//! same read from fastp like `@frag_17-1`. Normalization removes the leading
//! decoration (`@M_` is tried before `@`) and cuts the header at the first
//! occurrence of a separator byte, leaving `frag_17`.
//!
//! Reads that the tool could not merge keep a forward (`@F_`) or reverse
//! (`@R_`) marker; they are discarded before normalization.

use thiserror::Error;

use crate::core::record::{IdentifierIndex, Read};
use crate::core::types::PrefixConvention;

/// Header markers of reads the tool left unmerged
pub const UNMERGED_MARKERS: [&[u8]; 2] = [b"@F_", b"@R_"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("Header '{header}' does not start with a known prefix (expected '@M_' or '@')")]
    UnrecognizedPrefix { header: String },
}

/// Result of screening one read against the join index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screened {
    /// Header carries an unmerged marker
    Unmerged,
    /// Normalized id has no counterpart in the index
    Unassigned { id: Vec<u8> },
    /// Read renamed to its canonical id and ready to be joined
    Merged {
        read: Read,
        convention: PrefixConvention,
    },
}

/// Does the raw header mark a read the tool left unmerged?
#[must_use]
pub fn is_unmerged(raw_header: &[u8]) -> bool {
    UNMERGED_MARKERS
        .iter()
        .any(|marker| raw_header.starts_with(marker))
}

/// Determine which prefix convention a header uses.
///
/// # Errors
///
/// Returns `HeaderError::UnrecognizedPrefix` if no known prefix matches.
pub fn classify_header(raw_header: &[u8]) -> Result<PrefixConvention, HeaderError> {
    PrefixConvention::PRIORITY
        .into_iter()
        .find(|convention| raw_header.starts_with(convention.prefix()))
        .ok_or_else(|| HeaderError::UnrecognizedPrefix {
            header: String::from_utf8_lossy(raw_header).into_owned(),
        })
}

/// Keep only the part of `id` before the first `separator`
#[must_use]
pub fn truncate_at_separator(id: &[u8], separator: u8) -> &[u8] {
    match id.iter().position(|&b| b == separator) {
        Some(pos) => &id[..pos],
        None => id,
    }
}

/// Normalize a raw header to its canonical identifier.
///
/// # Errors
///
/// Returns `HeaderError::UnrecognizedPrefix` if the header starts with neither
/// `@M_` nor `@`.
pub fn normalize_header(raw_header: &[u8], separator: u8) -> Result<Vec<u8>, HeaderError> {
    let convention = classify_header(raw_header)?;
    let stripped = &raw_header[convention.prefix().len()..];
    Ok(truncate_at_separator(stripped, separator).to_vec())
}

/// Screen a single read: drop unmerged reads, normalize the header and check
/// the canonical id against `index`.
///
/// # Errors
///
/// Returns `HeaderError::UnrecognizedPrefix` for a header in an unknown format.
pub fn screen_read<I: IdentifierIndex + ?Sized>(
    mut read: Read,
    index: &I,
    separator: u8,
) -> Result<Screened, HeaderError> {
    if is_unmerged(&read.name) {
        return Ok(Screened::Unmerged);
    }

    let convention = classify_header(&read.name)?;
    let id = truncate_at_separator(&read.name[convention.prefix().len()..], separator).to_vec();
    if !index.contains_id(&id) {
        return Ok(Screened::Unassigned { id });
    }

    read.name = id;
    Ok(Screened::Merged { read, convention })
}

/// Keep the merged reads that can be assigned to an entry of `index`,
/// renamed to their canonical ids, in input order.
///
/// # Errors
///
/// Returns `HeaderError::UnrecognizedPrefix` as soon as a header in an unknown
/// format is seen; the batch is not processed further.
pub fn filter_merged_reads<I: IdentifierIndex + ?Sized>(
    reads: impl IntoIterator<Item = Read>,
    index: &I,
    separator: u8,
) -> Result<Vec<Read>, HeaderError> {
    let mut kept = Vec::new();
    for read in reads {
        if let Screened::Merged { read, .. } = screen_read(read, index, separator)? {
            kept.push(read);
        }
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{Template, TemplateSet};

    fn templates(ids: &[&str]) -> TemplateSet {
        ids.iter().map(|id| Template::new(*id, "ACGT")).collect()
    }

    #[test]
    fn test_normalize_merged_marker() {
        assert_eq!(normalize_header(b"@M_t1-extra", b'-').unwrap(), b"t1".to_vec());
    }

    #[test]
    fn test_normalize_generic_prefix() {
        assert_eq!(normalize_header(b"@t1-extra", b'-').unwrap(), b"t1".to_vec());
        assert_eq!(normalize_header(b"@frag_9/1", b'/').unwrap(), b"frag_9".to_vec());
    }

    #[test]
    fn test_normalize_cuts_at_first_separator() {
        assert_eq!(normalize_header(b"@t1-a-b", b'-').unwrap(), b"t1".to_vec());
    }

    #[test]
    fn test_normalize_without_separator() {
        assert_eq!(normalize_header(b"@M_t1", b'-').unwrap(), b"t1".to_vec());
    }

    #[test]
    fn test_normalize_rejects_unknown_prefix() {
        let err = normalize_header(b"t1-extra", b'-').unwrap_err();
        assert_eq!(
            err,
            HeaderError::UnrecognizedPrefix {
                header: "t1-extra".to_string()
            }
        );
        assert!(normalize_header(b"", b'-').is_err());
    }

    #[test]
    fn test_normalize_is_idempotent_on_canonical_form() {
        for raw in [&b"@M_t1-extra"[..], b"@t1-1-2", b"@M_frag", b"@x"] {
            let once = normalize_header(raw, b'-').unwrap();
            let mut reprefixed = b"@".to_vec();
            reprefixed.extend_from_slice(&once);
            assert_eq!(normalize_header(&reprefixed, b'-').unwrap(), once);
            assert_eq!(truncate_at_separator(&once, b'-'), once.as_slice());
        }
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify_header(b"@M_t1").unwrap(), PrefixConvention::MergedMarker);
        assert_eq!(classify_header(b"@Mt1").unwrap(), PrefixConvention::Generic);
    }

    #[test]
    fn test_is_unmerged() {
        assert!(is_unmerged(b"@F_t1-extra"));
        assert!(is_unmerged(b"@R_t1"));
        assert!(!is_unmerged(b"@M_t1"));
        assert!(!is_unmerged(b"@t1"));
    }

    #[test]
    fn test_screen_read_unmerged_ignores_separator() {
        let index = templates(&["t1"]);
        for sep in [b'-', b'/', b'_'] {
            let read = Read::new("@F_t1-extra", "ACGT", "IIII");
            assert_eq!(screen_read(read, &index, sep).unwrap(), Screened::Unmerged);
        }
    }

    #[test]
    fn test_screen_read_unassigned() {
        let index = templates(&["t1"]);
        let read = Read::new("@t2-1", "ACGT", "IIII");
        assert_eq!(
            screen_read(read, &index, b'-').unwrap(),
            Screened::Unassigned { id: b"t2".to_vec() }
        );
    }

    #[test]
    fn test_filter_merged_reads_is_stable() {
        let index = templates(&["a", "b", "c"]);
        let reads = vec![
            Read::new("@M_c-1", "A", "I"),
            Read::new("@F_a-1", "A", "I"),
            Read::new("@a-1", "A", "I"),
            Read::new("@zz-1", "A", "I"),
            Read::new("@R_b-1", "A", "I"),
            Read::new("@M_b", "A", "I"),
        ];
        let kept = filter_merged_reads(reads, &index, b'-').unwrap();
        let names: Vec<&[u8]> = kept.iter().map(|r| r.name.as_slice()).collect();
        assert_eq!(names, vec![&b"c"[..], b"a", b"b"]);
    }

    #[test]
    fn test_filter_merged_reads_aborts_on_unknown_prefix() {
        let index = templates(&["a"]);
        let reads = vec![Read::new("@a", "A", "I"), Read::new("a", "A", "I")];
        assert!(filter_merged_reads(reads, &index, b'-').is_err());
    }
}
