use serde::Serialize;
use tracing::debug;

use crate::core::record::{IdentifierIndex, ParentRead, ParentReads, Read, Template, TemplateSet};
use crate::core::types::PrefixConvention;
use crate::matching::header::{screen_read, HeaderError, Screened};

/// Default separator for template-comparison headers (`@M_<id>-<suffix>`)
pub const DEFAULT_TEMPLATE_SEPARATOR: u8 = b'-';

/// A merged read joined to its ground-truth template
#[derive(Debug, Clone)]
pub struct ReconciledPair<'a> {
    pub template: &'a Template,
    /// The merged read, renamed to the template id
    pub read: Read,
}

/// A merged read joined to the two reads it was merged from
#[derive(Debug, Clone)]
pub struct ParentTriple<'a> {
    pub forward: &'a ParentRead,
    pub reverse: &'a ParentRead,
    /// The merged read, renamed to the canonical id
    pub merged: Read,
}

/// Tally of what happened to each candidate read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationStats {
    /// Reads offered to the engine
    pub candidates: usize,
    /// Reads carrying an unmerged marker
    pub unmerged: usize,
    /// Merged reads whose canonical id had no counterpart
    pub unassigned: usize,
    /// Merged reads whose reverse parent was missing (parent mode only)
    pub unpaired: usize,
    /// Reads joined successfully
    pub reconciled: usize,
    /// Headers that used the `@M_` convention
    pub merged_marker_headers: usize,
    /// Headers that used the plain `@` convention
    pub generic_headers: usize,
}

impl ReconciliationStats {
    /// Candidates that did not produce a pair
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.candidates - self.reconciled
    }

    /// The convention seen most often, if any merged read was seen
    #[must_use]
    pub fn dominant_convention(&self) -> Option<PrefixConvention> {
        match (self.merged_marker_headers, self.generic_headers) {
            (0, 0) => None,
            (m, g) if m >= g => Some(PrefixConvention::MergedMarker),
            _ => Some(PrefixConvention::Generic),
        }
    }
}

/// Joins merged reads to a ground-truth index by canonical identifier.
///
/// The index is built once by the caller; each read is probed once, so a
/// batch is joined in O(n + m). Reads without a counterpart are dropped and
/// counted, never reported as errors.
pub struct ReconciliationEngine<'a, I: ?Sized> {
    index: &'a I,
    separator: u8,
    stats: ReconciliationStats,
}

impl<'a, I: IdentifierIndex + ?Sized> ReconciliationEngine<'a, I> {
    pub fn new(index: &'a I, separator: u8) -> Self {
        Self {
            index,
            separator,
            stats: ReconciliationStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> &ReconciliationStats {
        &self.stats
    }

    #[must_use]
    pub fn into_stats(self) -> ReconciliationStats {
        self.stats
    }

    /// Screen one read, updating the tallies; `Some` if the read can be joined
    fn screen(&mut self, read: Read) -> Result<Option<Read>, HeaderError> {
        self.stats.candidates += 1;
        match screen_read(read, self.index, self.separator)? {
            Screened::Unmerged => {
                self.stats.unmerged += 1;
                Ok(None)
            }
            Screened::Unassigned { id } => {
                debug!("No counterpart for read '{}'", String::from_utf8_lossy(&id));
                self.stats.unassigned += 1;
                Ok(None)
            }
            Screened::Merged { read, convention } => {
                match convention {
                    PrefixConvention::MergedMarker => self.stats.merged_marker_headers += 1,
                    PrefixConvention::Generic => self.stats.generic_headers += 1,
                }
                Ok(Some(read))
            }
        }
    }
}

impl<'a> ReconciliationEngine<'a, TemplateSet> {
    /// Join one merged read to its template.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError` if the read header matches no known convention.
    pub fn reconcile(&mut self, read: Read) -> Result<Option<ReconciledPair<'a>>, HeaderError> {
        let Some(read) = self.screen(read)? else {
            return Ok(None);
        };
        let index: &'a TemplateSet = self.index;
        match index.get(&read.name) {
            Some(template) => {
                self.stats.reconciled += 1;
                Ok(Some(ReconciledPair { template, read }))
            }
            None => {
                self.stats.unassigned += 1;
                Ok(None)
            }
        }
    }

    /// Join a batch of merged reads, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError` on the first header that matches no known
    /// convention.
    pub fn reconcile_all(
        &mut self,
        reads: impl IntoIterator<Item = Read>,
    ) -> Result<Vec<ReconciledPair<'a>>, HeaderError> {
        let mut pairs = Vec::new();
        for read in reads {
            if let Some(pair) = self.reconcile(read)? {
                pairs.push(pair);
            }
        }
        Ok(pairs)
    }
}

impl<'a> ReconciliationEngine<'a, ParentReads> {
    /// Join one merged read to its forward and reverse parents.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError` if the read header matches no known convention.
    pub fn reconcile(&mut self, read: Read) -> Result<Option<ParentTriple<'a>>, HeaderError> {
        let Some(merged) = self.screen(read)? else {
            return Ok(None);
        };
        let index: &'a ParentReads = self.index;
        let Some(forward) = index.forward.get(&merged.name) else {
            self.stats.unassigned += 1;
            return Ok(None);
        };
        let Some(reverse) = index.reverse.get(&merged.name) else {
            debug!("No reverse parent for read '{}'", merged.display_name());
            self.stats.unpaired += 1;
            return Ok(None);
        };
        self.stats.reconciled += 1;
        Ok(Some(ParentTriple {
            forward,
            reverse,
            merged,
        }))
    }

    /// Join a batch of merged reads to their parents, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError` on the first header that matches no known
    /// convention.
    pub fn reconcile_all(
        &mut self,
        reads: impl IntoIterator<Item = Read>,
    ) -> Result<Vec<ParentTriple<'a>>, HeaderError> {
        let mut triples = Vec::new();
        for read in reads {
            if let Some(triple) = self.reconcile(read)? {
                triples.push(triple);
            }
        }
        Ok(triples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_templates() -> TemplateSet {
        vec![
            Template::new("t1", "ACGTACGT"),
            Template::new("t2", "GGGGCCCC"),
            Template::new("t3", "TTTTAAAA"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_reconcile_all_joins_by_id() {
        let templates = make_templates();
        let mut engine = ReconciliationEngine::new(&templates, b'-');

        let reads = vec![
            Read::new("@M_t2-1", "GGGGCCCC", "IIIIIIII"),
            Read::new("@t1-1", "ACGTACGT", "IIIIIIII"),
        ];
        let pairs = engine.reconcile_all(reads).unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].template.id, b"t2".to_vec());
        assert_eq!(pairs[1].template.id, b"t1".to_vec());
        for pair in &pairs {
            assert_eq!(pair.read.name, pair.template.id);
        }
    }

    #[test]
    fn test_reconcile_counts_add_up() {
        let templates = make_templates();
        let mut engine = ReconciliationEngine::new(&templates, b'-');

        let reads = vec![
            Read::new("@M_t1-1", "ACGTACGT", "IIIIIIII"),
            Read::new("@F_t2-1", "GGGG", "IIII"),
            Read::new("@R_t2-1", "CCCC", "IIII"),
            Read::new("@unknown-1", "ACGT", "IIII"),
            Read::new("@t3", "TTTTAAAA", "IIIIIIII"),
        ];
        let pairs = engine.reconcile_all(reads).unwrap();
        let stats = engine.into_stats();

        assert_eq!(pairs.len(), 2);
        assert_eq!(stats.candidates, 5);
        assert_eq!(stats.unmerged, 2);
        assert_eq!(stats.unassigned, 1);
        assert_eq!(stats.reconciled, 2);
        assert_eq!(stats.dropped(), 3);
        assert_eq!(stats.dropped() + stats.reconciled, stats.candidates);
        assert_eq!(stats.merged_marker_headers, 1);
        assert_eq!(stats.generic_headers, 2);
    }

    #[test]
    fn test_reconcile_unknown_header_is_error() {
        let templates = make_templates();
        let mut engine = ReconciliationEngine::new(&templates, b'-');
        let result = engine.reconcile(Read::new("t1-1", "ACGT", "IIII"));
        assert!(result.is_err());
    }

    #[test]
    fn test_dominant_convention() {
        let mut stats = ReconciliationStats::default();
        assert_eq!(stats.dominant_convention(), None);
        stats.generic_headers = 3;
        assert_eq!(stats.dominant_convention(), Some(PrefixConvention::Generic));
        stats.merged_marker_headers = 5;
        assert_eq!(
            stats.dominant_convention(),
            Some(PrefixConvention::MergedMarker)
        );
    }

    fn make_parents() -> ParentReads {
        let mut parents = ParentReads::default();
        for id in ["p1", "p2"] {
            parents.forward.insert(
                id.as_bytes().to_vec(),
                ParentRead::forward(&Read::new(format!("@{id}/1"), "ACGT", "IIII"), 4),
            );
        }
        parents.reverse.insert(
            b"p1".to_vec(),
            ParentRead::reverse(&Read::new("@p1/2", "ACGT", "IIII"), 4),
        );
        parents
    }

    #[test]
    fn test_reconcile_parents() {
        let parents = make_parents();
        let mut engine = ReconciliationEngine::new(&parents, b'/');

        let reads = vec![
            Read::new("@p1/1", "ACGT", "IIII"),
            Read::new("@p2", "ACGT", "IIII"),
            Read::new("@p9", "ACGT", "IIII"),
        ];
        let triples = engine.reconcile_all(reads).unwrap();
        let stats = engine.stats();

        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].merged.name, b"p1".to_vec());
        assert_eq!(triples[0].forward.sequence, b"ACGT".to_vec());
        assert_eq!(stats.unpaired, 1);
        assert_eq!(stats.unassigned, 1);
        assert_eq!(stats.dropped() + stats.reconciled, stats.candidates);
    }
}
