use std::collections::HashMap;

use tracing::debug;

use crate::core::types::reverse_complement;

/// A ground-truth simulated fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Identifier taken from the FASTA header, without the leading `>`
    pub id: Vec<u8>,

    /// Nucleotide sequence
    pub sequence: Vec<u8>,
}

impl Template {
    pub fn new(id: impl Into<Vec<u8>>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }
}

/// A single four-line FASTQ record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read {
    /// Header line, including the tool decorations until normalized
    pub name: Vec<u8>,

    /// Nucleotide sequence
    pub sequence: Vec<u8>,

    /// Third FASTQ line, carried through untouched
    pub optional: Vec<u8>,

    /// Phred+33 encoded qualities, one per nucleotide
    pub quality: Vec<u8>,
}

impl Read {
    pub fn new(
        name: impl Into<Vec<u8>>,
        sequence: impl Into<Vec<u8>>,
        quality: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            optional: b"+".to_vec(),
            quality: quality.into(),
        }
    }

    /// Header rendered for display and CSV output
    #[must_use]
    pub fn display_name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

/// Lookup of identifiers used to decide whether a read can be reconciled
pub trait IdentifierIndex {
    fn contains_id(&self, id: &[u8]) -> bool;
}

/// Templates keyed by identifier.
///
/// Duplicate identifiers overwrite the earlier template.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<Vec<u8>, Template>,
}

impl TemplateSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a template, returning the one it replaced
    pub fn insert(&mut self, template: Template) -> Option<Template> {
        let replaced = self.templates.insert(template.id.clone(), template);
        if let Some(old) = &replaced {
            debug!(
                "Duplicate template id '{}' overwrote an earlier template",
                String::from_utf8_lossy(&old.id)
            );
        }
        replaced
    }

    #[must_use]
    pub fn get(&self, id: &[u8]) -> Option<&Template> {
        self.templates.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }
}

impl IdentifierIndex for TemplateSet {
    fn contains_id(&self, id: &[u8]) -> bool {
        self.templates.contains_key(id)
    }
}

impl FromIterator<Template> for TemplateSet {
    fn from_iter<I: IntoIterator<Item = Template>>(iter: I) -> Self {
        let mut set = Self::new();
        for template in iter {
            set.insert(template);
        }
        set
    }
}

/// One of the two sequencer reads a merged read was built from,
/// truncated to the fragment length and oriented along the fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRead {
    pub sequence: Vec<u8>,
    pub quality: Vec<u8>,
}

impl ParentRead {
    /// Build the forward parent from its read, keeping the first `fragment_length` bases
    #[must_use]
    pub fn forward(read: &Read, fragment_length: usize) -> Self {
        Self {
            sequence: truncated(&read.sequence, fragment_length).to_vec(),
            quality: truncated(&read.quality, fragment_length).to_vec(),
        }
    }

    /// Build the reverse parent: truncate, then reverse complement the sequence
    /// and reverse the qualities so positions line up with the forward strand
    #[must_use]
    pub fn reverse(read: &Read, fragment_length: usize) -> Self {
        let mut quality = truncated(&read.quality, fragment_length).to_vec();
        quality.reverse();
        Self {
            sequence: reverse_complement(truncated(&read.sequence, fragment_length)),
            quality,
        }
    }
}

fn truncated(bytes: &[u8], len: usize) -> &[u8] {
    &bytes[..bytes.len().min(len)]
}

/// Forward and reverse parent reads, each keyed by canonical identifier
#[derive(Debug, Clone, Default)]
pub struct ParentReads {
    pub forward: HashMap<Vec<u8>, ParentRead>,
    pub reverse: HashMap<Vec<u8>, ParentRead>,
}

impl ParentReads {
    /// Number of forward parents; this is the ground-truth side of the join
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

impl IdentifierIndex for ParentReads {
    fn contains_id(&self, id: &[u8]) -> bool {
        self.forward.contains_key(id)
    }
}
