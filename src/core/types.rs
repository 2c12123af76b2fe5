use serde::{Deserialize, Serialize};

/// Offset added to Phred scores when encoded as FASTQ quality characters
pub const PHRED_OFFSET: u8 = 33;

/// Read merging tools whose output headers the normalizer understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergingTool {
    AdapterRemoval,
    Bbmerge,
    ClipAndMerge,
    Fastp,
    LeeHom,
    SeqPrep,
    SeqtkAdna,
    Other(String),
}

impl MergingTool {
    /// Parse a tool name as given on the command line (case-insensitive)
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "adapterremoval" => Self::AdapterRemoval,
            "bbmerge" => Self::Bbmerge,
            "clipandmerge" => Self::ClipAndMerge,
            "fastp" => Self::Fastp,
            "leehom" => Self::LeeHom,
            "seqprep" => Self::SeqPrep,
            "seqtk" | "seqtk_adna" | "seqtk_adna_trim" | "seqtk/adna" => Self::SeqtkAdna,
            _ => Self::Other(s.to_string()),
        }
    }

    /// The header prefix convention this tool writes for merged reads.
    ///
    /// Returns `None` for tools we know nothing about.
    #[must_use]
    pub fn prefix_convention(&self) -> Option<PrefixConvention> {
        match self {
            Self::AdapterRemoval | Self::ClipAndMerge => Some(PrefixConvention::MergedMarker),
            Self::Bbmerge | Self::Fastp | Self::LeeHom | Self::SeqPrep | Self::SeqtkAdna => {
                Some(PrefixConvention::Generic)
            }
            Self::Other(_) => None,
        }
    }
}

impl std::fmt::Display for MergingTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AdapterRemoval => write!(f, "AdapterRemoval"),
            Self::Bbmerge => write!(f, "bbmerge"),
            Self::ClipAndMerge => write!(f, "ClipAndMerge"),
            Self::Fastp => write!(f, "fastp"),
            Self::LeeHom => write!(f, "leeHom"),
            Self::SeqPrep => write!(f, "SeqPrep"),
            Self::SeqtkAdna => write!(f, "seqtk_adna_trim"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Header prefix written in front of the template identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixConvention {
    /// `@M_` (AdapterRemoval, ClipAndMerge)
    MergedMarker,
    /// Plain `@` (leeHom, seqtk/adna, bbmerge, fastp, SeqPrep)
    Generic,
}

impl PrefixConvention {
    /// Conventions in the order they are tried
    pub const PRIORITY: [PrefixConvention; 2] = [Self::MergedMarker, Self::Generic];

    #[must_use]
    pub fn prefix(self) -> &'static [u8] {
        match self {
            Self::MergedMarker => b"@M_",
            Self::Generic => b"@",
        }
    }
}

/// Outcome of comparing the two parent calls at one position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentAgreement {
    /// Forward and reverse parents call the same nucleotide
    Match,
    /// Forward and reverse parents disagree
    Mismatch,
}

impl std::fmt::Display for ParentAgreement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Mismatch => write!(f, "mismatch"),
        }
    }
}

/// Convert an encoded quality character to its Phred score.
///
/// Characters below the offset clamp to zero.
#[inline]
#[must_use]
pub fn decode_phred(quality_char: u8, offset: u8) -> u8 {
    quality_char.saturating_sub(offset)
}

/// Reverse complement a nucleotide sequence.
///
/// Only `A`, `C`, `G` and `T` are complemented; any other byte is kept as-is.
#[must_use]
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence
        .iter()
        .rev()
        .map(|&b| match b {
            b'A' => b'T',
            b'T' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            other => other,
        })
        .collect()
}
