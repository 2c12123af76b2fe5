//! Validation of command-line parameters.
//!
//! The `parse_*` functions plug into clap as `value_parser`s so that bad
//! values are rejected with a usage message before any file is read.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Significance level must lie strictly between 0 and 1, got {0}")]
    AlphaOutOfRange(f64),
    #[error("Separator must be a single ASCII character, got '{0}'")]
    InvalidSeparator(String),
    #[error("Fragment length must be greater than zero")]
    EmptyFragment,
    #[error("Position {position} lies outside a fragment of length {fragment_length}")]
    PositionOutOfRange {
        position: usize,
        fragment_length: usize,
    },
}

/// Check that a significance level lies in `(0, 1)`.
///
/// # Errors
///
/// Returns `ValidationError::AlphaOutOfRange` otherwise, including for
/// not-a-number.
pub fn validate_alpha(alpha: f64) -> Result<f64, ValidationError> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(alpha)
    } else {
        Err(ValidationError::AlphaOutOfRange(alpha))
    }
}

/// Check that the inspected position lies inside the fragment.
///
/// # Errors
///
/// Returns `ValidationError::EmptyFragment` for a zero fragment length and
/// `ValidationError::PositionOutOfRange` if `position >= fragment_length`.
pub fn validate_fragment_geometry(
    fragment_length: usize,
    position: usize,
) -> Result<(), ValidationError> {
    if fragment_length == 0 {
        return Err(ValidationError::EmptyFragment);
    }
    if position >= fragment_length {
        return Err(ValidationError::PositionOutOfRange {
            position,
            fragment_length,
        });
    }
    Ok(())
}

/// Parse a header separator: exactly one ASCII character.
///
/// # Examples
///
/// ```
/// use merge_eval::utils::validation::parse_separator;
///
/// assert_eq!(parse_separator("-"), Ok(b'-'));
/// assert!(parse_separator("--").is_err());
/// assert!(parse_separator("").is_err());
/// ```
///
/// # Errors
///
/// Returns a message suitable for clap if the value is not one ASCII byte.
pub fn parse_separator(value: &str) -> Result<u8, String> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(ValidationError::InvalidSeparator(value.to_string()).to_string()),
    }
}

/// Parse a significance level in `(0, 1)`.
///
/// # Errors
///
/// Returns a message suitable for clap if the value is not a number in range.
pub fn parse_alpha(value: &str) -> Result<f64, String> {
    let alpha: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("Invalid significance level '{value}': {e}"))?;
    validate_alpha(alpha).map_err(|e| e.to_string())
}
