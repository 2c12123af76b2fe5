//! Result rows and their serialization.
//!
//! Not-a-number values are written as `NA`, which R and pandas both read back
//! as missing.

pub mod writer;

use serde::Serializer;

/// Marker written in place of a missing or not-a-number value
pub const NA: &str = "NA";

/// Serialize an `f64`, writing not-a-number as `NA`
#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
pub fn serialize_f64_na<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_nan() {
        serializer.serialize_str(NA)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Serialize an optional `f64`, writing `None` and not-a-number as `NA`
#[allow(clippy::ref_option)] // serde requires &T signature
pub fn serialize_optional_na<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) => serialize_f64_na(v, serializer),
        None => serializer.serialize_str(NA),
    }
}
