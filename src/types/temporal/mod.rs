//! Precision-aware HL7 temporal literals.
//!
//! `CommonTm` (time of day), `CommonDt` (date) and `CommonTs` (timestamp)
//! parse and rebuild the textual forms used by the TM, DT and TS/DTM
//! datatypes. Every setter recomputes the stored literal, so the value
//! returned by `value()` always reflects the last accepted input at exactly
//! the precision it was given.

pub mod date;
pub mod time;
pub mod timestamp;

pub use date::CommonDt;
pub use time::CommonTm;
pub use timestamp::CommonTs;

use chrono::FixedOffset;

use crate::error::{Hl7Error, Result};

/// HL7 explicit null ("delete this value") literal.
pub const HL7_NULL: &str = "\"\"";

pub(crate) fn pad_zeroes(value: i64, width: usize) -> String {
    format!("{value:0width$}")
}

/// Parse an unsigned run of ASCII digits.
pub(crate) fn parse_digits(text: &str, datatype: &str, original: &str) -> Result<i32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Hl7Error::data_type(format!(
            "The {datatype} datatype value contains non-numeric characters. Value: {original}"
        )));
    }
    text.parse::<i32>().map_err(|_| {
        Hl7Error::data_type(format!(
            "The {datatype} datatype value could not be parsed. Value: {original}"
        ))
    })
}

/// Split `value` at the first `+` or `-` into the main literal and the signed offset.
pub(crate) fn split_offset(value: &str) -> (&str, Option<&str>) {
    match value.find(['+', '-']) {
        Some(index) => (&value[..index], Some(&value[index..])),
        None => (value, None),
    }
}

/// Parse a `+ZZZZ`/`-ZZZZ` offset into signed HHMM form.
pub(crate) fn parse_offset(offset: &str, datatype: &str, original: &str) -> Result<i32> {
    if offset.len() != 5 {
        return Err(Hl7Error::data_type(format!(
            "The length of the GMT offset for the {datatype} datatype value does not conform to the allowable format [+/-ZZZZ]. Value: {original}"
        )));
    }
    let magnitude = parse_digits(&offset[1..], datatype, original)?;
    let signed = if offset.starts_with('-') {
        -magnitude
    } else {
        magnitude
    };
    validate_offset(signed, datatype)?;
    Ok(signed)
}

pub(crate) fn validate_offset(signed: i32, datatype: &str) -> Result<()> {
    let magnitude = signed.unsigned_abs();
    let hours = magnitude / 100;
    let minutes = magnitude % 100;
    if hours > 23 {
        return Err(Hl7Error::data_type(format!(
            "The GMT offset hour value of the {datatype} datatype must be >=0 and <=23"
        )));
    }
    if minutes > 59 {
        return Err(Hl7Error::data_type(format!(
            "The GMT offset minute value of the {datatype} datatype must be >=0 and <=59"
        )));
    }
    Ok(())
}

pub(crate) fn format_offset(signed: i32) -> String {
    let sign = if signed >= 0 { '+' } else { '-' };
    format!("{sign}{}", pad_zeroes(i64::from(signed.unsigned_abs()), 4))
}

/// Round seconds to 1/10000ths and split into whole seconds and ten-thousandths.
pub(crate) fn split_seconds(seconds: f64, datatype: &str) -> Result<(i32, i32)> {
    let scaled = (seconds * 10_000.0).round();
    if !scaled.is_finite() || !(0.0..600_000.0).contains(&scaled) {
        return Err(Hl7Error::data_type(format!(
            "The (rounded) second value of the {datatype} datatype must be >=0 and <60"
        )));
    }
    let scaled = scaled as i32;
    Ok((scaled / 10_000, scaled % 10_000))
}

/// Convert a chrono offset to signed HHMM.
pub fn offset_to_hhmm(offset: &FixedOffset) -> i32 {
    let seconds = offset.local_minus_utc();
    let magnitude = seconds.abs();
    let hhmm = (magnitude / 3600) * 100 + (magnitude % 3600) / 60;
    if seconds < 0 { -hhmm } else { hhmm }
}

/// Convert signed HHMM to a chrono offset.
pub fn hhmm_to_offset(hhmm: i32) -> Option<FixedOffset> {
    let magnitude = hhmm.abs();
    let seconds = (magnitude / 100) * 3600 + (magnitude % 100) * 60;
    FixedOffset::east_opt(if hhmm < 0 { -seconds } else { seconds })
}
