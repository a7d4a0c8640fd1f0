//! NIST daytime layout parser.
//!
//! Eight positional fields, whitespace-separated:
//!
//! ```text
//! 60474 24-06-13 13:22:04 50 0 +0000 37.6 UTC(NIST)
//! mjd   date     time     dst leap offset frac ref-id
//! ```
//!
//! Live NIST servers append an on-time marker (`*` or `#`) after the
//! reference id; trailing tokens beyond the eighth are ignored.

use super::ParseError;

/// Number of positional fields in a NIST message.
const FIELD_COUNT: usize = 8;

/// Fields of a NIST-layout daytime message.
///
/// Numeric fields are `None` when the corresponding token did not convert;
/// the message as a whole still parses.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NistFields {
    /// Modified Julian date (continuous day count).
    pub modified_julian_date: Option<i64>,
    /// Calendar date, typically `YY-MM-DD`.
    pub date: String,
    /// Time of day, typically `HH:MM:SS`.
    pub time: String,
    /// Daylight-saving indicator code.
    pub daylight_saving: Option<i32>,
    /// Leap-second indicator.
    pub leap_second: Option<i32>,
    /// UTC offset or health code.
    pub utc_offset: String,
    /// Advance compensation in fractional milliseconds.
    pub fractional_seconds: Option<f64>,
    /// Reference station id, typically `UTC(NIST)`.
    pub ref_id: String,
}

/// Parse a NIST-layout message.
///
/// Fewer than eight tokens is an error; extra tokens are ignored.
pub fn parse(message: &str) -> Result<NistFields, ParseError> {
    let tokens: Vec<&str> = message.split_whitespace().collect();
    if tokens.len() < FIELD_COUNT {
        return Err(ParseError::TokenCount {
            expected: FIELD_COUNT,
            found: tokens.len(),
        });
    }

    Ok(NistFields {
        modified_julian_date: tokens[0].parse().ok(),
        date: tokens[1].to_string(),
        time: tokens[2].to_string(),
        daylight_saving: tokens[3].parse().ok(),
        leap_second: tokens[4].parse().ok(),
        utc_offset: tokens[5].to_string(),
        fractional_seconds: tokens[6].parse().ok(),
        ref_id: tokens[7].to_string(),
    })
}
