//! Generic RFC 867 daytime layout parser.
//!
//! Five positional fields, whitespace-separated:
//!
//! ```text
//! Thu Jun 13 10:22:04 2024
//! ```
//!
//! The weekday is read and discarded; the date is rebuilt as
//! `"<month> <day> <year>"`.

use super::ParseError;

/// Number of positional fields in an RFC-style message.
const FIELD_COUNT: usize = 5;

/// Fields of a generic RFC-layout daytime message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RfcFields {
    /// Reconstructed date, `"<month> <day> <year>"`.
    pub date: String,
    /// Time of day, typically `HH:MM:SS`.
    pub time: String,
}

/// Parse an RFC-layout message.
///
/// Day and year must be decimal integers since the date string is rebuilt
/// from them; extra trailing tokens (e.g. a timezone name) are ignored.
pub fn parse(message: &str) -> Result<RfcFields, ParseError> {
    let tokens: Vec<&str> = message.split_whitespace().collect();
    if tokens.len() < FIELD_COUNT {
        return Err(ParseError::TokenCount {
            expected: FIELD_COUNT,
            found: tokens.len(),
        });
    }

    // tokens[0] is the weekday name, not retained.
    let month = tokens[1];
    let day: u32 = tokens[2].parse().map_err(|_| ParseError::InvalidField {
        field: "day",
        value: tokens[2].to_string(),
    })?;
    let time = tokens[3];
    let year: i32 = tokens[4].parse().map_err(|_| ParseError::InvalidField {
        field: "year",
        value: tokens[4].to_string(),
    })?;

    Ok(RfcFields {
        date: format!("{} {} {}", month, day, year),
        time: time.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        let fields = parse("Thu Jun 13 10:22:04 2024").unwrap();
        assert_eq!(fields.date, "Jun 13 2024");
        assert_eq!(fields.time, "10:22:04");
    }

    #[test]
    fn test_single_digit_day_stays_decimal() {
        // ctime()-style output pads the day with a space, which collapses
        // under whitespace splitting.
        let fields = parse("Thu Jan  1 00:00:00 1970").unwrap();
        assert_eq!(fields.date, "Jan 1 1970");
        assert_eq!(fields.time, "00:00:00");
    }

    #[test]
    fn test_trailing_tokens_ignored() {
        let fields = parse("Thu Jun 13 10:22:04 2024 UTC").unwrap();
        assert_eq!(fields.date, "Jun 13 2024");
    }

    #[test]
    fn test_too_few_tokens() {
        let err = parse("Thu Jun 13").unwrap_err();
        assert_eq!(
            err,
            ParseError::TokenCount {
                expected: 5,
                found: 3
            }
        );
    }

    #[test]
    fn test_non_numeric_day() {
        let err = parse("Thu Jun 13th 10:22:04 2024").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidField {
                field: "day",
                value: "13th".to_string()
            }
        );
    }

    #[test]
    fn test_non_numeric_year() {
        let err = parse("Thu Jun 13 10:22:04 MMXXIV").unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { field: "year", .. }));
    }
}
