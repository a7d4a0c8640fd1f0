//! Daytime message formats: detection and parsing.
//!
//! A daytime reply is a single human-readable line, but two layouts are
//! common in the wild:
//! - The generic RFC 867 style: `"Thu Jun 13 10:22:04 2024"`
//! - The NIST style: eight space-separated fields starting with a modified
//!   Julian date, e.g. `"60474 24-06-13 13:22:04 50 0 +0000 37.6 UTC(NIST)"`
//!
//! Callers either pre-select a layout or leave it as [`DaytimeFormat::Unknown`]
//! and let [`parse`] detect it by searching for the `NIST` token.

pub mod nist;
pub mod rfc;

pub use nist::NistFields;
pub use rfc::RfcFields;

/// Token that identifies a NIST-style message.
pub const NIST_MESSAGE_ID: &str = "NIST";

/// Message layout selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DaytimeFormat {
    /// Layout not known up front; detect it from the message text.
    #[default]
    Unknown,
    /// Generic weekday/month/day/time/year layout.
    Rfc,
    /// Eight-field NIST layout.
    Nist,
}

/// A parsed daytime message, tagged by the layout it was read with.
///
/// Fields that a layout never populates simply do not exist on its variant,
/// so "absent" and "zero" cannot be confused.
#[derive(Debug, Clone, PartialEq)]
pub enum DaytimeMessage {
    /// Message parsed with the NIST layout.
    Nist(NistFields),
    /// Message parsed with the generic RFC layout.
    Rfc(RfcFields),
}

impl DaytimeMessage {
    /// Layout this message was parsed with.
    pub fn format(&self) -> DaytimeFormat {
        match self {
            DaytimeMessage::Nist(_) => DaytimeFormat::Nist,
            DaytimeMessage::Rfc(_) => DaytimeFormat::Rfc,
        }
    }

    /// Calendar date text (layout-specific shape).
    pub fn date(&self) -> &str {
        match self {
            DaytimeMessage::Nist(fields) => &fields.date,
            DaytimeMessage::Rfc(fields) => &fields.date,
        }
    }

    /// Time-of-day text, typically `HH:MM:SS`.
    pub fn time(&self) -> &str {
        match self {
            DaytimeMessage::Nist(fields) => &fields.time,
            DaytimeMessage::Rfc(fields) => &fields.time,
        }
    }
}

/// Message parsing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Too few whitespace-delimited tokens for the selected layout.
    TokenCount { expected: usize, found: usize },
    /// A structural field failed to convert to its declared type.
    InvalidField { field: &'static str, value: String },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::TokenCount { expected, found } => {
                write!(f, "expected at least {} tokens, found {}", expected, found)
            }
            ParseError::InvalidField { field, value } => {
                write!(f, "invalid {} field: {:?}", field, value)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a raw daytime message using the requested layout.
///
/// With [`DaytimeFormat::Unknown`] the layout is detected first: a message
/// containing the `NIST` token (any case) goes through the NIST parser,
/// anything else through the RFC parser. This is a substring heuristic only;
/// the rest of the message is not checked against the chosen layout until
/// the parser runs.
pub fn parse(message: &str, format: DaytimeFormat) -> Result<DaytimeMessage, ParseError> {
    match format {
        DaytimeFormat::Nist => nist::parse(message).map(DaytimeMessage::Nist),
        DaytimeFormat::Rfc => rfc::parse(message).map(DaytimeMessage::Rfc),
        DaytimeFormat::Unknown => {
            if is_nist_message(message) {
                nist::parse(message).map(DaytimeMessage::Nist)
            } else {
                rfc::parse(message).map(DaytimeMessage::Rfc)
            }
        }
    }
}

/// Case-insensitive check for the NIST message identifier.
fn is_nist_message(message: &str) -> bool {
    message.to_uppercase().contains(NIST_MESSAGE_ID)
}
