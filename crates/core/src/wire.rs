//! Fixed-width wire formats used on Flex statements.
//!
//! Dates arrive as `YYYYMMDD` and execution instants as `YYYYMMDDHHMMSS`
//! (some query configurations separate the two halves with `;` or `,`).
//! Parsing happens before the pipeline runs; the pipeline itself only ever
//! sees `chrono` values.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// A field that could not be decoded from its wire format.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("invalid date {value:?}, expected YYYYMMDD")]
    InvalidDate { value: String },

    #[error("invalid timestamp {value:?}, expected YYYYMMDDHHMMSS")]
    InvalidDateTime { value: String },
}

/// Parse a `YYYYMMDD` statement date.
pub fn parse_date(value: &str) -> Result<NaiveDate, WireError> {
    NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| WireError::InvalidDate {
        value: value.to_string(),
    })
}

/// Parse a `YYYYMMDDHHMMSS` statement timestamp.
///
/// Accepts `;` or `,` between the date and time halves, and a bare
/// `YYYYMMDD` (midnight) for queries configured without execution times.
pub fn parse_date_time(value: &str) -> Result<NaiveDateTime, WireError> {
    let compact: String = value.chars().filter(|c| *c != ';' && *c != ',').collect();

    if compact.len() == 8 {
        return parse_date(&compact)
            .map(|d| d.and_time(chrono::NaiveTime::MIN))
            .map_err(|_| WireError::InvalidDateTime {
                value: value.to_string(),
            });
    }

    NaiveDateTime::parse_from_str(&compact, "%Y%m%d%H%M%S").map_err(|_| {
        WireError::InvalidDateTime {
            value: value.to_string(),
        }
    })
}
