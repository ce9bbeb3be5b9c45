// src/common/record.rs

use core::fmt;
use core::str::{self, FromStr};

/// Largest transfer record accepted before the `NUL` terminator.
pub const MAX_RECORD_LEN: usize = 64;

/// One wavelength/measurement pair from a data transfer.
/// Format on the wire: `<wavelength><whitespace><measurement>` followed by `NUL`.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataPoint {
    pub wavelength: f64,
    pub measurement: f64,
}

impl DataPoint {
    pub const fn new(wavelength: f64, measurement: f64) -> Self {
        Self { wavelength, measurement }
    }

    /// Parses one record (terminator already stripped) into a `DataPoint`.
    /// Exactly two whitespace-separated numeric tokens are required.
    pub fn parse_record(record: &[u8]) -> Result<Self, RecordError> {
        let text = str::from_utf8(record).map_err(|_| RecordError::InvalidUtf8)?;

        let mut tokens = text.split_ascii_whitespace();
        let (wavelength, measurement) = match (tokens.next(), tokens.next()) {
            (Some(w), Some(m)) => (w, m),
            (Some(_), None) => return Err(RecordError::TokenCount(1)),
            _ => return Err(RecordError::TokenCount(0)),
        };
        let extra = tokens.count();
        if extra > 0 {
            return Err(RecordError::TokenCount(2 + extra));
        }

        let wavelength = f64::from_str(wavelength).map_err(|_| RecordError::InvalidNumber)?;
        let measurement = f64::from_str(measurement).map_err(|_| RecordError::InvalidNumber)?;
        Ok(Self { wavelength, measurement })
    }
}

impl From<DataPoint> for (f64, f64) {
    fn from(point: DataPoint) -> Self {
        (point.wavelength, point.measurement)
    }
}

/// Error while reading a transfer data record.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RecordError {
    /// Record did not split into exactly two tokens; holds the count found.
    TokenCount(usize),
    /// A token was not a decimal number.
    InvalidNumber,
    /// Record bytes were not valid ASCII/UTF-8.
    InvalidUtf8,
    /// Record grew past `MAX_RECORD_LEN` without a terminator.
    TooLong,
    /// `EOT` arrived in the middle of a record.
    Truncated,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RecordError::*;
        match self {
            TokenCount(n) => write!(f, "expected 2 tokens in data record, found {}", n),
            InvalidNumber => write!(f, "non-numeric token in data record"),
            InvalidUtf8 => write!(f, "data record is not ASCII"),
            TooLong => write!(f, "data record longer than {} bytes", MAX_RECORD_LEN),
            Truncated => write!(f, "data record cut short by EOT"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RecordError {}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_valid() {
        assert_eq!(DataPoint::parse_record(b"500.0 0.123").unwrap(), DataPoint::new(500.0, 0.123));
        assert_eq!(DataPoint::parse_record(b"  190.0\t-0.004 ").unwrap(), DataPoint::new(190.0, -0.004));
        assert_eq!(DataPoint::parse_record(b"1100 3").unwrap(), DataPoint::new(1100.0, 3.0));
        assert_eq!(DataPoint::parse_record(b"700.0\r\n98.5").unwrap(), DataPoint::new(700.0, 98.5));
    }

    #[test]
    fn test_parse_record_token_count() {
        assert_eq!(DataPoint::parse_record(b""), Err(RecordError::TokenCount(0)));
        assert_eq!(DataPoint::parse_record(b"   "), Err(RecordError::TokenCount(0)));
        assert_eq!(DataPoint::parse_record(b"500.0"), Err(RecordError::TokenCount(1)));
        assert_eq!(DataPoint::parse_record(b"500.0 0.1 0.2"), Err(RecordError::TokenCount(3)));
    }

    #[test]
    fn test_parse_record_invalid() {
        assert_eq!(DataPoint::parse_record(b"500.0 abc"), Err(RecordError::InvalidNumber));
        assert_eq!(DataPoint::parse_record(b"x 0.1"), Err(RecordError::InvalidNumber));
        assert_eq!(DataPoint::parse_record(&[0xFF, b' ', b'1']), Err(RecordError::InvalidUtf8));
    }

    #[test]
    fn test_into_tuple() {
        let pair: (f64, f64) = DataPoint::new(501.0, 0.13).into();
        assert_eq!(pair, (501.0, 0.13));
    }
}
