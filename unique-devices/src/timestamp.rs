//! Validation of the `start` and `end` path segments.
//!
//! Two forms are accepted: `YYYYMMDD` for a whole day and `YYYYMMDDHH` for a
//! specific hour. Both normalize to the 10 digit form, which is also the
//! format of the clustering column in storage.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

const DAY_LEN: usize = 8;
const HOUR_LEN: usize = 10;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TimestampError {
    #[error("invalid timestamp: {0:?}")]
    Invalid(String),

    #[error("start timestamp should be before the end timestamp")]
    StartAfterEnd,
}

/// A calendar-valid `YYYYMMDDHH` timestamp.
///
/// Ordering is the lexical ordering of the digits, which matches
/// chronological order since every value has the same width.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_timestamp(s)
    }
}

/// Normalizes a `YYYYMMDD` or `YYYYMMDDHH` value into a [`Timestamp`].
///
/// An 8 digit day gets the `00` hour appended. The result must be a real
/// calendar date with an hour in `00..=23`; nothing is partially repaired.
pub fn normalize_timestamp(param: &str) -> Result<Timestamp, TimestampError> {
    let candidate = if param.len() == DAY_LEN {
        format!("{param}00")
    } else {
        param.to_string()
    };

    if candidate.len() != HOUR_LEN || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::Invalid(param.to_string()));
    }

    let invalid = || TimestampError::Invalid(param.to_string());
    let field = |from: usize, to: usize| candidate[from..to].parse::<u32>().map_err(|_| invalid());

    let year = candidate[0..4].parse::<i32>().map_err(|_| invalid())?;
    let month = field(4, 6)?;
    let day = field(6, 8)?;
    let hour = field(8, 10)?;

    if hour > 23 || NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(invalid());
    }

    Ok(Timestamp(candidate))
}

/// Checks that `start` does not come after `end`. Equal values are a valid
/// single-instant range.
pub fn validate_range(start: &Timestamp, end: &Timestamp) -> Result<(), TimestampError> {
    if start > end {
        return Err(TimestampError::StartAfterEnd);
    }
    Ok(())
}
