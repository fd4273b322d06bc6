use crate::error::Error;
use chrono::{DateTime, NaiveDateTime};
use std::fmt;
use std::ops::{Add, Sub};

const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// An absolute point in time at second resolution.
///
/// Parsed from a `YYYY-MM-DD HH:MM:SS` pair (local-civil, no timezone) and
/// stored as epoch seconds; all arithmetic is integer seconds. Input
/// timestamps are monotonically non-decreasing, which the scheduler assumes
/// but does not enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_secs(secs: i64) -> Self {
        Timestamp(secs)
    }

    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// Parses the two wire tokens of a record's timestamp.
    pub fn parse(date: &str, time: &str) -> Result<Self, Error> {
        let text = format!("{date} {time}");
        let parsed = NaiveDateTime::parse_from_str(&text, WIRE_FORMAT)
            .map_err(|e| Error::Parse(format!("bad timestamp '{text}': {e}")))?;
        Ok(Timestamp(parsed.and_utc().timestamp()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp(self.0, 0) {
            Some(dt) => write!(f, "{}", dt.format(WIRE_FORMAT)),
            None => write!(f, "<out-of-range: {}>", self.0),
        }
    }
}

impl Add<i64> for Timestamp {
    type Output = Timestamp;

    fn add(self, seconds: i64) -> Timestamp {
        Timestamp(self.0 + seconds)
    }
}

impl Sub for Timestamp {
    type Output = i64;

    /// Seconds elapsed from `rhs` to `self`.
    fn sub(self, rhs: Timestamp) -> i64 {
        self.0 - rhs.0
    }
}
