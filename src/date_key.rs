use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("malformed date key {0:?}, expected YYYY-MM-DD")]
    MalformedKey(String),
}

/// Canonical `YYYY-MM-DD` identifier of a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(String);

impl DateKey {
    pub fn encode(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        if !(0..=MAX_YEAR).contains(&year)
            || !(1..=12).contains(&month)
            || day < 1
            || day > days_in_month(year, month)
        {
            return Err(DateError::InvalidDate { year, month, day });
        }
        Ok(Self(format!("{year:04}-{month:02}-{day:02}")))
    }

    pub fn decode(raw: &str) -> Result<(i32, u32, u32), DateError> {
        let malformed = || DateError::MalformedKey(raw.to_string());
        let bytes = raw.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(malformed());
        }
        let digits = |range: std::ops::Range<usize>| -> Result<u32, DateError> {
            let part = &raw[range];
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse().map_err(|_| malformed())
        };
        let year = digits(0..4)? as i32;
        let month = digits(5..7)?;
        let day = digits(8..10)?;
        Self::encode(year, month, day).map_err(|_| malformed())?;
        Ok((year, month, day))
    }

    pub fn parse(raw: &str) -> Result<Self, DateError> {
        Self::decode(raw)?;
        Ok(Self(raw.to_string()))
    }

    /// Today's local date. Fails only if the clock sits outside years 0000-9999.
    pub fn today() -> Result<Self, DateError> {
        Self::try_from(Local::now().date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<NaiveDate> for DateKey {
    type Error = DateError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        Self::encode(date.year(), date.month(), date.day())
    }
}

impl TryFrom<String> for DateKey {
    type Error = DateError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::decode(&raw)?;
        Ok(Self(raw))
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-based); 0 for months outside 1..=12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}
