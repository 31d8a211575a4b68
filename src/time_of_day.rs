//! Half hour time slots selectable as the source time.
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

const SLOTS: u8 = 48;

/// One of the 48 times of day `00:00` to `23:30` at 30 minute granularity.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimeOfDay(u8);

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("invalid time of day '{0}', expected HH:00 or HH:30")]
pub struct ParseTimeOfDayError(String);

impl TimeOfDay {
    /// Iterate over every selectable time in ascending order.
    pub fn all() -> impl Iterator<Item = TimeOfDay> {
        (0..SLOTS).map(TimeOfDay)
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0 / 2)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0 % 2) * 30
    }

    /// Combine with a calendar date into a naive timestamp, seconds fixed at zero.
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        NaiveDateTime::new(date, self.into())
    }
}

impl From<TimeOfDay> for NaiveTime {
    fn from(t: TimeOfDay) -> Self {
        // Every slot is a valid wall clock time.
        NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTimeOfDayError(s.into());
        let (hh, mm) = s.trim().split_once(':').ok_or_else(err)?;
        if hh.len() != 2 || !hh.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let hour: u8 = hh.parse().map_err(|_| err())?;
        let half = match mm {
            "00" => 0,
            "30" => 1,
            _ => return Err(err()),
        };
        if hour >= SLOTS / 2 {
            return Err(err());
        }
        Ok(TimeOfDay(hour * 2 + half))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}
