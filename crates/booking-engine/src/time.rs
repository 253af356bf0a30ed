//! Time-of-day and date normalization.
//!
//! Every clock value entering the engine passes through [`TimeOfDay::parse`],
//! and every calendar date through [`parse_date`]. Both are strict: input that
//! cannot be read is a [`ParseError`], never a substituted default.
//!
//! Accepted clock forms:
//!
//! - 24-hour: `"14:00"`, `"14:00:00"`, `"14:00:00.000000"`, `"9:00"`
//! - 12-hour: `"2:00 PM"`, `"02:00pm"`, `"12:30 AM"`

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A wall-clock time, stored as minutes since midnight.
///
/// Seconds are dropped during parsing; the slot grid works in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Build from an hour (0-23) and minute (0-59).
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, ParseError> {
        if hour > 23 || minute > 59 {
            return Err(ParseError::Time(format!("{hour}:{minute:02}")));
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    /// Whole hour for compile-time tables. Callers pass 0-23.
    pub(crate) const fn on_the_hour(hour: u16) -> Self {
        Self(hour * 60)
    }

    /// Build from minutes since midnight (0..1440).
    pub fn from_minutes(minutes: u16) -> Result<Self, ParseError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(ParseError::Time(minutes.to_string()));
        }
        Ok(Self(minutes))
    }

    /// Parse any of the accepted 24-hour or 12-hour forms.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Time(input.to_string()));
        }

        let upper = trimmed.to_ascii_uppercase();
        let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
            (rest.trim_end(), Some(Meridiem::Am))
        } else if let Some(rest) = upper.strip_suffix("PM") {
            (rest.trim_end(), Some(Meridiem::Pm))
        } else {
            (upper.as_str(), None)
        };

        let time = parse_clock(clock).ok_or_else(|| ParseError::Time(input.to_string()))?;

        match meridiem {
            None => Self::from_hm(time.hour(), time.minute()),
            Some(m) => {
                // 12-hour clocks run 1..=12; "0:30 PM" and "13:00 PM" are garbage.
                let hour = time.hour();
                if hour == 0 || hour > 12 {
                    return Err(ParseError::Time(input.to_string()));
                }
                let hour24 = match (m, hour) {
                    (Meridiem::Am, 12) => 0,
                    (Meridiem::Am, h) => h,
                    (Meridiem::Pm, 12) => 12,
                    (Meridiem::Pm, h) => h + 12,
                };
                Self::from_hm(hour24, time.minute())
            }
        }
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0 / 60)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0 % 60)
    }

    /// End of a window starting here. May run past midnight, hence `u32`.
    pub fn end_after(self, duration_minutes: u32) -> u32 {
        u32::from(self.0) + duration_minutes
    }

    /// Render as a 12-hour clock, e.g. `"2:00 PM"`.
    pub fn to_12_hour(self) -> String {
        let hour = self.hour();
        let suffix = if hour >= 12 { "PM" } else { "AM" };
        let display = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", display, self.minute(), suffix)
    }
}

#[derive(Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

/// Parse `H:MM`, `HH:MM`, `HH:MM:SS` or `HH:MM:SS.ffffff`.
fn parse_clock(clock: &str) -> Option<NaiveTime> {
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(clock, fmt).ok())
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parse an ISO date, tolerating a trailing time component
/// (`"2025-10-30"`, `"2025-10-30T00:00:00"`, `"2025-10-30 08:15:00"`).
pub fn parse_date(input: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = input.trim();
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| ParseError::Date(input.to_string()))
}
