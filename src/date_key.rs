//! Canonical keys for calendar days

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// The `YYYY-MM-DD` form of a calendar day.
///
/// Tasks are grouped by this key, and two dates are "the same day" iff their keys are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey {
    day: NaiveDate,
}

impl DateKey {
    pub fn date(&self) -> NaiveDate {
        self.day
    }
}

impl From<NaiveDate> for DateKey {
    fn from(day: NaiveDate) -> Self {
        Self { day }
    }
}

impl From<&NaiveDate> for DateKey {
    fn from(day: &NaiveDate) -> Self {
        Self { day: *day }
    }
}

/// Returned when a string is not a canonical date key
#[derive(Clone, Debug, PartialEq)]
pub struct ParseDateKeyError {
    input: String,
    /// Set when the input is not a date at all
    cause: Option<chrono::ParseError>,
}

impl Display for ParseDateKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match &self.cause {
            Some(cause) => write!(f, "{:?} is not a date: {}", self.input, cause),
            None => write!(f, "{:?} is not in YYYY-MM-DD form", self.input),
        }
    }
}

impl Error for ParseDateKeyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_ref().map(|cause| cause as &(dyn Error + 'static))
    }
}

impl FromStr for DateKey {
    type Err = ParseDateKeyError;

    /// Only the canonical form is accepted (e.g. `2024-03-15`, not `2024-3-15`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let day = match NaiveDate::parse_from_str(s, DATE_KEY_FORMAT) {
            Err(cause) => return Err(ParseDateKeyError { input: s.to_string(), cause: Some(cause) }),
            Ok(day) => day,
        };
        // chrono also accepts non-padded fields
        if day.format(DATE_KEY_FORMAT).to_string() != s {
            return Err(ParseDateKeyError { input: s.to_string(), cause: None });
        }
        Ok(Self { day })
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.day.format(DATE_KEY_FORMAT))
    }
}

/// Used to support serde
impl Serialize for DateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D>(deserializer: D) -> Result<DateKey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
