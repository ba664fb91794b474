//! Dates and times attached to deadlines and events
//!
//! Users type dates free-form. Ren keeps exactly what was typed, since that
//! is what goes into the data file, and additionally tries to recognise a
//! few common layouts so they can be shown in a friendlier way and looked
//! up by day.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::RenError;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H%M",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

const DATE_DISPLAY: &str = "%b %-d %Y";
const DATE_TIME_DISPLAY: &str = "%b %-d %Y %H:%M";

/// A recognised point in time, either a whole day or a specific minute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Moment {
    /// Recognises `input` as one of the supported layouts
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        DATE_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
            .map(Moment::DateTime)
            .or_else(|| parse_date_only(input).map(Moment::Date))
    }

    /// The calendar day this moment falls on
    pub fn date(&self) -> NaiveDate {
        match self {
            Moment::Date(date) => *date,
            Moment::DateTime(date_time) => date_time.date(),
        }
    }

    /// Whether this moment is strictly earlier than `other`.
    ///
    /// A whole day is only earlier than another moment on a previous day.
    pub fn is_before(&self, other: &Moment) -> bool {
        match (self, other) {
            (Moment::DateTime(a), Moment::DateTime(b)) => a < b,
            _ => self.date() < other.date(),
        }
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Moment::Date(date) => write!(f, "{}", date.format(DATE_DISPLAY)),
            Moment::DateTime(date_time) => write!(f, "{}", date_time.format(DATE_TIME_DISPLAY)),
        }
    }
}

/// A date/time string as typed by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct When {
    raw: String,
    moment: Option<Moment>,
}

impl When {
    /// Creates a new value from user input, recognising it if possible
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into().trim().to_string();
        let moment = Moment::parse(&raw);
        Self { raw, moment }
    }

    /// The text exactly as typed
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The recognised moment, if the text matched a known layout
    pub fn moment(&self) -> Option<&Moment> {
        self.moment.as_ref()
    }

    /// The recognised calendar day, if any
    pub fn date(&self) -> Option<NaiveDate> {
        self.moment.map(|m| m.date())
    }
}

impl From<String> for When {
    fn from(raw: String) -> Self {
        When::new(raw)
    }
}

impl From<When> for String {
    fn from(when: When) -> Self {
        when.raw
    }
}

impl fmt::Display for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.moment {
            Some(moment) => fmt::Display::fmt(moment, f),
            None => f.write_str(&self.raw),
        }
    }
}

fn parse_date_only(input: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

/// Parses a calendar day, as used by the `on` command
pub fn parse_date(input: &str) -> Result<NaiveDate, RenError> {
    parse_date_only(input.trim()).ok_or_else(|| RenError::InvalidDate(input.trim().to_string()))
}
