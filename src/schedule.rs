//! Posting-date enumeration
//!
//! Turns an inclusive date range and a weekday distribution pattern into the
//! ordered list of dates that receive content. Pure; no I/O.

use crate::error::ApiError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar date selected for publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingDate(NaiveDate);

impl PostingDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// ISO `YYYY-MM-DD` form, as sent to the oracle.
    pub fn iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl From<NaiveDate> for PostingDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for PostingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iso())
    }
}

/// Parse an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid date '{}': {}", value, e)))
}

/// Set of weekdays eligible to receive a posting date.
///
/// Stored as a bitmask indexed by days from Monday; serialized as a list of
/// full weekday names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct DistributionPattern {
    mask: u8,
}

/// Weekday sets offered for each supported posts-per-week frequency.
const FREQUENCY_PRESETS: &[(u8, &[Weekday])] = &[
    (1, &[Weekday::Mon]),
    (2, &[Weekday::Tue, Weekday::Fri]),
    (3, &[Weekday::Mon, Weekday::Wed, Weekday::Fri]),
    (
        5,
        &[Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
    ),
    (
        7,
        &[
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ],
    ),
];

impl DistributionPattern {
    pub fn empty() -> Self {
        Self { mask: 0 }
    }

    pub fn new<I: IntoIterator<Item = Weekday>>(days: I) -> Self {
        let mut pattern = Self::empty();
        for day in days {
            pattern.insert(day);
        }
        pattern
    }

    /// Parse weekday names ("Monday", "mon", "MONDAY", ...).
    pub fn from_names<I, S>(names: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pattern = Self::empty();
        for name in names {
            pattern.insert(parse_weekday(name.as_ref())?);
        }
        Ok(pattern)
    }

    /// Preset pattern for a posts-per-week frequency (1, 2, 3, 5 or 7).
    pub fn for_frequency(posts_per_week: u8) -> Result<Self, ApiError> {
        FREQUENCY_PRESETS
            .iter()
            .find(|(freq, _)| *freq == posts_per_week)
            .map(|(_, days)| Self::new(days.iter().copied()))
            .ok_or_else(|| {
                ApiError::InvalidPattern(format!(
                    "Unsupported posting frequency {} (must be one of 1, 2, 3, 5, 7)",
                    posts_per_week
                ))
            })
    }

    pub fn insert(&mut self, day: Weekday) {
        self.mask |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.mask & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Member weekdays, Monday first.
    pub fn weekdays(&self) -> Vec<Weekday> {
        let mut day = Weekday::Mon;
        let mut out = Vec::with_capacity(self.len());
        for _ in 0..7 {
            if self.contains(day) {
                out.push(day);
            }
            day = day.succ();
        }
        out
    }
}

impl TryFrom<Vec<String>> for DistributionPattern {
    type Error = ApiError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_names(names)
    }
}

impl From<DistributionPattern> for Vec<String> {
    fn from(pattern: DistributionPattern) -> Self {
        pattern
            .weekdays()
            .into_iter()
            .map(|day| weekday_name(day).to_string())
            .collect()
    }
}

impl fmt::Display for DistributionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.weekdays().into_iter().map(weekday_name).collect();
        write!(f, "{}", names.join(", "))
    }
}

pub fn parse_weekday(name: &str) -> Result<Weekday, ApiError> {
    name.trim()
        .parse::<Weekday>()
        .map_err(|_| ApiError::InvalidPattern(format!("Unknown weekday name: '{}'", name)))
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Every date in `[start, end]` whose weekday is in `pattern`, ascending.
pub fn enumerate_posting_dates(
    start: NaiveDate,
    end: NaiveDate,
    pattern: &DistributionPattern,
) -> Result<Vec<PostingDate>, ApiError> {
    if end < start {
        return Err(ApiError::InvalidRange { start, end });
    }

    let mut dates = Vec::new();
    if pattern.is_empty() {
        return Ok(dates);
    }

    let mut day = start;
    loop {
        if pattern.contains(day.weekday()) {
            dates.push(PostingDate(day));
        }
        if day == end {
            break;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    Ok(dates)
}
