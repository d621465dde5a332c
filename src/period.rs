//! Date-range filter normalization and comparison-window derivation.
//!
//! A user-supplied period can be missing, a single day, or a (possibly
//! partial) pair of days. [`Period::normalize`] resolves any of these into a
//! canonical inclusive `[start, end]` range against the dataset bounds, and
//! [`Period::comparison_window`] derives the equal-length range right before it.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config;
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// PeriodInput
// ---------------------------------------------------------------------------

/// The shapes a period filter can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodInput {
    /// No filter at all: the whole dataset.
    Unbounded,
    /// A single day, used as both start and end.
    Single(NaiveDate),
    /// Up to two days in the order given. Missing ends fall back to the
    /// dataset bounds.
    Range(Option<NaiveDate>, Option<NaiveDate>),
}

impl PeriodInput {
    /// Build an input from a sequence of optional dates.
    ///
    /// Nulls are skipped and only the first two remaining dates are kept:
    /// two or more become a range, one becomes a single day, none means
    /// unbounded.
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = Option<NaiveDate>>,
    {
        let mut values = dates.into_iter().flatten();
        match (values.next(), values.next()) {
            (Some(start), Some(end)) => PeriodInput::Range(Some(start), Some(end)),
            (Some(day), None) => PeriodInput::Single(day),
            _ => PeriodInput::Unbounded,
        }
    }

    /// The same input with every date moved inside `[min, max]`, the way a
    /// date picker bounded to the data accepts it. Requires `min <= max`.
    pub fn clamped(self, min: NaiveDate, max: NaiveDate) -> Self {
        let clamp = |day: NaiveDate| day.clamp(min, max);
        match self {
            PeriodInput::Unbounded => PeriodInput::Unbounded,
            PeriodInput::Single(day) => PeriodInput::Single(clamp(day)),
            PeriodInput::Range(start, end) => PeriodInput::Range(start.map(clamp), end.map(clamp)),
        }
    }
}

impl FromStr for PeriodInput {
    type Err = DashboardError;

    /// Accepts `all`, `YYYY-MM-DD` and `START..END`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PeriodInput::Unbounded);
        }
        match s.split_once("..") {
            Some((start, end)) => Ok(PeriodInput::Range(
                Some(parse_date(start.trim())?),
                Some(parse_date(end.trim())?),
            )),
            None => Ok(PeriodInput::Single(parse_date(s)?)),
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, DashboardError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        DashboardError::InvalidArgument(format!("invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
    })
}

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// An inclusive date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Resolve a period input against the dataset's observed `[min, max]`.
    ///
    /// Total over its input: missing ends are filled from the bounds and a
    /// reversed pair is swapped, so the result is never inverted.
    pub fn normalize(input: &PeriodInput, min: NaiveDate, max: NaiveDate) -> Self {
        let (start, end) = match *input {
            PeriodInput::Unbounded => (Some(min), Some(max)),
            PeriodInput::Single(day) => (Some(day), Some(day)),
            PeriodInput::Range(Some(start), Some(end)) => (Some(start), Some(end)),
            PeriodInput::Range(Some(day), None) | PeriodInput::Range(None, Some(day)) => {
                (Some(day), Some(day))
            }
            PeriodInput::Range(None, None) => (None, None),
        };

        let start = start.unwrap_or(min);
        let end = end.unwrap_or(max);

        if start > end {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// The selection shown before the user touches the date filter: the last
    /// [`config::DEFAULT_LOOKBACK_DAYS`] days of data, never before `min`.
    pub fn default_for_bounds(min: NaiveDate, max: NaiveDate) -> Self {
        let lookback = max - Duration::days(config::DEFAULT_LOOKBACK_DAYS);
        Self::normalize(&PeriodInput::Range(Some(lookback.max(min)), Some(max)), min, max)
    }

    /// Number of days in the range, both ends included.
    pub fn length_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The equal-length range ending the day before `start`.
    ///
    /// Not clamped to the dataset; a window outside the data simply
    /// aggregates to nothing.
    pub fn comparison_window(&self) -> Self {
        let prev_end = self.start - Duration::days(1);
        let prev_start = prev_end - Duration::days(self.length_days() - 1);
        Self {
            start: prev_start,
            end: prev_end,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}
