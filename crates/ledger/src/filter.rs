//! Date filtering over a ledger snapshot.
//!
//! Everything here is pure: the reference date is always passed in, so the
//! same snapshot and selector always give the same subset.

use std::{fmt, str::FromStr};

use chrono::{Days, Months, NaiveDate};
use serde::Serialize;

use crate::{ExpenseEntry, LedgerError, ResultLedger};

/// Inclusive date interval `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ResultLedger<Self> {
        if start > end {
            return Err(LedgerError::Validation(format!(
                "invalid range: {start} is after {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Predefined rolling windows anchored to a reference date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    #[default]
    Today,
    Yesterday,
    Week,
    Month,
    Year,
}

impl Window {
    /// Every window, in the order a selector shows them.
    pub const ALL: [Window; 5] = [
        Window::Today,
        Window::Yesterday,
        Window::Week,
        Window::Month,
        Window::Year,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Year => "Year",
        }
    }

    /// The dates covered by this window when `today` is the reference date.
    ///
    /// Calendar arithmetic clamps to the last valid day of the month, so the
    /// month before March 31st starts on February 28th (or 29th).
    pub fn range(self, today: NaiveDate) -> DateRange {
        let back = |date: Option<NaiveDate>| date.unwrap_or(NaiveDate::MIN);
        match self {
            Self::Today => DateRange::day(today),
            Self::Yesterday => DateRange::day(back(today.checked_sub_days(Days::new(1)))),
            Self::Week => DateRange {
                start: back(today.checked_sub_days(Days::new(7))),
                end: today,
            },
            Self::Month => DateRange {
                start: back(today.checked_sub_months(Months::new(1))),
                end: today,
            },
            Self::Year => DateRange {
                start: back(today.checked_sub_months(Months::new(12))),
                end: today,
            },
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Window {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Window::ALL
            .into_iter()
            .find(|window| window.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| LedgerError::Validation(format!("unknown window: {value}")))
    }
}

/// Entries dated exactly `date`, in snapshot order.
pub fn filter_by_exact_date(entries: &[ExpenseEntry], date: NaiveDate) -> Vec<ExpenseEntry> {
    filter_by_date_range(entries, DateRange::day(date))
}

/// Entries dated inside `range` (bounds included), in snapshot order.
pub fn filter_by_date_range(entries: &[ExpenseEntry], range: DateRange) -> Vec<ExpenseEntry> {
    entries
        .iter()
        .filter(|entry| range.contains(entry.entry_date))
        .cloned()
        .collect()
}

pub fn select_window(
    entries: &[ExpenseEntry],
    window: Window,
    today: NaiveDate,
) -> Vec<ExpenseEntry> {
    filter_by_date_range(entries, window.range(today))
}
