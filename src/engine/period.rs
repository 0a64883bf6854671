use std::{fmt, sync::LazyLock};

use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// Playlists this tool may create or modify are named exactly `YYYY.MM`.
static MANAGED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}\.[0-9]{2}$").expect("valid playlist name pattern"));

static ADDED_AT_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})").expect("valid added_at pattern"));

/// Month label in `YYYY.MM` form, used both as bucket key and playlist name.
///
/// Lexical order of the inner string is chronological order, so the derived
/// `Ord` is the one the cutoff comparison relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey(String);

impl PeriodKey {
    /// Accepts a playlist name if, and only if, it follows the managed naming
    /// convention.
    pub fn parse(name: &str) -> Option<Self> {
        MANAGED_NAME
            .is_match(name)
            .then(|| PeriodKey(name.to_string()))
    }

    /// Derives the key from a timestamp such as `2024-01-05T12:34:56Z` or
    /// `2024-01-05`.
    pub fn from_added_at(added_at: &str) -> Option<Self> {
        let caps = ADDED_AT_MONTH.captures(added_at)?;
        Some(PeriodKey(format!("{}.{}", &caps[1], &caps[2])))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_year_month(date.year(), date.month())
    }

    fn from_year_month(year: i32, month: u32) -> Self {
        PeriodKey(format!("{year:04}.{month:02}"))
    }

    /// The key `months` calendar months before `date`'s month.
    pub fn months_before(date: NaiveDate, months: u32) -> Self {
        let index = i64::from(date.year()) * 12 + i64::from(date.month0()) - i64::from(months);
        let year = index.div_euclid(12) as i32;
        let month = index.rem_euclid(12) as u32 + 1;
        Self::from_year_month(year, month)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How far back into the liked history a run looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchWindow {
    /// Scan the entire history.
    Unbounded,
    /// The current month plus `months - 1` before it.
    Months(u32),
}

impl SearchWindow {
    /// `0` means unbounded.
    pub fn from_months(months: u32) -> Self {
        match months {
            0 => SearchWindow::Unbounded,
            n => SearchWindow::Months(n),
        }
    }

    /// Oldest period still inside the window, relative to `today`.
    pub fn cutoff(&self, today: NaiveDate) -> Option<PeriodKey> {
        match self {
            SearchWindow::Unbounded => None,
            SearchWindow::Months(n) => Some(PeriodKey::months_before(today, n.saturating_sub(1))),
        }
    }
}

impl fmt::Display for SearchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchWindow::Unbounded => f.write_str("all"),
            SearchWindow::Months(n) => write!(f, "{n} month(s)"),
        }
    }
}
