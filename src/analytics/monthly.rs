//! Monthly practice aggregation
//!
//! Groups a month's entries by day, totals the minutes and sessions, and finds
//! the longest run of consecutive practice days. Dates are read in the offset
//! they were stored with, so an entry logged at 07:30 KST counts for that
//! Korean calendar day no matter where the aggregation runs.

use chrono::{DateTime, Datelike, Days, FixedOffset, Local, Months, NaiveDate};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::analytics::heatmap::HeatmapTier;
use crate::analytics::parse_duration;
use crate::journal::{JournalEntry, JournalError, JournalResult};

/// A calendar month being viewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewMonth {
    /// Always the 1st of the month
    first: NaiveDate,
}

impl ViewMonth {
    /// Create a month, rejecting month numbers outside 1..=12 and years
    /// outside the calendar range
    pub fn new(year: i32, month: u32) -> JournalResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or(JournalError::InvalidMonth { year, month })
    }

    fn from_date(date: NaiveDate) -> Self {
        Self {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    /// The month a timestamp falls in, using its own offset
    pub fn containing(date: &DateTime<FixedOffset>) -> Self {
        Self::from_date(date.date_naive())
    }

    /// The current month in local time
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month() {
            2 if is_leap_year(self.year()) => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Weekday of the 1st, Sunday = 0
    pub fn first_weekday(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    pub fn contains(&self, date: &DateTime<FixedOffset>) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Month before; stays put at the start of the calendar range
    pub fn previous(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    /// Month after; stays put at the end of the calendar range
    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

impl std::fmt::Display for ViewMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Serialized as "YYYY-MM"
impl Serialize for ViewMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for ViewMonth {
    type Err = JournalError;

    /// Parse "YYYY-MM"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = JournalError::InvalidMonth { year: 0, month: 0 };
        let (year, month) = s.trim().split_once('-').ok_or(invalid.clone())?;
        let year: i32 = year.parse().map_err(|_| invalid.clone())?;
        let month: u32 = month.parse().map_err(|_| invalid)?;
        Self::new(year, month)
    }
}

/// Entries practiced on one day of the month
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayBucket<'a> {
    pub entries: Vec<&'a JournalEntry>,
    pub total_minutes: u32,
}

/// Heatmap cell for one day
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DayHeat {
    pub day: u32,
    pub minutes: u32,
    pub sessions: usize,
    pub tier: HeatmapTier,
}

/// Aggregated practice for a month
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyStats<'a> {
    pub month: ViewMonth,
    pub total_minutes: u32,
    /// Every entry counts, including several on the same day
    pub total_sessions: usize,
    pub longest_streak: u32,
    /// Day of month (1-based) → bucket; days without entries are absent
    pub entries_by_day: BTreeMap<u32, DayBucket<'a>>,
}

impl<'a> MonthlyStats<'a> {
    /// Bucket for a single day, if anything was practiced
    pub fn day_detail(&self, day: u32) -> Option<&DayBucket<'a>> {
        self.entries_by_day.get(&day)
    }

    /// One heatmap cell per day of the month
    pub fn heatmap(&self) -> Vec<DayHeat> {
        (1..=self.month.days_in_month())
            .map(|day| {
                let (minutes, sessions) = self
                    .entries_by_day
                    .get(&day)
                    .map(|bucket| (bucket.total_minutes, bucket.entries.len()))
                    .unwrap_or((0, 0));
                DayHeat {
                    day,
                    minutes,
                    sessions,
                    tier: HeatmapTier::for_minutes(minutes),
                }
            })
            .collect()
    }
}

/// Aggregate the entries that fall in `month`
pub fn aggregate_month(entries: &[JournalEntry], month: ViewMonth) -> MonthlyStats<'_> {
    let mut entries_by_day: BTreeMap<u32, DayBucket<'_>> = BTreeMap::new();
    let mut total_minutes = 0u32;
    let mut total_sessions = 0usize;

    for entry in entries.iter().filter(|e| month.contains(&e.date)) {
        let minutes = parse_duration(entry.duration.as_deref());
        let bucket = entries_by_day
            .entry(entry.date.day())
            .or_insert_with(|| DayBucket {
                entries: Vec::new(),
                total_minutes: 0,
            });
        bucket.entries.push(entry);
        bucket.total_minutes = bucket.total_minutes.saturating_add(minutes);
        total_minutes = total_minutes.saturating_add(minutes);
        total_sessions += 1;
    }

    let longest_streak = longest_streak(&entries_by_day, month.days_in_month());

    MonthlyStats {
        month,
        total_minutes,
        total_sessions,
        longest_streak,
        entries_by_day,
    }
}

fn longest_streak(entries_by_day: &BTreeMap<u32, DayBucket<'_>>, days_in_month: u32) -> u32 {
    let mut longest = 0;
    let mut current = 0;
    for day in 1..=days_in_month {
        if entries_by_day.contains_key(&day) {
            current += 1;
        } else {
            longest = longest.max(current);
            current = 0;
        }
    }
    longest.max(current)
}

/// Calendar cells for a month: blanks up to the weekday of the 1st
/// (weeks start on Sunday), then day numbers. No trailing padding.
pub fn calendar_grid(month: ViewMonth) -> Vec<Option<u32>> {
    let leading = month.first_weekday() as usize;
    std::iter::repeat(None)
        .take(leading)
        .chain((1..=month.days_in_month()).map(Some))
        .collect()
}
