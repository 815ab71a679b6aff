//! Calendar Bucketizer — turns the sparse `epochSeconds → count` maps the
//! coding-platform stat blocks carry into a Sunday-aligned heatmap grid and
//! a weekly activity series.
//!
//! The grid covers the trailing 365 days ending "today", rolled back to the
//! preceding Sunday so every row is a full week. The weekly series is
//! computed over the *entire* source map, independent of the grid's
//! trailing-window truncation — accounts with more than a year of history
//! chart all of it.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// One cell of the heatmap grid. `date: None` marks a padding cell used to
/// keep the final week row at exactly 7 cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: Option<NaiveDate>,
    pub count: i64,
}

/// A Sunday-first row of exactly 7 cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekRow {
    pub days: Vec<DayCell>,
}

/// The rendered heatmap: week rows in chronological order plus the highest
/// single-day count in the window, used for color-intensity scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub weeks: Vec<WeekRow>,
    pub max_count: i64,
}

/// One point of the weekly activity series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTotal {
    pub week_start: NaiveDate,
    pub total: i64,
}

const WINDOW_DAYS: i64 = 365;

/// Builds the heatmap for the 365 days ending `today`.
///
/// Keys that fail to parse as epoch seconds, or that fall outside the
/// representable timestamp range, are skipped — sparse or partial upstream
/// data is expected, never an error.
pub fn build_heatmap(source: &HashMap<String, i64>, today: NaiveDate) -> Heatmap {
    let days = day_counts(source);
    if days.is_empty() {
        return Heatmap {
            weeks: Vec::new(),
            max_count: 0,
        };
    }

    let end = today;
    let start = end - Duration::days(WINDOW_DAYS - 1);
    // Roll back to the most recent Sunday on/before the window start.
    let start = start - Duration::days(i64::from(start.weekday().num_days_from_sunday()));

    let mut cells = Vec::new();
    let mut max_count = 0i64;
    let mut day = start;
    while day <= end {
        let count = days.get(&day).copied().unwrap_or(0);
        max_count = max_count.max(count);
        cells.push(DayCell {
            date: Some(day),
            count,
        });
        day += Duration::days(1);
    }

    let mut weeks: Vec<WeekRow> = cells
        .chunks(7)
        .map(|chunk| WeekRow {
            days: chunk.to_vec(),
        })
        .collect();

    if let Some(last) = weeks.last_mut() {
        while last.days.len() < 7 {
            last.days.push(DayCell {
                date: None,
                count: 0,
            });
        }
    }

    Heatmap { weeks, max_count }
}

/// Convenience wrapper using the local calendar date as "today".
pub fn build_heatmap_local(source: &HashMap<String, i64>) -> Heatmap {
    build_heatmap(source, Local::now().date_naive())
}

/// Sums counts per Sunday-aligned week over the whole source map, sorted
/// ascending by week start.
pub fn weekly_totals(source: &HashMap<String, i64>) -> Vec<WeeklyTotal> {
    let mut totals: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for (day, count) in day_counts(source) {
        let week_start = day - Duration::days(i64::from(day.weekday().num_days_from_sunday()));
        *totals.entry(week_start).or_insert(0) += count;
    }
    totals
        .into_iter()
        .map(|(week_start, total)| WeeklyTotal { week_start, total })
        .collect()
}

/// Parses the raw map into day-level counts, UTC-truncated. Two epochs that
/// collapse onto the same day keep whichever was seen last — the upstream
/// feed is one-entry-per-day, so this only matters for malformed input.
fn day_counts(source: &HashMap<String, i64>) -> BTreeMap<NaiveDate, i64> {
    let mut days = BTreeMap::new();
    for (key, &count) in source {
        let Ok(secs) = key.trim().parse::<i64>() else {
            continue;
        };
        let Some(ts) = DateTime::from_timestamp(secs, 0) else {
            continue;
        };
        days.insert(ts.date_naive(), count);
    }
    days
}
