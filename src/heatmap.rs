//! Year-scoped calendar heatmap of goal outcomes.
//!
//! The grid runs from the Sunday on or before Jan 1 to the Saturday on or
//! after Dec 31, one column per week. Days outside the year are `None` so
//! they render blank instead of as days without activity.

use crate::dates::local_date;
use crate::models::{Goal, Outcome};
use chrono::{Datelike, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapCell {
    /// `YYYY-MM-DD`
    pub key: String,
    /// Short label such as `Jan 5`.
    pub label: String,
    pub pass_count: u32,
    pub fail_count: u32,
}

impl HeatmapCell {
    fn new(date: NaiveDate, pass_count: u32, fail_count: u32) -> Self {
        Self {
            key: date.format("%Y-%m-%d").to_string(),
            label: date.format("%b %-d").to_string(),
            pass_count,
            fail_count,
        }
    }

    pub fn total(&self) -> u32 {
        self.pass_count.saturating_add(self.fail_count)
    }

    /// Share of passed goals, 0 for a day without activity.
    pub fn pass_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => f64::from(self.pass_count) / f64::from(total),
        }
    }

    /// Colour strength relative to the busiest day of the grid.
    pub fn intensity(&self, max_total: u32) -> f64 {
        match self.total() {
            0 => 0.0,
            total => (0.35 + f64::from(total) / f64::from(max_total.max(1))).min(1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLabel {
    /// Week column the label sits above.
    pub index: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct DailyGrid {
    pub weeks: Vec<Vec<Option<HeatmapCell>>>,
    pub month_labels: Vec<MonthLabel>,
    pub max_total: u32,
}

/// First and last day covered by the grid for `year`: a Sunday and a Saturday.
pub fn grid_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let year_start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let year_end = NaiveDate::from_ymd_opt(year, 12, 31)?;
    let lead = i64::from(year_start.weekday().num_days_from_sunday());
    let tail = 6 - i64::from(year_end.weekday().num_days_from_sunday());
    let start = year_start.checked_sub_signed(Duration::days(lead))?;
    let end = year_end.checked_add_signed(Duration::days(tail))?;
    Some((start, end))
}

/// Buckets scored goals by the local calendar day of `created_at` in `tz`.
///
/// Unscored goals, goals from other years and goals whose `created_at` does
/// not parse are skipped. A year chrono cannot represent yields an empty grid.
pub fn build_daily_grid(goals: &[Goal], year: i32, tz: Tz) -> DailyGrid {
    let Some((grid_start, grid_end)) = grid_bounds(year) else {
        return DailyGrid::default();
    };

    let mut counts: HashMap<NaiveDate, (u32, u32)> = HashMap::new();
    for goal in goals {
        let Some(outcome) = goal.outcome else {
            continue;
        };
        let Some(date) = local_date(&goal.created_at, tz) else {
            continue;
        };
        if date.year() != year {
            continue;
        }
        let entry = counts.entry(date).or_default();
        match outcome {
            Outcome::Passed => entry.0 = entry.0.saturating_add(1),
            Outcome::Failed => entry.1 = entry.1.saturating_add(1),
        }
    }

    let mut weeks: Vec<Vec<Option<HeatmapCell>>> = Vec::new();
    let mut max_total = 0u32;
    for (offset, date) in grid_start
        .iter_days()
        .take_while(|date| *date <= grid_end)
        .enumerate()
    {
        if offset % 7 == 0 {
            weeks.push(Vec::with_capacity(7));
        }
        let slot = if date.year() == year {
            let (pass, fail) = counts.get(&date).copied().unwrap_or_default();
            let cell = HeatmapCell::new(date, pass, fail);
            max_total = max_total.max(cell.total());
            Some(cell)
        } else {
            None
        };
        if let Some(week) = weeks.last_mut() {
            week.push(slot);
        }
    }

    let month_labels = month_labels(year, grid_start, weeks.len());

    DailyGrid {
        weeks,
        month_labels,
        max_total,
    }
}

fn month_labels(year: i32, grid_start: NaiveDate, week_count: usize) -> Vec<MonthLabel> {
    let mut labels = Vec::with_capacity(12);
    for month in 1..=12 {
        let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
            continue;
        };
        let Some(month_end) = month_last_day(month_start) else {
            continue;
        };
        let found = (0..week_count).find(|&index| {
            let week_start = grid_start + Duration::weeks(index as i64);
            let week_end = week_start + Duration::days(6);
            week_start <= month_end && week_end >= month_start
        });
        if let Some(index) = found {
            labels.push(MonthLabel {
                index,
                label: month_start.format("%b").to_string(),
            });
        }
    }
    labels
}

fn month_last_day(month_start: NaiveDate) -> Option<NaiveDate> {
    let next = if month_start.month() == 12 {
        NaiveDate::from_ymd_opt(month_start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(month_start.year(), month_start.month() + 1, 1)
    };
    next.and_then(|date| date.pred_opt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn goal(created_at: &str, outcome: Option<Outcome>) -> Goal {
        Goal {
            id: created_at.to_string(),
            title: "goal".to_string(),
            created_at: created_at.to_string(),
            end_at: None,
            outcome,
            categories: Vec::new(),
            category_ids: Vec::new(),
        }
    }

    fn cell<'a>(grid: &'a DailyGrid, key: &str) -> Option<&'a HeatmapCell> {
        grid.weeks
            .iter()
            .flatten()
            .flatten()
            .find(|cell| cell.key == key)
    }

    #[test]
    fn grid_spans_whole_weeks() {
        for year in 1999..=2030 {
            let (start, end) = grid_bounds(year).unwrap();
            assert_eq!(start.weekday(), Weekday::Sun);
            assert_eq!(end.weekday(), Weekday::Sat);

            let grid = build_daily_grid(&[], year, Tz::UTC);
            let days = (end - start).num_days() + 1;
            assert_eq!(grid.weeks.len() as i64 * 7, days);
            assert!(grid.weeks.iter().all(|week| week.len() == 7));

            assert_eq!(grid.month_labels.len(), 12, "year {year}");
            assert_eq!(grid.month_labels[0].index, 0);
            assert!(
                grid.month_labels
                    .windows(2)
                    .all(|pair| pair[0].index < pair[1].index),
                "year {year}"
            );
        }
    }

    #[test]
    fn empty_leap_year() {
        let grid = build_daily_grid(&[], 2024, Tz::UTC);
        assert_eq!(grid.max_total, 0);
        assert_eq!(grid.month_labels.len(), 12);

        let real: Vec<&HeatmapCell> = grid.weeks.iter().flatten().flatten().collect();
        assert_eq!(real.len(), 366);
        assert!(real.iter().all(|cell| cell.total() == 0));

        let leap_day = cell(&grid, "2024-02-29").unwrap();
        assert_eq!(leap_day.label, "Feb 29");

        // Jan 1 2024 is a Monday, so one leading placeholder.
        assert_eq!(grid.weeks[0][0], None);
        assert_eq!(grid.weeks[0][1].as_ref().unwrap().key, "2024-01-01");
    }

    #[test]
    fn sunday_new_year_has_no_leading_placeholders() {
        // Jan 1 2023 is a Sunday.
        let grid = build_daily_grid(&[], 2023, Tz::UTC);
        assert_eq!(grid.weeks[0][0].as_ref().unwrap().key, "2023-01-01");
        assert_eq!(grid_bounds(2023).unwrap().0, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    }

    #[test]
    fn same_day_outcomes_share_a_cell() {
        let goals = vec![
            goal("2024-03-15T10:00:00Z", Some(Outcome::Passed)),
            goal("2024-03-15T14:00:00Z", Some(Outcome::Failed)),
        ];
        let grid = build_daily_grid(&goals, 2024, Tz::UTC);
        let day = cell(&grid, "2024-03-15").unwrap();
        assert_eq!(day.pass_count, 1);
        assert_eq!(day.fail_count, 1);
        assert_eq!(day.label, "Mar 15");
        assert_eq!(grid.max_total, 2);
    }

    #[test]
    fn skips_unscored_malformed_and_other_years() {
        let goals = vec![
            goal("2024-03-15T10:00:00Z", None),
            goal("yesterday", Some(Outcome::Passed)),
            goal("2023-12-31T12:00:00Z", Some(Outcome::Passed)),
            goal("2025-01-01T00:00:00Z", Some(Outcome::Failed)),
        ];
        let grid = build_daily_grid(&goals, 2024, Tz::UTC);
        assert_eq!(grid.max_total, 0);
        assert!(grid.weeks.iter().flatten().flatten().all(|cell| cell.total() == 0));
        // Dec 31 2023 sits in the first week of the 2024 grid, masked.
        assert_eq!(grid_bounds(2024).unwrap().0, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert!(cell(&grid, "2023-12-31").is_none());
    }

    #[test]
    fn out_of_year_days_are_placeholders() {
        let grid = build_daily_grid(&[], 2025, Tz::UTC);
        let (start, _) = grid_bounds(2025).unwrap();
        for (week_index, week) in grid.weeks.iter().enumerate() {
            for (day_index, slot) in week.iter().enumerate() {
                let date = start + Duration::days((week_index * 7 + day_index) as i64);
                assert_eq!(slot.is_some(), date.year() == 2025, "{date}");
            }
        }
    }

    #[test]
    fn buckets_by_local_day() {
        let tz: Tz = "America/Los_Angeles".parse().unwrap();
        let goals = vec![
            goal("2024-07-04T05:00:00Z", Some(Outcome::Passed)),
            // Still Dec 31 2023 in Los Angeles.
            goal("2024-01-01T07:00:00Z", Some(Outcome::Passed)),
        ];
        let grid = build_daily_grid(&goals, 2024, tz);
        assert_eq!(cell(&grid, "2024-07-03").unwrap().pass_count, 1);
        assert_eq!(cell(&grid, "2024-07-04").unwrap().pass_count, 0);
        assert_eq!(cell(&grid, "2024-01-01").unwrap().pass_count, 0);
        assert_eq!(grid.max_total, 1);
    }

    #[test]
    fn month_labels_follow_overlapping_weeks() {
        let grid = build_daily_grid(&[], 2024, Tz::UTC);
        let names: Vec<&str> = grid.month_labels.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(
            names,
            ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"]
        );
        assert!(grid.month_labels.windows(2).all(|pair| pair[0].index < pair[1].index));
        assert_eq!(grid.month_labels[0].index, 0);
        // Week 4 of the 2024 grid starts Sun Jan 28 and runs into February.
        assert_eq!(grid.month_labels[1].index, 4);
        // March 2024 starts on a Friday in the week of Sun Feb 25.
        assert_eq!(grid.month_labels[2].index, 8);
    }

    #[test]
    fn intensity_contract() {
        let day = HeatmapCell::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), 3, 1);
        assert_eq!(day.total(), 4);
        assert_eq!(day.pass_ratio(), 0.75);
        assert_eq!(day.intensity(4), 1.0);
        assert!((day.intensity(10) - 0.75).abs() < 1e-9);

        let quiet = HeatmapCell::new(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(), 0, 0);
        assert_eq!(quiet.pass_ratio(), 0.0);
        assert_eq!(quiet.intensity(0), 0.0);
    }

    #[test]
    fn rebuilding_is_stable() {
        let goals = vec![
            goal("2024-03-15T10:00:00Z", Some(Outcome::Passed)),
            goal("2024-11-02T10:00:00Z", Some(Outcome::Failed)),
        ];
        assert_eq!(
            build_daily_grid(&goals, 2024, Tz::UTC),
            build_daily_grid(&goals, 2024, Tz::UTC)
        );
    }

    #[test]
    fn unrepresentable_year_is_empty() {
        let grid = build_daily_grid(&[], i32::MAX, Tz::UTC);
        assert!(grid.weeks.is_empty());
        assert!(grid.month_labels.is_empty());
    }
}
