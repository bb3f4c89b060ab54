//! Mapping a routine's schedule onto calendar dates.
//!
//! Day `n` of the schedule falls `n` calendar days after the start date.
//! Dates are plain local calendar days; no timezone conversion happens here.

use crate::routine::ScheduledDay;
use crate::{Error, Result, Routine};
use chrono::{Datelike, Days, NaiveDate};

/// Calendar date of the schedule day at `absolute_day_index`
pub fn date_for_day(start: NaiveDate, absolute_day_index: usize) -> Result<NaiveDate> {
    start
        .checked_add_days(Days::new(absolute_day_index as u64))
        .ok_or_else(|| {
            Error::invalid(format!(
                "day {} after {} is outside the supported calendar",
                absolute_day_index, start
            ))
        })
}

/// Every scheduled day paired with its date.
///
/// Stops early if a date would overflow the calendar.
pub fn dated_days(
    routine: &Routine,
    start: NaiveDate,
) -> impl Iterator<Item = (NaiveDate, ScheduledDay<'_>)> + Clone + '_ {
    routine
        .project_to_days()
        .map_while(move |day| date_for_day(start, day.absolute_day_index).ok().map(|d| (d, day)))
}

/// The routine slot scheduled on `date`, if the date is inside the horizon
pub fn day_on(routine: &Routine, start: NaiveDate, date: NaiveDate) -> Option<ScheduledDay<'_>> {
    let offset = (date - start).num_days();
    if offset < 0 {
        return None;
    }
    routine.day(offset as usize)
}

/// Last calendar day of the schedule (None for an empty routine)
pub fn end_date(routine: &Routine, start: NaiveDate) -> Option<NaiveDate> {
    routine
        .total_days()
        .checked_sub(1)
        .and_then(|last| date_for_day(start, last).ok())
}

/// The Sunday-to-Saturday week containing `anchor`.
///
/// `None` when the week runs past either end of the calendar.
pub fn week_of(anchor: NaiveDate) -> Option<[NaiveDate; 7]> {
    let sunday =
        anchor.checked_sub_days(Days::new(anchor.weekday().num_days_from_sunday() as u64))?;
    let mut week = [sunday; 7];
    for (i, day) in week.iter_mut().enumerate() {
        *day = sunday.checked_add_days(Days::new(i as u64))?;
    }
    Some(week)
}

/// Six Sunday-first weeks covering the month containing `anchor`
pub fn month_grid(anchor: NaiveDate) -> Option<[[NaiveDate; 7]; 6]> {
    let first = anchor.with_day(1).unwrap_or(anchor);
    let mut grid = [week_of(first)?; 6];
    for (i, week) in grid.iter_mut().enumerate().skip(1) {
        *week = week_of(first.checked_add_days(Days::new(7 * i as u64))?)?;
    }
    Some(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn push_pull_rest() -> Routine {
        let mut routine = Routine::new(2).unwrap();
        routine.add_workout("push", "Push");
        routine.add_workout("pull", "Pull");
        routine.add_rest_day();
        routine
    }

    #[test]
    fn test_date_for_day_rolls_over_month_and_year() {
        assert_eq!(date_for_day(date(2026, 1, 31), 1).unwrap(), date(2026, 2, 1));
        assert_eq!(date_for_day(date(2026, 12, 30), 3).unwrap(), date(2027, 1, 2));
        assert_eq!(date_for_day(date(2028, 2, 28), 1).unwrap(), date(2028, 2, 29));
        assert_eq!(date_for_day(date(2026, 5, 5), 0).unwrap(), date(2026, 5, 5));
    }

    #[test]
    fn test_date_for_day_overflow() {
        assert!(matches!(
            date_for_day(NaiveDate::MAX, 1),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_dated_days() {
        let routine = push_pull_rest();
        let days: Vec<_> = dated_days(&routine, date(2026, 10, 30)).collect();

        assert_eq!(days.len(), 6);
        assert_eq!(days[0].0, date(2026, 10, 30));
        assert_eq!(days[3].0, date(2026, 11, 2));
        assert_eq!(days[3].1.item.label(), "Push");
        assert_eq!(days[5].1.item.label(), "Rest");
    }

    #[test]
    fn test_day_on() {
        let routine = push_pull_rest();
        let start = date(2026, 10, 19);

        assert_eq!(day_on(&routine, start, date(2026, 10, 20)).unwrap().item.label(), "Pull");
        assert_eq!(day_on(&routine, start, date(2026, 10, 22)).unwrap().cycle_index, 1);
        assert!(day_on(&routine, start, date(2026, 10, 18)).is_none());
        assert!(day_on(&routine, start, date(2026, 10, 25)).is_none());
    }

    #[test]
    fn test_end_date() {
        let routine = push_pull_rest();
        assert_eq!(end_date(&routine, date(2026, 10, 19)), Some(date(2026, 10, 24)));
        assert_eq!(end_date(&Routine::default(), date(2026, 10, 19)), None);
    }

    #[test]
    fn test_week_of_starts_on_sunday() {
        // 2026-10-21 is a Wednesday
        let week = week_of(date(2026, 10, 21)).unwrap();
        assert_eq!(week[0], date(2026, 10, 18));
        assert_eq!(week[6], date(2026, 10, 24));
    }

    #[test]
    fn test_month_grid() {
        let grid = month_grid(date(2026, 10, 19)).unwrap();
        // October 2026 starts on a Thursday
        assert_eq!(grid[0][0], date(2026, 9, 27));
        assert_eq!(grid[0][4], date(2026, 10, 1));
        assert_eq!(grid[5][6], date(2026, 11, 7));
    }

    #[test]
    fn test_grids_at_calendar_limits() {
        assert!(week_of(NaiveDate::MIN).is_none());
        assert!(month_grid(NaiveDate::MAX).is_none());
    }
}
