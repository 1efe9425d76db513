//! Calendar-day arithmetic.
//!
//! All functions work on [`NaiveDate`] and never look at a time of day.
//! Month and year arithmetic clamps to the last valid day of the target
//! month (Jan 31 + 1 month is Feb 28 or Feb 29, never a March date).
//! Results beyond chrono's representable range saturate at
//! [`NaiveDate::MAX`] / [`NaiveDate::MIN`].

use chrono::{Datelike, Days, Months, NaiveDate};

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// Builds `year-month-day`, pulling `day` back to the month's last day if
/// the month is shorter.
pub fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    let days = Days::new(n.unsigned_abs());
    if n >= 0 {
        date.checked_add_days(days).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(days).unwrap_or(NaiveDate::MIN)
    }
}

pub fn add_months(date: NaiveDate, n: i32) -> NaiveDate {
    // chrono clamps the day-of-month for us
    let months = Months::new(n.unsigned_abs());
    if n >= 0 {
        date.checked_add_months(months).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_months(months).unwrap_or(NaiveDate::MIN)
    }
}

pub fn add_years(date: NaiveDate, n: i32) -> NaiveDate {
    add_months(date, n.saturating_mul(12))
}

/// Last day of the quarter containing `date` (Mar 31, Jun 30, Sep 30, Dec 31).
pub fn end_of_quarter(date: NaiveDate) -> NaiveDate {
    let last_month = ((date.month() - 1) / 3 + 1) * 3;
    clamped_date(date.year(), last_month, 31)
}

/// Last day of the half-year containing `date` (Jun 30 or Dec 31).
pub fn end_of_half_year(date: NaiveDate) -> NaiveDate {
    if date.month() <= 6 {
        clamped_date(date.year(), 6, 30)
    } else {
        clamped_date(date.year(), 12, 31)
    }
}

/// Earliest date strictly after `reference` falling on `day_of_month`.
///
/// Months too short for `day_of_month` use their last day instead, so a
/// day-31 anchor lands on Feb 28/29, Apr 30 and so on.
pub fn next_monthly_occurrence_after(reference: NaiveDate, day_of_month: u32) -> NaiveDate {
    let this_month = clamped_date(reference.year(), reference.month(), day_of_month);
    if this_month > reference {
        return this_month;
    }
    let next = add_months(first_of_month(reference), 1);
    clamped_date(next.year(), next.month(), day_of_month)
}

/// Earliest date strictly after `reference` falling on `month`/`day`.
///
/// Feb 29 anchors fall on Feb 28 in common years.
pub fn next_yearly_occurrence_after(reference: NaiveDate, month: u32, day: u32) -> NaiveDate {
    let this_year = clamped_date(reference.year(), month, day);
    if this_year > reference {
        return this_year;
    }
    clamped_date(reference.year() + 1, month, day)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
