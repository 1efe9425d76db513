use choreust::calendar::*;
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn test_add_months_clamps_to_month_end() {
    assert_eq!(add_months(d(2023, 1, 31), 1), d(2023, 2, 28));
    assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
    assert_eq!(add_months(d(2024, 1, 30), 1), d(2024, 2, 29));
    assert_eq!(add_months(d(2024, 3, 31), 1), d(2024, 4, 30));
    assert_eq!(add_months(d(2024, 8, 31), 3), d(2024, 11, 30));
    assert_eq!(add_months(d(2024, 11, 15), 3), d(2025, 2, 15));
}

#[test]
fn test_add_years_from_leap_day() {
    assert_eq!(add_years(d(2024, 2, 29), 1), d(2025, 2, 28));
    assert_eq!(add_years(d(2024, 2, 29), 4), d(2028, 2, 29));
}

#[test]
fn test_add_days_crosses_year() {
    assert_eq!(add_days(d(2024, 12, 25), 7), d(2025, 1, 1));
    assert_eq!(add_days(d(2024, 1, 1), 45), d(2024, 2, 15));
}

#[test]
fn test_end_of_quarter() {
    assert_eq!(end_of_quarter(d(2024, 1, 1)), d(2024, 3, 31));
    assert_eq!(end_of_quarter(d(2024, 2, 10)), d(2024, 3, 31));
    assert_eq!(end_of_quarter(d(2024, 3, 31)), d(2024, 3, 31));
    assert_eq!(end_of_quarter(d(2024, 4, 1)), d(2024, 6, 30));
    assert_eq!(end_of_quarter(d(2024, 8, 15)), d(2024, 9, 30));
    assert_eq!(end_of_quarter(d(2024, 12, 31)), d(2024, 12, 31));
}

#[test]
fn test_end_of_half_year() {
    assert_eq!(end_of_half_year(d(2024, 1, 1)), d(2024, 6, 30));
    assert_eq!(end_of_half_year(d(2024, 6, 30)), d(2024, 6, 30));
    assert_eq!(end_of_half_year(d(2024, 7, 1)), d(2024, 12, 31));
}

#[test]
fn test_next_monthly_occurrence_is_strictly_after() {
    // later this month
    assert_eq!(next_monthly_occurrence_after(d(2024, 3, 10), 15), d(2024, 3, 15));
    // on the day itself rolls to next month
    assert_eq!(next_monthly_occurrence_after(d(2024, 3, 15), 15), d(2024, 4, 15));
    // already passed
    assert_eq!(next_monthly_occurrence_after(d(2024, 3, 20), 15), d(2024, 4, 15));
    // December rolls the year
    assert_eq!(next_monthly_occurrence_after(d(2024, 12, 20), 5), d(2025, 1, 5));
}

#[test]
fn test_next_monthly_occurrence_clamps_short_months() {
    assert_eq!(next_monthly_occurrence_after(d(2024, 2, 10), 31), d(2024, 2, 29));
    assert_eq!(next_monthly_occurrence_after(d(2023, 2, 10), 31), d(2023, 2, 28));
    // Feb 29 itself is this month's day-31 slot, so next is Mar 31
    assert_eq!(next_monthly_occurrence_after(d(2024, 2, 29), 31), d(2024, 3, 31));
    assert_eq!(next_monthly_occurrence_after(d(2024, 3, 31), 31), d(2024, 4, 30));
    assert_eq!(next_monthly_occurrence_after(d(2024, 1, 31), 30), d(2024, 2, 29));
}

#[test]
fn test_next_yearly_occurrence() {
    assert_eq!(next_yearly_occurrence_after(d(2024, 1, 10), 4, 15), d(2024, 4, 15));
    assert_eq!(next_yearly_occurrence_after(d(2024, 4, 15), 4, 15), d(2025, 4, 15));
    assert_eq!(next_yearly_occurrence_after(d(2024, 5, 1), 4, 15), d(2025, 4, 15));
    assert_eq!(next_yearly_occurrence_after(d(2024, 3, 1), 2, 29), d(2025, 2, 28));
    assert_eq!(next_yearly_occurrence_after(d(2023, 3, 1), 2, 29), d(2024, 2, 29));
}
