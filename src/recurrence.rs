//! Next-due computation.
//!
//! Interval tasks are due one frequency step after their latest completion.
//! Calendar tasks ignore completions and land on the next anchor strictly
//! after the evaluation day: finishing a quarter-end task on Mar 31 makes
//! it due again on Jun 30.

use chrono::NaiveDate;

use crate::calendar;
use crate::error::{Error, Result};
use crate::models::{AnchorPattern, Frequency, Schedule, Task};

/// Moves `from` forward by one step of `frequency`.
pub fn advance(frequency: Frequency, from: NaiveDate) -> Result<NaiveDate> {
    let next = match frequency {
        Frequency::Daily => calendar::add_days(from, 1),
        Frequency::Weekly => calendar::add_days(from, 7),
        Frequency::Biweekly => calendar::add_days(from, 14),
        Frequency::Monthly => calendar::add_months(from, 1),
        Frequency::Quarterly => calendar::add_months(from, 3),
        Frequency::Semiannually => calendar::add_months(from, 6),
        Frequency::Annually => calendar::add_years(from, 1),
        Frequency::Custom(days) if days >= 1 => calendar::add_days(from, i64::from(days)),
        Frequency::Custom(_) => {
            return Err(Error::Config(
                "custom frequency needs an interval of at least 1 day".into(),
            ))
        }
    };
    Ok(next)
}

/// Next anchor occurrence strictly after `today`.
pub fn next_anchor_after(anchor: AnchorPattern, today: NaiveDate) -> Result<NaiveDate> {
    anchor.validate()?;
    let next = match anchor {
        AnchorPattern::QuarterEnd => {
            let current = calendar::end_of_quarter(today);
            if current > today {
                current
            } else {
                calendar::end_of_quarter(calendar::add_days(today, 1))
            }
        }
        AnchorPattern::HalfYearEnd => {
            let current = calendar::end_of_half_year(today);
            if current > today {
                current
            } else {
                calendar::end_of_half_year(calendar::add_days(today, 1))
            }
        }
        AnchorPattern::DayOfMonth(day) => calendar::next_monthly_occurrence_after(today, day),
        AnchorPattern::YearlyDate { month, day } => {
            calendar::next_yearly_occurrence_after(today, month, day)
        }
    };
    Ok(next)
}

/// Computes when `task` is next due.
///
/// `reference` is the task's most recent completion, if any. For an interval
/// task without one, the first due date itself is returned.
pub fn compute_next_due(
    task: &Task,
    reference: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<NaiveDate> {
    match task.schedule {
        Schedule::Calendar(anchor) => next_anchor_after(anchor, today),
        Schedule::Interval => match reference {
            Some(completed) => advance(task.frequency, completed),
            None => task.first_due_date.ok_or_else(|| {
                Error::Config(
                    "interval task needs a first due date until it has been completed".into(),
                )
            }),
        },
    }
}
