use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// Tasks due within this many days count as due soon.
pub const DUE_SOON_DAYS: i64 = 7;
/// Tasks due within this many days (but not soon) count as upcoming.
pub const UPCOMING_DAYS: i64 = 30;

/// Urgency bucket of a task, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Overdue,
    DueSoon,
    Upcoming,
    Future,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Overdue,
        Status::DueSoon,
        Status::Upcoming,
        Status::Future,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Status::Overdue => "Overdue",
            Status::DueSoon => "Due soon",
            Status::Upcoming => "Upcoming",
            Status::Future => "Future",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Overdue => "overdue",
            Status::DueSoon => "due-soon",
            Status::Upcoming => "upcoming",
            Status::Future => "future",
        };
        f.write_str(s)
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "overdue" => Ok(Status::Overdue),
            "due-soon" | "soon" => Ok(Status::DueSoon),
            "upcoming" => Ok(Status::Upcoming),
            "future" => Ok(Status::Future),
            other => Err(Error::Validation(format!(
                "unknown status '{}'. Supported: overdue, due-soon, upcoming, future",
                other
            ))),
        }
    }
}

/// Whole calendar days from `today` until `next_due`; negative when late.
pub fn days_until_due(next_due: NaiveDate, today: NaiveDate) -> i64 {
    next_due.signed_duration_since(today).num_days()
}

/// Buckets a due date relative to `today`.
pub fn classify(next_due: NaiveDate, today: NaiveDate) -> Status {
    match days_until_due(next_due, today) {
        d if d < 0 => Status::Overdue,
        d if d <= DUE_SOON_DAYS => Status::DueSoon,
        d if d <= UPCOMING_DAYS => Status::Upcoming,
        _ => Status::Future,
    }
}

/// Short relative description such as "Due tomorrow" or "3 days overdue".
pub fn format_due_text(next_due: NaiveDate, today: NaiveDate) -> String {
    match days_until_due(next_due, today) {
        -1 => "1 day overdue".to_string(),
        d if d < 0 => format!("{} days overdue", d.abs()),
        0 => "Due today".to_string(),
        1 => "Due tomorrow".to_string(),
        d => format!("Due in {} days", d),
    }
}
