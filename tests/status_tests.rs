use choreust::status::{classify, days_until_due, format_due_text, Status};
use chrono::{Duration, NaiveDate};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()
}

fn in_days(n: i64) -> NaiveDate {
    today() + Duration::days(n)
}

#[test]
fn test_status_boundaries() {
    assert_eq!(classify(in_days(-1), today()), Status::Overdue);
    assert_eq!(classify(in_days(-40), today()), Status::Overdue);
    assert_eq!(classify(in_days(0), today()), Status::DueSoon);
    assert_eq!(classify(in_days(7), today()), Status::DueSoon);
    assert_eq!(classify(in_days(8), today()), Status::Upcoming);
    assert_eq!(classify(in_days(30), today()), Status::Upcoming);
    assert_eq!(classify(in_days(31), today()), Status::Future);
}

#[test]
fn test_days_until_due_is_signed() {
    assert_eq!(days_until_due(in_days(-3), today()), -3);
    assert_eq!(days_until_due(in_days(12), today()), 12);
}

#[test]
fn test_due_text() {
    assert_eq!(format_due_text(in_days(-1), today()), "1 day overdue");
    assert_eq!(format_due_text(in_days(-5), today()), "5 days overdue");
    assert_eq!(format_due_text(in_days(0), today()), "Due today");
    assert_eq!(format_due_text(in_days(1), today()), "Due tomorrow");
    assert_eq!(format_due_text(in_days(9), today()), "Due in 9 days");
}

#[test]
fn test_status_parse_and_display() {
    for status in Status::ALL {
        assert_eq!(status.to_string().parse::<Status>().unwrap(), status);
    }
    assert_eq!("due_soon".parse::<Status>().unwrap(), Status::DueSoon);
    assert!("later".parse::<Status>().is_err());
}

#[test]
fn test_status_orders_by_urgency() {
    let mut statuses = vec![Status::Future, Status::Overdue, Status::Upcoming, Status::DueSoon];
    statuses.sort();
    assert_eq!(statuses, Status::ALL.to_vec());
}
