use choreust::commands::*;
use choreust::error::Error;
use choreust::manager::{FixedClock, TaskManager};
use choreust::models::{AnchorPattern, Frequency, Schedule};
use choreust::status::Status;
use choreust::storage::MemoryStore;
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn manager() -> TaskManager<MemoryStore, FixedClock> {
    TaskManager::with_clock(MemoryStore::new(), FixedClock(d(2024, 2, 10))).unwrap()
}

#[test]
fn test_add_defaults_first_due_to_today() {
    let mut mgr = manager();
    let id = cmd_add(&mut mgr, "Sweep".into(), Frequency::Weekly, AddOptions::default()).unwrap();

    let task = mgr.task(&id).unwrap();
    assert_eq!(task.first_due_date, Some(d(2024, 2, 10)));
    assert_eq!(task.next_due, d(2024, 2, 10));
}

#[test]
fn test_add_with_last_done_and_category_name() {
    let mut mgr = manager();
    let opts = AddOptions {
        last_done: Some(d(2024, 1, 1)),
        category: Some("vehicle".into()),
        ..Default::default()
    };
    let id = cmd_add(&mut mgr, "Rotate tires".into(), Frequency::Custom(45), opts).unwrap();

    let task = mgr.task(&id).unwrap();
    assert_eq!(task.category_id.as_deref(), Some("vehicle"));
    assert_eq!(task.next_due, d(2024, 2, 15));
    assert_eq!(mgr.completions_for(&id).unwrap().len(), 1);
}

#[test]
fn test_add_anchored_task() {
    let mut mgr = manager();
    let opts = AddOptions {
        anchor: Some(AnchorPattern::QuarterEnd),
        ..Default::default()
    };
    let id = cmd_add(&mut mgr, "Estimated tax".into(), Frequency::Quarterly, opts).unwrap();

    let task = mgr.task(&id).unwrap();
    assert_eq!(task.first_due_date, None);
    assert_eq!(task.next_due, d(2024, 3, 31));
}

#[test]
fn test_add_with_unknown_category_fails() {
    let mut mgr = manager();
    let opts = AddOptions {
        category: Some("Garage".into()),
        ..Default::default()
    };
    let err = cmd_add(&mut mgr, "Sweep".into(), Frequency::Weekly, opts).unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "Category", .. }));
    assert!(mgr.tasks().is_empty());
}

#[test]
fn test_complete_and_undo_by_prefix() {
    let mut mgr = manager();
    let opts = AddOptions {
        first_due: Some(d(2024, 2, 1)),
        ..Default::default()
    };
    let id = cmd_add(&mut mgr, "Sweep".into(), Frequency::Weekly, opts).unwrap();
    let prefix = &id[..8];

    cmd_complete(&mut mgr, prefix, Some(d(2024, 2, 3)), None).unwrap();
    let latest = cmd_complete(&mut mgr, prefix, None, None).unwrap();
    assert_eq!(mgr.task(&id).unwrap().next_due, d(2024, 2, 17));

    // default undo takes the newest completion
    cmd_undo(&mut mgr, prefix, None).unwrap();
    let history = mgr.completions_for(&id).unwrap();
    assert_eq!(history.len(), 1);
    assert_ne!(history[0].id, latest);
    assert_eq!(mgr.task(&id).unwrap().next_due, d(2024, 2, 10));

    let remaining = history[0].id.clone();
    cmd_undo(&mut mgr, prefix, Some(remaining[..6].to_string())).unwrap();
    assert_eq!(mgr.task(&id).unwrap().next_due, d(2024, 2, 1));

    let err = cmd_undo(&mut mgr, prefix, None).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_edit_switches_schedule() {
    let mut mgr = manager();
    let id = cmd_add(&mut mgr, "Rent".into(), Frequency::Monthly, AddOptions::default()).unwrap();

    let opts = EditOptions {
        anchor: Some(AnchorPattern::DayOfMonth(31)),
        name: Some("Pay rent".into()),
        category: Some("Home".into()),
        ..Default::default()
    };
    cmd_edit(&mut mgr, &id, opts).unwrap();
    let task = mgr.task(&id).unwrap();
    assert_eq!(task.name, "Pay rent");
    assert_eq!(task.schedule, Schedule::Calendar(AnchorPattern::DayOfMonth(31)));
    assert_eq!(task.category_id.as_deref(), Some("home"));
    assert_eq!(task.next_due, d(2024, 2, 29));

    let opts = EditOptions {
        interval: true,
        clear_category: true,
        ..Default::default()
    };
    cmd_edit(&mut mgr, &id, opts).unwrap();
    let task = mgr.task(&id).unwrap();
    assert_eq!(task.schedule, Schedule::Interval);
    assert_eq!(task.category_id, None);
    assert_eq!(task.next_due, d(2024, 2, 10));
}

#[test]
fn test_remove_task() {
    let mut mgr = manager();
    let id = cmd_add(&mut mgr, "Sweep".into(), Frequency::Weekly, AddOptions::default()).unwrap();
    cmd_complete(&mut mgr, &id, None, None).unwrap();

    cmd_remove(&mut mgr, &id).unwrap();
    assert!(mgr.tasks().is_empty());
    assert!(mgr.state().completion_records.is_empty());
    assert!(cmd_remove(&mut mgr, &id).is_err());
}

#[test]
fn test_sorted_tasks_filters_and_orders() {
    let mut mgr = manager();
    let add = |mgr: &mut TaskManager<MemoryStore, FixedClock>, name: &str, due: NaiveDate, cat: Option<&str>| {
        let opts = AddOptions {
            first_due: Some(due),
            category: cat.map(String::from),
            ..Default::default()
        };
        cmd_add(mgr, name.into(), Frequency::Monthly, opts).unwrap()
    };
    add(&mut mgr, "Later", d(2024, 5, 1), None);
    add(&mut mgr, "Late", d(2024, 2, 1), Some("yard"));
    add(&mut mgr, "Soon B", d(2024, 2, 12), None);
    add(&mut mgr, "Soon A", d(2024, 2, 12), Some("yard"));
    add(&mut mgr, "Next month", d(2024, 3, 1), None);

    let names = |tasks: Vec<&choreust::models::Task>| -> Vec<String> {
        tasks.into_iter().map(|t| t.name.clone()).collect()
    };
    assert_eq!(
        names(sorted_tasks(&mgr, None, None)),
        vec!["Late", "Soon A", "Soon B", "Next month", "Later"]
    );
    assert_eq!(names(sorted_tasks(&mgr, Some(Status::DueSoon), None)), vec!["Soon A", "Soon B"]);
    assert_eq!(names(sorted_tasks(&mgr, Some(Status::Overdue), None)), vec!["Late"]);
    assert_eq!(names(sorted_tasks(&mgr, Some(Status::Upcoming), None)), vec!["Next month"]);
    assert_eq!(names(sorted_tasks(&mgr, Some(Status::Future), None)), vec!["Later"]);
    assert_eq!(names(sorted_tasks(&mgr, None, Some("yard"))), vec!["Late", "Soon A"]);
}

#[test]
fn test_categories_commands() {
    let mut mgr = manager();
    cmd_category_add(&mut mgr, "Garage", "#8b5cf6").unwrap();
    let garage = resolve_category(&mgr, "garage").unwrap();

    let opts = AddOptions {
        category: Some("Garage".into()),
        ..Default::default()
    };
    let id = cmd_add(&mut mgr, "Sweep".into(), Frequency::Weekly, opts).unwrap();
    assert_eq!(mgr.task(&id).unwrap().category_id.as_deref(), Some(garage.as_str()));

    cmd_category_remove(&mut mgr, "Garage").unwrap();
    assert_eq!(mgr.task(&id).unwrap().category_id, None);
    assert!(resolve_category(&mgr, "Garage").is_err());
}

#[test]
fn test_list_and_show_run() {
    let mut mgr = manager();
    let id = cmd_add(&mut mgr, "Sweep".into(), Frequency::Weekly, AddOptions::default()).unwrap();
    cmd_complete(&mut mgr, &id, None, Some("all rooms".into())).unwrap();

    cmd_list(&mgr, None, None).unwrap();
    cmd_list(&mgr, Some(Status::Overdue), Some("home".into())).unwrap();
    cmd_show(&mgr, &id).unwrap();
    cmd_category_list(&mgr);
    assert!(cmd_show(&mgr, "nope").is_err());
}
