use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::error::{Error, Result};
use crate::manager::{Clock, TaskManager};
use crate::models::{short_id, AnchorPattern, Category, Frequency, Schedule, Task, TaskDraft};
use crate::status::{classify, format_due_text, Status};
use crate::storage::Store;

/// Options for creating a task from the command line.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub description: Option<String>,
    pub anchor: Option<AnchorPattern>,
    pub first_due: Option<NaiveDate>,
    pub last_done: Option<NaiveDate>,
    /// Category id or name.
    pub category: Option<String>,
}

/// Field overrides for editing a task. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
    pub anchor: Option<AnchorPattern>,
    /// Switch back to an interval schedule.
    pub interval: bool,
    pub first_due: Option<NaiveDate>,
    pub category: Option<String>,
    pub clear_category: bool,
}

/// Looks a category up by id, then case-insensitive name, then unique id
/// prefix.
pub fn resolve_category<S: Store, C: Clock>(mgr: &TaskManager<S, C>, key: &str) -> Result<String> {
    let key = key.trim();
    if let Ok(category) = mgr.category(key) {
        return Ok(category.id.clone());
    }
    if let Some(category) = mgr
        .categories()
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(key))
    {
        return Ok(category.id.clone());
    }
    let mut matches = mgr
        .categories()
        .iter()
        .filter(|c| !key.is_empty() && c.id.starts_with(key));
    match (matches.next(), matches.next()) {
        (Some(c), None) => Ok(c.id.clone()),
        _ => Err(Error::not_found("Category", key)),
    }
}

/// Adds a new task and returns its id.
///
/// Interval tasks given neither a first due date nor a last completion are
/// due today.
pub fn cmd_add<S: Store, C: Clock>(
    mgr: &mut TaskManager<S, C>,
    name: String,
    frequency: Frequency,
    opts: AddOptions,
) -> Result<String> {
    let mut draft = TaskDraft::new(name, frequency);
    draft.description = opts.description;
    if let Some(anchor) = opts.anchor {
        draft = draft.anchored(anchor);
    }
    if let Some(key) = opts.category {
        draft.category_id = Some(resolve_category(mgr, &key)?);
    }
    draft.first_due_date = match (opts.first_due, opts.last_done, draft.schedule) {
        (Some(date), _, _) => Some(date),
        (None, None, Schedule::Interval) => Some(mgr.today()),
        _ => None,
    };

    let task = mgr.add_task(draft, opts.last_done)?;
    println!(
        "Task added (id = {}), next due {}",
        task.short_id(),
        task.next_due
    );
    Ok(task.id)
}

/// Applies field overrides to a task and reschedules it.
pub fn cmd_edit<S: Store, C: Clock>(
    mgr: &mut TaskManager<S, C>,
    id: &str,
    opts: EditOptions,
) -> Result<()> {
    let task = mgr.find_task_by_prefix(id)?;
    let task_id = task.id.clone();
    let mut draft = task.draft();

    if let Some(name) = opts.name {
        draft.name = name;
    }
    if let Some(description) = opts.description {
        draft.description = Some(description).filter(|d| !d.trim().is_empty());
    }
    if let Some(frequency) = opts.frequency {
        draft.frequency = frequency;
    }
    if opts.interval {
        draft.schedule = Schedule::Interval;
    }
    if let Some(anchor) = opts.anchor {
        draft.schedule = Schedule::Calendar(anchor);
    }
    if let Some(date) = opts.first_due {
        draft.first_due_date = Some(date);
    }
    if opts.clear_category {
        draft.category_id = None;
    }
    if let Some(key) = opts.category {
        draft.category_id = Some(resolve_category(mgr, &key)?);
    }

    let task = mgr.update_task(&task_id, draft)?;
    println!("Task {} updated, next due {}.", task.short_id(), task.next_due);
    Ok(())
}

/// Marks a task done and prints the record id needed to undo it.
pub fn cmd_complete<S: Store, C: Clock>(
    mgr: &mut TaskManager<S, C>,
    id: &str,
    on: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<String> {
    let task_id = mgr.find_task_by_prefix(id)?.id.clone();
    let record = mgr.complete_task(&task_id, on, notes)?;
    let task = mgr.task(&task_id)?;
    println!(
        "Task {} completed on {}. Next due {} (undo with record {}).",
        task.short_id(),
        record.completed_at,
        task.next_due,
        short_id(&record.id)
    );
    Ok(record.id)
}

/// Removes a completion record, the most recent one unless `record` names
/// one (full id or prefix).
pub fn cmd_undo<S: Store, C: Clock>(
    mgr: &mut TaskManager<S, C>,
    id: &str,
    record: Option<String>,
) -> Result<()> {
    let task_id = mgr.find_task_by_prefix(id)?.id.clone();
    let history = mgr.completions_for(&task_id)?;
    let record_id = match record {
        None => history
            .first()
            .map(|r| r.id.clone())
            .ok_or_else(|| Error::Validation("task has no completions to undo".into()))?,
        Some(prefix) => {
            let mut matches = history.iter().filter(|r| r.id.starts_with(&prefix));
            match (matches.next(), matches.next()) {
                (Some(r), None) => r.id.clone(),
                (Some(_), Some(_)) => {
                    return Err(Error::Validation(format!(
                        "record id '{}' is ambiguous",
                        prefix
                    )))
                }
                (None, _) => return Err(Error::not_found("Completion record", prefix)),
            }
        }
    };

    mgr.undo_completion(&task_id, &record_id)?;
    let task = mgr.task(&task_id)?;
    println!(
        "Completion {} undone. Task {} next due {}.",
        short_id(&record_id),
        task.short_id(),
        task.next_due
    );
    Ok(())
}

/// Removes a task and its history.
pub fn cmd_remove<S: Store, C: Clock>(mgr: &mut TaskManager<S, C>, id: &str) -> Result<()> {
    let task_id = mgr.find_task_by_prefix(id)?.id.clone();
    let task = mgr.delete_task(&task_id)?;
    println!("Task {} ({}) removed.", task.short_id(), task.name);
    Ok(())
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Overdue => Color::Red,
        Status::DueSoon => Color::Yellow,
        Status::Upcoming => Color::Cyan,
        Status::Future => Color::Green,
    }
}

fn category_cell(category: Option<&Category>) -> Cell {
    match category {
        Some(c) => {
            let cell = Cell::new(&c.name);
            match c.rgb() {
                Some((r, g, b)) => cell.fg(Color::Rgb { r, g, b }),
                None => cell,
            }
        }
        None => Cell::new("-"),
    }
}

/// Tasks matching the filters, most urgent first.
pub fn sorted_tasks<'a, S: Store, C: Clock>(
    mgr: &'a TaskManager<S, C>,
    status: Option<Status>,
    category: Option<&str>,
) -> Vec<&'a Task> {
    let today = mgr.today();
    let mut tasks: Vec<&Task> = mgr
        .tasks()
        .iter()
        .filter(|t| status.map_or(true, |s| classify(t.next_due, today) == s))
        .filter(|t| category.map_or(true, |c| t.category_id.as_deref() == Some(c)))
        .collect();
    tasks.sort_by(|a, b| a.next_due.cmp(&b.next_due).then_with(|| a.name.cmp(&b.name)));
    tasks
}

/// Lists tasks in a formatted table, soonest due first.
pub fn cmd_list<S: Store, C: Clock>(
    mgr: &TaskManager<S, C>,
    status: Option<Status>,
    category: Option<String>,
) -> Result<()> {
    let category_id = match category {
        Some(key) => Some(resolve_category(mgr, &key)?),
        None => None,
    };
    let tasks = sorted_tasks(mgr, status, category_id.as_deref());
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Schedule").add_attribute(Attribute::Bold),
            Cell::new("Last Done").add_attribute(Attribute::Bold),
            Cell::new("Next Due").add_attribute(Attribute::Bold),
            Cell::new("When").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    let today = mgr.today();
    for t in tasks {
        let status = classify(t.next_due, today);
        let category = t.category_id.as_deref().and_then(|id| mgr.category(id).ok());
        table.add_row(vec![
            Cell::new(t.short_id()),
            Cell::new(&t.name),
            category_cell(category),
            Cell::new(t.schedule.label(&t.frequency)),
            Cell::new(
                t.last_completed
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
            Cell::new(t.next_due),
            Cell::new(format_due_text(t.next_due, today)),
            Cell::new(status.label()).fg(status_color(status)),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Prints one task with its completion history.
pub fn cmd_show<S: Store, C: Clock>(mgr: &TaskManager<S, C>, id: &str) -> Result<()> {
    let task = mgr.find_task_by_prefix(id)?;
    let today = mgr.today();
    let status = classify(task.next_due, today);

    println!("{} ({})", task.name, task.id);
    if let Some(description) = &task.description {
        println!("  {}", description);
    }
    println!("  Schedule:  {}", task.schedule.label(&task.frequency));
    if let Some(category) = task.category_id.as_deref().and_then(|c| mgr.category(c).ok()) {
        println!("  Category:  {}", category.name);
    }
    if let Some(first) = task.first_due_date {
        println!("  First due: {}", first);
    }
    println!(
        "  Next due:  {} ({}, {})",
        task.next_due,
        format_due_text(task.next_due, today),
        status.label()
    );

    let history = mgr.completions_for(&task.id)?;
    if history.is_empty() {
        println!("  Never completed.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Record", "Completed", "Recorded", "Notes"]);
    for r in history {
        table.add_row(vec![
            short_id(&r.id).to_string(),
            r.completed_at.to_string(),
            r.recorded_at.format("%Y-%m-%d %H:%M").to_string(),
            r.notes.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Adds a new category.
pub fn cmd_category_add<S: Store, C: Clock>(
    mgr: &mut TaskManager<S, C>,
    name: &str,
    color: &str,
) -> Result<()> {
    let category = mgr.add_category(name, color)?;
    println!("Category '{}' added (id = {}).", category.name, category.id);
    Ok(())
}

/// Lists all categories with their task counts.
pub fn cmd_category_list<S: Store, C: Clock>(mgr: &TaskManager<S, C>) {
    if mgr.categories().is_empty() {
        println!("No categories found.");
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Name", "Color", "Tasks"]);
    for c in mgr.categories() {
        let count = mgr
            .tasks()
            .iter()
            .filter(|t| t.category_id.as_deref() == Some(c.id.as_str()))
            .count();
        table.add_row(vec![
            Cell::new(short_id(&c.id)),
            category_cell(Some(c)),
            Cell::new(&c.color),
            Cell::new(count),
        ]);
    }
    println!("{table}");
}

/// Removes a category; its tasks become uncategorized.
pub fn cmd_category_remove<S: Store, C: Clock>(
    mgr: &mut TaskManager<S, C>,
    key: &str,
) -> Result<()> {
    let id = resolve_category(mgr, key)?;
    let category = mgr.delete_category(&id)?;
    println!("Category '{}' removed.", category.name);
    Ok(())
}
