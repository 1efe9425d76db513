//! Task state manager.
//!
//! [`TaskManager`] owns the application state and is the only writer of the
//! cached `next_due`/`last_completed` fields. Every mutation runs against a
//! copy of the state, is persisted, and only then replaces the live state,
//! so a rejected or unpersisted mutation leaves nothing behind.

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{AppData, Category, CompletionRecord, Schedule, Task, TaskDraft};
use crate::recurrence::compute_next_due;
use crate::storage::Store;

/// Source of "today" and "now".
pub trait Clock {
    fn today(&self) -> NaiveDate;
    fn now(&self) -> DateTime<Utc>;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck on one day. `now()` is noon UTC of that day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }

    fn now(&self) -> DateTime<Utc> {
        self.0
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now)
    }
}

/// Authoritative state container for tasks, completions and categories.
pub struct TaskManager<S: Store, C: Clock = SystemClock> {
    store: S,
    clock: C,
    state: AppData,
}

impl<S: Store> TaskManager<S, SystemClock> {
    /// Loads state from `store` using the system clock.
    pub fn load(store: S) -> Result<Self> {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: Store, C: Clock> TaskManager<S, C> {
    pub fn with_clock(mut store: S, clock: C) -> Result<Self> {
        let state = store.load()?;
        debug!(
            tasks = state.tasks.len(),
            completions = state.completion_records.len(),
            categories = state.categories.len(),
            "state loaded"
        );
        Ok(TaskManager {
            store,
            clock,
            state,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self) -> &AppData {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn categories(&self) -> &[Category] {
        &self.state.categories
    }

    pub fn task(&self, id: &str) -> Result<&Task> {
        self.state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::not_found("Task", id))
    }

    pub fn category(&self, id: &str) -> Result<&Category> {
        self.state
            .categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::not_found("Category", id))
    }

    /// Resolves a full id or a unique id prefix.
    pub fn find_task_by_prefix(&self, prefix: &str) -> Result<&Task> {
        if prefix.is_empty() {
            return Err(Error::Validation("task id is empty".into()));
        }
        if let Ok(task) = self.task(prefix) {
            return Ok(task);
        }
        let mut matches = self.state.tasks.iter().filter(|t| t.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task),
            (Some(_), _) => Err(Error::Validation(format!(
                "task id '{}' is ambiguous",
                prefix
            ))),
            (None, _) => Err(Error::not_found("Task", prefix)),
        }
    }

    /// Completion history of a task, newest first.
    pub fn completions_for(&self, task_id: &str) -> Result<Vec<&CompletionRecord>> {
        self.task(task_id)?;
        Ok(self.state.completion_records.for_task(task_id))
    }

    /// Creates a task.
    ///
    /// With `initial_completion`, a completion record is logged for that day
    /// and the task is scheduled from it. An interval task created that way
    /// without a first due date takes the computed due date as its first.
    pub fn add_task(
        &mut self,
        draft: TaskDraft,
        initial_completion: Option<NaiveDate>,
    ) -> Result<Task> {
        let today = self.clock.today();
        let now = self.clock.now();
        if let Some(done) = initial_completion {
            ensure_not_future(done, today)?;
        }

        let task = self.commit(|state| {
            validate_draft(state, &draft)?;
            let mut task = Task {
                id: Uuid::new_v4().to_string(),
                name: String::new(),
                description: None,
                frequency: draft.frequency,
                schedule: draft.schedule,
                category_id: None,
                first_due_date: None,
                last_completed: None,
                next_due: today,
                created_at: now,
                updated_at: now,
            };
            task.apply_draft(draft);
            task.name = task.name.trim().to_string();

            if let Some(done) = initial_completion {
                state.completion_records.append(CompletionRecord {
                    id: Uuid::new_v4().to_string(),
                    task_id: task.id.clone(),
                    completed_at: done,
                    recorded_at: now,
                    notes: None,
                });
                task.last_completed = Some(done);
                task.next_due = compute_next_due(&task, Some(done), today)?;
                if task.schedule == Schedule::Interval {
                    task.first_due_date.get_or_insert(task.next_due);
                }
            } else {
                task.next_due = compute_next_due(&task, None, today)?;
            }

            state.tasks.push(task.clone());
            Ok(task)
        })?;

        info!(task_id = %task.id, next_due = %task.next_due, "task added");
        Ok(task)
    }

    /// Replaces a task's configuration and reschedules it from its current
    /// history.
    pub fn update_task(&mut self, id: &str, draft: TaskDraft) -> Result<Task> {
        let today = self.clock.today();
        let now = self.clock.now();

        let task = self.commit(|state| {
            validate_draft(state, &draft)?;
            let index = task_index(state, id)?;
            let mut task = state.tasks[index].clone();
            task.apply_draft(draft);
            task.name = task.name.trim().to_string();
            refresh_caches(state, &mut task, today)?;
            task.updated_at = now;
            state.tasks[index] = task.clone();
            Ok(task)
        })?;

        info!(task_id = %task.id, next_due = %task.next_due, "task updated");
        Ok(task)
    }

    /// Deletes a task along with its completion history.
    pub fn delete_task(&mut self, id: &str) -> Result<Task> {
        let (task, removed) = self.commit(|state| {
            let index = task_index(state, id)?;
            let task = state.tasks.remove(index);
            let removed = state.completion_records.remove_task(&task.id);
            Ok((task, removed))
        })?;

        info!(task_id = %task.id, completions = removed, "task deleted");
        Ok(task)
    }

    /// Logs a completion (today unless `completed_at` is given) and
    /// reschedules the task.
    ///
    /// `last_completed` and `next_due` are rebuilt from the most recent
    /// record in the history, not from `completed_at`. Logging a date older
    /// than the latest completion adds it to the history but leaves the
    /// schedule where it is.
    ///
    /// The returned record's id is what [`undo_completion`](Self::undo_completion)
    /// takes.
    pub fn complete_task(
        &mut self,
        task_id: &str,
        completed_at: Option<NaiveDate>,
        notes: Option<String>,
    ) -> Result<CompletionRecord> {
        let today = self.clock.today();
        let now = self.clock.now();
        let completed_at = completed_at.unwrap_or(today);
        ensure_not_future(completed_at, today)?;
        let notes = notes.filter(|n| !n.trim().is_empty());

        let (record, next_due) = self.commit(|state| {
            let index = task_index(state, task_id)?;
            let record = CompletionRecord {
                id: Uuid::new_v4().to_string(),
                task_id: state.tasks[index].id.clone(),
                completed_at,
                recorded_at: now,
                notes,
            };
            state.completion_records.append(record.clone());

            let mut task = state.tasks[index].clone();
            refresh_caches(state, &mut task, today)?;
            task.updated_at = now;
            let next_due = task.next_due;
            state.tasks[index] = task;
            Ok((record, next_due))
        })?;

        info!(
            task_id = %record.task_id,
            record_id = %record.id,
            completed_at = %record.completed_at,
            next_due = %next_due,
            "task completed"
        );
        Ok(record)
    }

    /// Removes one completion record and reschedules the task from whatever
    /// history remains.
    pub fn undo_completion(&mut self, task_id: &str, record_id: &str) -> Result<()> {
        let today = self.clock.today();
        let now = self.clock.now();

        let next_due = self.commit(|state| {
            let index = task_index(state, task_id)?;
            state.completion_records.remove(task_id, record_id)?;
            let mut task = state.tasks[index].clone();
            refresh_caches(state, &mut task, today)?;
            task.updated_at = now;
            let next_due = task.next_due;
            state.tasks[index] = task;
            Ok(next_due)
        })?;

        info!(task_id, record_id, next_due = %next_due, "completion undone");
        Ok(())
    }

    pub fn add_category(&mut self, name: &str, color: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("category name is required".into()));
        }
        if !is_hex_color(color) {
            return Err(Error::Validation(format!(
                "'{}' is not a hex color like #3b82f6",
                color
            )));
        }
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            color: color.to_lowercase(),
            is_default: false,
        };

        let category = self.commit(|state| {
            state.categories.push(category.clone());
            Ok(category)
        })?;

        info!(category_id = %category.id, name = %category.name, "category added");
        Ok(category)
    }

    /// Deletes a category. Tasks in it are kept and become uncategorized.
    pub fn delete_category(&mut self, id: &str) -> Result<Category> {
        let now = self.clock.now();
        let (category, detached) = self.commit(|state| {
            let index = state
                .categories
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| Error::not_found("Category", id))?;
            let category = state.categories.remove(index);
            let mut detached = 0;
            for task in state
                .tasks
                .iter_mut()
                .filter(|t| t.category_id.as_deref() == Some(id))
            {
                task.category_id = None;
                task.updated_at = now;
                detached += 1;
            }
            Ok((category, detached))
        })?;

        info!(category_id = %category.id, detached, "category deleted");
        Ok(category)
    }

    /// Applies `mutate` to a copy of the state, persists the copy, and only
    /// then makes it live.
    fn commit<T>(&mut self, mutate: impl FnOnce(&mut AppData) -> Result<T>) -> Result<T> {
        let mut next = self.state.clone();
        let out = mutate(&mut next)?;
        self.store.persist(&next)?;
        self.state = next;
        Ok(out)
    }
}

fn task_index(state: &AppData, id: &str) -> Result<usize> {
    state
        .tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| Error::not_found("Task", id))
}

fn validate_draft(state: &AppData, draft: &TaskDraft) -> Result<()> {
    draft.validate()?;
    if let Some(category_id) = &draft.category_id {
        if !state.categories.iter().any(|c| &c.id == category_id) {
            return Err(Error::not_found("Category", category_id.as_str()));
        }
    }
    Ok(())
}

/// Rebuilds `last_completed` and `next_due` from the ledger.
fn refresh_caches(state: &AppData, task: &mut Task, today: NaiveDate) -> Result<()> {
    let latest = state
        .completion_records
        .most_recent(&task.id)
        .map(|r| r.completed_at);
    task.last_completed = latest;
    task.next_due = compute_next_due(task, latest, today)?;
    Ok(())
}

fn ensure_not_future(date: NaiveDate, today: NaiveDate) -> Result<()> {
    if date > today {
        return Err(Error::Validation(format!(
            "completion date {} is in the future",
            date
        )));
    }
    Ok(())
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
