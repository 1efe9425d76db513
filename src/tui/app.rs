use chrono::NaiveDate;
use ratatui::widgets::TableState;

use crate::commands::sorted_tasks;
use crate::error::Result;
use crate::manager::{Clock, SystemClock, TaskManager};
use crate::models::{AnchorPattern, Frequency, Task, TaskDraft};
use crate::status::{classify, Status};
use crate::storage::Store;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
}

pub enum DisplayItem {
    Task(Task),
    StatusHeader(Status, usize), // Status, count
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub name: String,
    pub frequency: Option<Frequency>,
    pub step: usize, // 0: Name, 1: Frequency, 2: First due date or anchor
}

/// Outcome of the last action, shown under the table.
pub struct Message {
    pub text: String,
    pub is_error: bool,
}

pub struct App<S: Store, C: Clock = SystemClock> {
    pub manager: TaskManager<S, C>,
    pub display_items: Vec<DisplayItem>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    /// Category id the dashboard is narrowed to.
    pub category_filter: Option<String>,
    pub message: Option<Message>,
}

impl<S: Store, C: Clock> App<S, C> {
    /// Creates a new App around a loaded manager.
    pub fn new(manager: TaskManager<S, C>) -> Self {
        let mut app = App {
            manager,
            display_items: Vec::new(),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            category_filter: None,
            message: None,
        };
        app.reload();
        app
    }

    /// Selects the next row.
    pub fn next(&mut self) {
        if self.display_items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.display_items.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row.
    pub fn previous(&mut self) {
        if self.display_items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.display_items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn selected_task(&self) -> Option<&Task> {
        match self.display_items.get(self.state.selected()?) {
            Some(DisplayItem::Task(t)) => Some(t),
            _ => None,
        }
    }

    /// Rebuilds the status-grouped rows from the manager.
    pub fn reload(&mut self) {
        let today = self.manager.today();
        let tasks: Vec<Task> = sorted_tasks(&self.manager, None, self.category_filter.as_deref())
            .into_iter()
            .cloned()
            .collect();

        self.display_items.clear();
        for status in Status::ALL {
            let group: Vec<&Task> = tasks
                .iter()
                .filter(|t| classify(t.next_due, today) == status)
                .collect();
            if group.is_empty() {
                continue;
            }
            self.display_items
                .push(DisplayItem::StatusHeader(status, group.len()));
            self.display_items
                .extend(group.into_iter().cloned().map(DisplayItem::Task));
        }

        if self.display_items.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.display_items.len() {
                self.state.select(Some(self.display_items.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    fn report<T>(&mut self, result: Result<T>, ok: impl FnOnce(T) -> String) {
        self.message = Some(match result {
            Ok(value) => Message {
                text: ok(value),
                is_error: false,
            },
            Err(err) => Message {
                text: err.to_string(),
                is_error: true,
            },
        });
        self.reload();
    }

    /// Marks the selected task done today.
    pub fn complete_selected(&mut self) {
        let Some(task) = self.selected_task() else { return };
        let (id, name) = (task.id.clone(), task.name.clone());
        let result = self
            .manager
            .complete_task(&id, None, None)
            .and_then(|_| self.manager.task(&id).map(|t| t.next_due));
        self.report(result, |next| {
            format!("'{}' done. Next due {} (u to undo).", name, next)
        });
    }

    /// Removes the selected task's most recent completion.
    pub fn undo_selected(&mut self) {
        let Some(task) = self.selected_task() else { return };
        let (id, name) = (task.id.clone(), task.name.clone());
        let record_id = self
            .manager
            .completions_for(&id)
            .ok()
            .and_then(|history| history.first().map(|r| r.id.clone()));
        let Some(record_id) = record_id else {
            self.message = Some(Message {
                text: format!("'{}' has no completions to undo.", name),
                is_error: true,
            });
            return;
        };
        let result = self
            .manager
            .undo_completion(&id, &record_id)
            .and_then(|_| self.manager.task(&id).map(|t| t.next_due));
        self.report(result, |next| {
            format!("Undid last completion of '{}'. Next due {}.", name, next)
        });
    }

    /// Deletes the selected task and its history.
    pub fn delete_selected(&mut self) {
        let Some(task) = self.selected_task() else { return };
        let id = task.id.clone();
        let result = self.manager.delete_task(&id);
        self.report(result, |t| format!("Deleted '{}'.", t.name));
    }

    /// Cycles the category filter through all categories and back to none.
    pub fn cycle_category(&mut self) {
        let categories = self.manager.categories();
        self.category_filter = match &self.category_filter {
            None => categories.first().map(|c| c.id.clone()),
            Some(current) => categories
                .iter()
                .skip_while(|c| &c.id != current)
                .nth(1)
                .map(|c| c.id.clone()),
        };
        self.state.select(None);
        self.reload();
    }

    pub fn category_filter_name(&self) -> Option<&str> {
        let id = self.category_filter.as_deref()?;
        self.manager.category(id).ok().map(|c| c.name.as_str())
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Handles Enter in the "Add Task" wizard.
    pub fn handle_input(&mut self) {
        if self.input_mode != InputMode::Adding {
            return;
        }
        let input = self.input_buffer.trim().to_string();
        match self.add_state.step {
            0 => {
                // Name
                if !input.is_empty() {
                    self.add_state.name = input;
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            1 => {
                // Frequency
                let parsed = if input.is_empty() {
                    Ok(Frequency::Monthly)
                } else {
                    input.parse::<Frequency>()
                };
                match parsed {
                    Ok(frequency) => {
                        self.add_state.frequency = Some(frequency);
                        self.add_state.step += 1;
                        self.input_buffer.clear();
                        self.message = None;
                    }
                    Err(err) => {
                        self.message = Some(Message {
                            text: err.to_string(),
                            is_error: true,
                        });
                    }
                }
            }
            2 => {
                // First due date, or a calendar anchor
                let frequency = self.add_state.frequency.unwrap_or(Frequency::Monthly);
                let mut draft = TaskDraft::new(self.add_state.name.clone(), frequency);
                draft = if input.is_empty() {
                    draft.first_due(self.manager.today())
                } else if let Ok(date) = input.parse::<NaiveDate>() {
                    draft.first_due(date)
                } else {
                    match input.parse::<AnchorPattern>() {
                        Ok(anchor) => draft.anchored(anchor),
                        Err(err) => {
                            self.message = Some(Message {
                                text: err.to_string(),
                                is_error: true,
                            });
                            return;
                        }
                    }
                };
                if let Some(category) = &self.category_filter {
                    draft = draft.in_category(category.clone());
                }
                let result = self.manager.add_task(draft, None);
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.report(result, |t| format!("Added '{}', due {}.", t.name, t.next_due));
            }
            _ => {}
        }
    }
}
