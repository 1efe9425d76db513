//! # Choreust
//!
//! Tracks recurring maintenance tasks and works out when each one is due
//! next.
//!
//! A task recurs either on an **interval** counted from its last completion
//! (every 2 weeks, every 45 days, ...) or on a **calendar anchor** that
//! ignores when it was done (quarter end, the 15th of each month, every
//! April 15th). Completions are kept as a full history; a task's next due
//! date is always rebuilt from that history, so undoing a completion
//! restores the schedule exactly.
//!
//! # Module Organization
//!
//! - `calendar`: day/month/year arithmetic with month-end clamping
//! - `recurrence`: next-due computation for both schedule kinds
//! - `status`: overdue / due soon / upcoming / future buckets
//! - `ledger`: completion history
//! - `manager`: the state container that keeps tasks and history consistent
//! - `storage`: JSON file persistence and schema migration
//! - `models`: tasks, completions, categories and their on-disk shape
//! - `commands`: CLI command implementations
//! - `tui`: interactive dashboard

pub mod calendar;
pub mod commands;
pub mod error;
pub mod ledger;
pub mod manager;
pub mod models;
pub mod recurrence;
pub mod status;
pub mod storage;
pub mod tui;

pub use error::{Error, Result};
