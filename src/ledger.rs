//! Completion history.
//!
//! The ledger is the source of truth for when a task was done; the
//! `last_completed`/`next_due` fields on [`Task`](crate::models::Task) are
//! rebuilt from it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::CompletionRecord;

/// Append-only list of completion records for all tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionLedger {
    records: Vec<CompletionRecord>,
}

/// Recency order: `completed_at`, then `recorded_at`.
///
/// Records equal on both keep insertion order; later insertions count as
/// more recent.
pub fn cmp_recency(a: &CompletionRecord, b: &CompletionRecord) -> Ordering {
    a.completed_at
        .cmp(&b.completed_at)
        .then(a.recorded_at.cmp(&b.recorded_at))
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompletionRecord> {
        self.records.iter()
    }

    pub fn append(&mut self, record: CompletionRecord) {
        self.records.push(record);
    }

    /// Removes exactly one record, which must belong to `task_id`.
    pub fn remove(&mut self, task_id: &str, record_id: &str) -> Result<CompletionRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.task_id == task_id && r.id == record_id)
            .ok_or_else(|| Error::not_found("Completion record", record_id))?;
        Ok(self.records.remove(index))
    }

    /// Drops every record of a task and returns how many went.
    pub fn remove_task(&mut self, task_id: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.task_id != task_id);
        before - self.records.len()
    }

    /// The task's latest completion, if it has any.
    pub fn most_recent(&self, task_id: &str) -> Option<&CompletionRecord> {
        // max_by keeps the last of equal elements, so ties go to the later insertion
        self.records
            .iter()
            .filter(|r| r.task_id == task_id)
            .max_by(|a, b| cmp_recency(a, b))
    }

    /// All records of a task, newest first.
    pub fn for_task(&self, task_id: &str) -> Vec<&CompletionRecord> {
        let mut records: Vec<(usize, &CompletionRecord)> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.task_id == task_id)
            .collect();
        records.sort_by(|(ia, a), (ib, b)| cmp_recency(b, a).then(ib.cmp(ia)));
        records.into_iter().map(|(_, r)| r).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record(id: &str, task: &str, day: u32, recorded_hour: u32) -> CompletionRecord {
        CompletionRecord {
            id: id.into(),
            task_id: task.into(),
            completed_at: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            recorded_at: Utc.with_ymd_and_hms(2024, 2, 1, recorded_hour, 0, 0).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn most_recent_uses_completed_at_first() {
        let mut ledger = CompletionLedger::new();
        ledger.append(record("a", "t", 5, 9));
        ledger.append(record("b", "t", 3, 10));
        ledger.append(record("c", "other", 20, 10));
        assert_eq!(ledger.most_recent("t").unwrap().id, "a");
    }

    #[test]
    fn same_day_ties_break_on_recorded_at_then_insertion() {
        let mut ledger = CompletionLedger::new();
        ledger.append(record("late", "t", 5, 11));
        ledger.append(record("early", "t", 5, 8));
        assert_eq!(ledger.most_recent("t").unwrap().id, "late");

        ledger.append(record("twin", "t", 5, 11));
        assert_eq!(ledger.most_recent("t").unwrap().id, "twin");

        let order: Vec<&str> = ledger.for_task("t").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["twin", "late", "early"]);
    }

    #[test]
    fn remove_requires_matching_task() {
        let mut ledger = CompletionLedger::new();
        ledger.append(record("a", "t", 5, 9));
        assert!(matches!(
            ledger.remove("other", "a"),
            Err(Error::NotFound { .. })
        ));
        assert_eq!(ledger.remove("t", "a").unwrap().id, "a");
        assert!(ledger.is_empty());
    }

    #[test]
    fn remove_task_drops_only_that_task() {
        let mut ledger = CompletionLedger::new();
        ledger.append(record("a", "t", 5, 9));
        ledger.append(record("b", "t", 6, 9));
        ledger.append(record("c", "u", 6, 9));
        assert_eq!(ledger.remove_task("t"), 2);
        assert_eq!(ledger.len(), 1);
    }
}
