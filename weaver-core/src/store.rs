//! TaskStore — ordered task list plus alarm bookkeeping.
//!
//! The store is the single source of truth for the session. All mutation
//! goes through the operations below; each reports whether anything
//! actually changed so callers can persist and re-render only on effective
//! mutation.
//!
//! The notified set (ids whose alarm already fired) lives here rather than
//! in the monitor because the mutation operations own its invariants:
//! - removing a task purges its id;
//! - changing or clearing an alarm evicts the id so a re-armed alarm can
//!   fire again;
//! - the set is session-only and never persisted.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::task::{Task, TaskDraft};

#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    notified: HashSet<String>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted tasks. The notified set starts empty;
    /// see `alarm::seed_on_load` for the startup policy.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            notified: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Incomplete tasks, in insertion order. This is the snapshot a
    /// schedule request works from.
    pub fn pending(&self) -> Vec<Task> {
        self.tasks.iter().filter(|t| !t.completed).cloned().collect()
    }

    /// Display ordering: completed tasks sink below incomplete ones, and
    /// within each group insertion order is preserved. Ties never reorder.
    pub fn display_order(&self) -> Vec<&Task> {
        let mut out: Vec<&Task> = self.tasks.iter().filter(|t| !t.completed).collect();
        out.extend(self.tasks.iter().filter(|t| t.completed));
        out
    }

    /// Validate a draft and append it as a new task. Returns the new id.
    pub fn add(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> Result<String> {
        draft.validate()?;
        let task = draft.into_task(now);
        let id = task.id.clone();
        self.tasks.push(task);
        Ok(id)
    }

    /// Remove a task if present; absent ids are a no-op, not an error.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            self.notified.remove(id);
        }
        removed
    }

    /// Flip completion; no-op if the id is absent.
    pub fn toggle_complete(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.completed = !t.completed;
                true
            }
            None => false,
        }
    }

    /// Set or clear a task's alarm. Whenever the value actually changes
    /// (including clearing) the id is evicted from the notified set so the
    /// new alarm is eligible to fire.
    pub fn set_alarm(&mut self, id: &str, alarm: Option<DateTime<Utc>>) -> bool {
        let Some(t) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if t.alarm_time != alarm {
            self.notified.remove(id);
        }
        t.alarm_time = alarm;
        true
    }

    /// Replace the task list with an externally reloaded one, carrying the
    /// notified set forward under the usual eviction rules: ids that
    /// vanished are purged, ids whose alarm time changed are evicted.
    pub fn sync_tasks(&mut self, new_tasks: Vec<Task>) {
        let old_alarms: HashMap<String, Option<DateTime<Utc>>> = self
            .tasks
            .iter()
            .map(|t| (t.id.clone(), t.alarm_time))
            .collect();

        self.notified.retain(|id| {
            let Some(new) = new_tasks.iter().find(|t| &t.id == id) else {
                return false;
            };
            old_alarms.get(id).map(|old| *old == new.alarm_time).unwrap_or(false)
        });

        self.tasks = new_tasks;
    }

    /// Resolve a task by full id or unique id prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Task> {
        if prefix.is_empty() {
            bail!("empty task id");
        }
        let matches: Vec<&Task> = self.tasks.iter().filter(|t| t.id.starts_with(prefix)).collect();
        match matches.len() {
            0 => bail!("no task matches id '{prefix}'"),
            1 => Ok(matches[0]),
            n => bail!("id '{prefix}' is ambiguous ({n} tasks match; give more characters)"),
        }
    }

    pub(crate) fn is_notified(&self, id: &str) -> bool {
        self.notified.contains(id)
    }

    pub(crate) fn mark_notified(&mut self, id: &str) {
        self.notified.insert(id.to_string());
    }
}
