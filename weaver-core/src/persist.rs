//! Persistence codec and write policy for the task file.
//!
//! The durable form is a single JSON array of tasks under a fixed slot.
//! There is no versioning or migration: data that no longer parses is
//! discarded and the session starts empty.

use anyhow::{Context, Result};
use log::warn;

use crate::task::Task;

/// Fixed name of the durable slot (the file stem under the app home).
pub const STORE_KEY: &str = "dayWeaverTasks";

/// Decode a persisted task list, tolerating corruption: malformed content
/// is logged and discarded rather than surfaced as an error.
pub fn decode_tasks(raw: &str) -> Vec<Task> {
    match serde_json::from_str::<Vec<Task>>(raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!("discarding corrupt task data ({e})");
            Vec::new()
        }
    }
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String> {
    serde_json::to_string_pretty(tasks).context("serialize tasks")
}

/// Whether a save should touch the durable slot. An empty store is only
/// written when a value already exists there, so a session that has not
/// loaded anything yet can never erase another session's data.
pub fn should_persist(task_count: usize, slot_exists: bool) -> bool {
    task_count > 0 || slot_exists
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;
    use chrono::{Duration, Utc};

    #[test]
    fn round_trip_preserves_tasks_and_order() {
        let now = Utc::now();
        let a = TaskDraft::new("a")
            .with_deadline(now + Duration::hours(1))
            .with_minutes(45)
            .into_task(now);
        let b = TaskDraft::new("b").with_alarm(now + Duration::hours(2)).into_task(now);
        let stored = vec![a, b];

        let raw = encode_tasks(&stored).unwrap();
        let loaded = decode_tasks(&raw);
        assert_eq!(loaded, stored);
    }

    #[test]
    fn malformed_data_yields_empty_list() {
        assert!(decode_tasks("not json").is_empty());
        assert!(decode_tasks("{\"wrong\": \"shape\"}").is_empty());
        assert!(decode_tasks("").is_empty());
    }

    #[test]
    fn empty_store_only_written_over_existing_slot() {
        assert!(!should_persist(0, false));
        assert!(should_persist(0, true));
        assert!(should_persist(3, false));
    }
}
