//! Task model for the Day Weaver list.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::Medium => "medium",
            Importance::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Importance::High),
            "medium" => Ok(Importance::Medium),
            "low" => Ok(Importance::Low),
            other => bail!("invalid importance '{other}' (expected high, medium, or low)"),
        }
    }
}

impl Default for Importance {
    fn default() -> Self {
        Importance::Medium
    }
}

/// Core task type.
///
/// Field names serialize in camelCase; the persisted task file and the
/// schedule request body share this wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub task_name: String,

    /// Hard deadline (UTC). Drafts without one default to "now" at add time.
    pub deadline: DateTime<Utc>,
    pub importance: Importance,

    /// Minutes.
    pub estimated_time: i64,

    /// Optional reminder; absent means no alarm armed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub completed: bool,
}

/// Unvalidated task input, as it comes off the command line.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub task_name: String,
    pub deadline: Option<DateTime<Utc>>,
    pub importance: Importance,
    pub estimated_time: i64,
    pub alarm_time: Option<DateTime<Utc>>,
}

impl TaskDraft {
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            estimated_time: 30,
            ..Self::default()
        }
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_minutes(mut self, minutes: i64) -> Self {
        self.estimated_time = minutes;
        self
    }

    pub fn with_alarm(mut self, alarm: DateTime<Utc>) -> Self {
        self.alarm_time = Some(alarm);
        self
    }

    /// Reject bad input before it reaches the store.
    pub fn validate(&self) -> Result<()> {
        if self.task_name.trim().is_empty() {
            bail!("task name is required");
        }
        if self.estimated_time <= 0 {
            bail!("estimated time must be a positive number of minutes");
        }
        Ok(())
    }

    /// Consume the draft into a stored task with a fresh id.
    ///
    /// Ids are random UUIDs, so uniqueness holds even for rapid repeated
    /// adds within one clock tick.
    pub(crate) fn into_task(self, now: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4().to_string(),
            task_name: self.task_name.trim().to_string(),
            deadline: self.deadline.unwrap_or(now),
            importance: self.importance,
            estimated_time: self.estimated_time,
            alarm_time: self.alarm_time,
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_rejected() {
        let d = TaskDraft::new("   ");
        assert!(d.validate().is_err());
    }

    #[test]
    fn zero_minutes_rejected() {
        let d = TaskDraft::new("write report").with_minutes(0);
        assert!(d.validate().is_err());
    }

    #[test]
    fn draft_defaults_deadline_to_now() {
        let now = Utc::now();
        let t = TaskDraft::new("write report").into_task(now);
        assert_eq!(t.deadline, now);
        assert!(!t.completed);
        assert!(t.alarm_time.is_none());
    }

    #[test]
    fn camel_case_wire_shape() {
        let now = Utc::now();
        let t = TaskDraft::new("write report").with_minutes(60).into_task(now);
        let json = serde_json::to_value(&t).unwrap();
        assert!(json.get("taskName").is_some());
        assert!(json.get("estimatedTime").is_some());
        // unarmed alarm stays off the wire
        assert!(json.get("alarmTime").is_none());
    }
}
