//! Schedule request planner.
//!
//! A schedule request is a one-shot pull: snapshot the pending tasks, send
//! them to the scheduling model with a fixed instruction, validate the
//! JSON it returns, and project the slots into display items. The model
//! owns the actual scheduling; nothing here repairs or re-orders its
//! output beyond shape checking.
//!
//! Slots come back keyed by task name (the model never sees ids), so the
//! join back to source tasks is exact-name, first match wins. A slot whose
//! name matches nothing falls back to neutral defaults instead of failing
//! the whole request.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::task::{Importance, Task};

/// One task as sent to the scheduling model.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub task_name: String,
    /// ISO-8601.
    pub deadline: String,
    pub importance: Importance,
    /// Minutes.
    pub estimated_time: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRequest {
    pub tasks: Vec<TaskInput>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduleResponse {
    pub schedule: Vec<ScheduleSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub task_name: String,
    pub start_time: String,
    pub end_time: String,
}

/// Display-only projection of a proposed time slot. Owned by the display
/// layer; never merged back into the task store.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledItem {
    pub id: String,
    pub task_name: String,
    pub start_time: String,
    pub end_time: String,
    pub importance: Importance,
    pub estimated_time: i64,
    pub deadline: Option<DateTime<Utc>>,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BeginError {
    #[error("no pending tasks to schedule")]
    NoTasks,
    #[error("a schedule request is already in flight")]
    RequestPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Schedule replaced with this many slots.
    Planned(usize),
    /// Well-formed but empty response; prior schedule cleared.
    Empty,
}

/// Everything the transport layer needs to run one request.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub request: ScheduleRequest,
    pub prompt: String,
}

pub const SYSTEM_PROMPT: &str =
    "You are a personal assistant helping users create an optimal daily schedule.";

/// Tracks one schedule request at a time plus the currently displayed
/// slots. `begin` clones the pending tasks, so store edits made while the
/// request is in flight cannot leak into the join.
#[derive(Debug, Default)]
pub struct SchedulePlanner {
    snapshot: Option<Vec<Task>>,
    items: Vec<ScheduledItem>,
}

impl SchedulePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn items(&self) -> &[ScheduledItem] {
        &self.items
    }

    /// Start a request over the given pending tasks. Rejected locally,
    /// before any remote call, when there is nothing to schedule or when a
    /// request is already pending.
    pub fn begin(&mut self, pending: &[Task]) -> Result<PreparedRequest, BeginError> {
        if self.in_flight() {
            return Err(BeginError::RequestPending);
        }
        if pending.is_empty() {
            return Err(BeginError::NoTasks);
        }

        let request = ScheduleRequest {
            tasks: pending
                .iter()
                .map(|t| TaskInput {
                    task_name: t.task_name.clone(),
                    deadline: t.deadline.to_rfc3339(),
                    importance: t.importance,
                    estimated_time: t.estimated_time,
                })
                .collect(),
        };
        let prompt = build_prompt(&request);
        self.snapshot = Some(pending.to_vec());

        Ok(PreparedRequest { request, prompt })
    }

    /// Finish the in-flight request with a validated response. The new
    /// slot list replaces the old one wholesale; an empty response clears
    /// the display and is reported as a soft failure.
    pub fn complete(&mut self, response: ScheduleResponse) -> Outcome {
        let snapshot = self.snapshot.take().unwrap_or_default();

        if response.schedule.is_empty() {
            self.items.clear();
            return Outcome::Empty;
        }

        self.items = response
            .schedule
            .into_iter()
            .map(|slot| {
                let origin = snapshot.iter().find(|t| t.task_name == slot.task_name);
                ScheduledItem {
                    id: Uuid::new_v4().to_string(),
                    task_name: slot.task_name,
                    start_time: slot.start_time,
                    end_time: slot.end_time,
                    importance: origin.map(|t| t.importance).unwrap_or(Importance::Medium),
                    estimated_time: origin.map(|t| t.estimated_time).unwrap_or(0),
                    deadline: origin.map(|t| t.deadline),
                    completed: false,
                }
            })
            .collect();
        Outcome::Planned(self.items.len())
    }

    /// Abort the in-flight request after a transport or validation error.
    /// The display is cleared: no partial or stale schedule survives.
    pub fn fail(&mut self) {
        self.snapshot = None;
        self.items.clear();
    }

    /// Items track their own completion, independent of the source tasks.
    pub fn toggle_item(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(i) => {
                i.completed = !i.completed;
                true
            }
            None => false,
        }
    }
}

/// Fixed instruction with the task list embedded. Demands bare JSON so the
/// response can be fed straight into `parse_response`.
fn build_prompt(request: &ScheduleRequest) -> String {
    let mut out = String::from(
        "Given the following list of tasks with their deadlines, importance, and estimated \
         time, generate a schedule that maximizes productivity and meets all deadlines. \
         Ensure the output is valid JSON of the form \
         {\"schedule\":[{\"taskName\":\"...\",\"startTime\":\"...\",\"endTime\":\"...\"}]}. \
         Do not include any conversational text or explanations.\n\nTasks:\n",
    );
    for t in &request.tasks {
        out.push_str(&format!(
            "- Task Name: {}, Deadline: {}, Importance: {}, Estimated Time: {} minutes\n",
            t.task_name,
            t.deadline,
            t.importance.as_str(),
            t.estimated_time
        ));
    }
    out
}

/// Validate raw model output against the expected shape. Tolerates a
/// Markdown code fence around the JSON; anything else that fails to parse
/// is a validation error for the caller to surface.
pub fn parse_response(raw: &str) -> Result<ScheduleResponse> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body).context("schedule response did not match the expected shape")
}

fn strip_code_fence(s: &str) -> &str {
    let t = s.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let body = match rest.rsplit_once("```") {
        Some((body, _)) => body,
        None => rest,
    };
    body.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;
    use chrono::Duration;

    fn pending(names: &[&str]) -> Vec<Task> {
        let now = Utc::now();
        names
            .iter()
            .map(|n| {
                TaskDraft::new(*n)
                    .with_deadline(now + Duration::hours(2))
                    .with_importance(Importance::High)
                    .with_minutes(45)
                    .into_task(now)
            })
            .collect()
    }

    fn slot(name: &str) -> ScheduleSlot {
        ScheduleSlot {
            task_name: name.to_string(),
            start_time: "09:00".to_string(),
            end_time: "09:45".to_string(),
        }
    }

    #[test]
    fn no_pending_tasks_rejected_locally() {
        let mut p = SchedulePlanner::new();
        assert_eq!(p.begin(&[]).unwrap_err(), BeginError::NoTasks);
        assert!(!p.in_flight());
    }

    #[test]
    fn second_request_blocked_while_pending() {
        let mut p = SchedulePlanner::new();
        let tasks = pending(&["a"]);
        assert!(p.begin(&tasks).is_ok());
        assert_eq!(p.begin(&tasks).unwrap_err(), BeginError::RequestPending);
    }

    #[test]
    fn prompt_embeds_each_task() {
        let mut p = SchedulePlanner::new();
        let prepared = p.begin(&pending(&["write report", "call john"])).unwrap();
        assert!(prepared.prompt.contains("Task Name: write report"));
        assert!(prepared.prompt.contains("Task Name: call john"));
        assert!(prepared.prompt.contains("valid JSON"));
    }

    #[test]
    fn request_serializes_camel_case() {
        let mut p = SchedulePlanner::new();
        let prepared = p.begin(&pending(&["a"])).unwrap();
        let v = serde_json::to_value(&prepared.request).unwrap();
        let t = &v["tasks"][0];
        assert!(t.get("taskName").is_some());
        assert!(t.get("estimatedTime").is_some());
        assert_eq!(t["importance"], "high");
    }

    #[test]
    fn empty_schedule_clears_display_as_soft_failure() {
        let mut p = SchedulePlanner::new();
        let tasks = pending(&["a"]);
        p.begin(&tasks).unwrap();
        p.complete(ScheduleResponse { schedule: vec![slot("a")] });
        assert_eq!(p.items().len(), 1);

        p.begin(&tasks).unwrap();
        let out = p.complete(ScheduleResponse { schedule: vec![] });
        assert_eq!(out, Outcome::Empty);
        assert!(p.items().is_empty());
        assert!(!p.in_flight());
    }

    #[test]
    fn matched_slot_copies_source_fields() {
        let mut p = SchedulePlanner::new();
        let tasks = pending(&["write report"]);
        p.begin(&tasks).unwrap();
        let out = p.complete(ScheduleResponse { schedule: vec![slot("write report")] });

        assert_eq!(out, Outcome::Planned(1));
        let item = &p.items()[0];
        assert_eq!(item.importance, Importance::High);
        assert_eq!(item.estimated_time, 45);
        assert_eq!(item.deadline, Some(tasks[0].deadline));
        assert!(!item.completed);
        assert_ne!(item.id, tasks[0].id);
    }

    #[test]
    fn unmatched_slot_falls_back_to_defaults() {
        let mut p = SchedulePlanner::new();
        p.begin(&pending(&["write report"])).unwrap();
        let out = p.complete(ScheduleResponse {
            schedule: vec![slot("invented by the model")],
        });

        assert_eq!(out, Outcome::Planned(1));
        let item = &p.items()[0];
        assert_eq!(item.importance, Importance::Medium);
        assert_eq!(item.estimated_time, 0);
        assert_eq!(item.deadline, None);
    }

    #[test]
    fn failure_clears_prior_schedule() {
        let mut p = SchedulePlanner::new();
        let tasks = pending(&["a"]);
        p.begin(&tasks).unwrap();
        p.complete(ScheduleResponse { schedule: vec![slot("a")] });
        assert!(!p.items().is_empty());

        p.begin(&tasks).unwrap();
        p.fail();
        assert!(p.items().is_empty());
        assert!(!p.in_flight());
    }

    #[test]
    fn item_completion_toggles_independently() {
        let mut p = SchedulePlanner::new();
        p.begin(&pending(&["a"])).unwrap();
        p.complete(ScheduleResponse { schedule: vec![slot("a")] });
        let id = p.items()[0].id.clone();

        assert!(p.toggle_item(&id));
        assert!(p.items()[0].completed);
        assert!(!p.toggle_item("missing"));
    }

    #[test]
    fn parse_accepts_bare_and_fenced_json() {
        let raw = r#"{"schedule":[{"taskName":"a","startTime":"09:00","endTime":"10:00"}]}"#;
        assert_eq!(parse_response(raw).unwrap().schedule.len(), 1);

        let fenced = format!("```json\n{raw}\n```");
        assert_eq!(parse_response(&fenced).unwrap().schedule.len(), 1);
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        assert!(parse_response("here is your schedule!").is_err());
        assert!(parse_response(r#"{"schedule": "busy day"}"#).is_err());
    }
}
