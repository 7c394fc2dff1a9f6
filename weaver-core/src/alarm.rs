//! Alarm monitor — one-shot reminder notifications over the task store.
//!
//! Per task the alarm lifecycle is a small state machine:
//!
//! `Unarmed` (no alarm set) -> `Armed` (alarm set, not yet fired)
//! -> `Notified` (fired once this session).
//!
//! A scan tick fires every armed, incomplete task whose alarm time has
//! passed, exactly once per arm cycle. Completing a task suppresses the
//! notification without consuming it: un-complete the task before it fires
//! and it remains eligible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notify::Notice;
use crate::store::TaskStore;
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Unarmed,
    Armed,
    Notified,
}

/// What to do with alarms that are already in the past when a persisted
/// task list is loaded. Both behaviors exist in the wild; the choice is a
/// config knob rather than a hardcoded policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadPolicy {
    /// Let already-due, incomplete alarms fire on the first scan.
    #[default]
    RefireDue,
    /// Seed the notified set with every already-due alarm so only alarms
    /// that come due after startup fire.
    MuteStale,
}

/// An alarm that came due on this scan. The caller delivers it; the state
/// transition has already happened (at most one delivery attempt per arm
/// cycle, even if delivery fails).
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmFire {
    pub task_id: String,
    pub task_name: String,
    pub alarm_time: DateTime<Utc>,
}

impl AlarmFire {
    pub fn notice(&self) -> Notice {
        Notice::info("Alarm!", format!("Time for: {}", self.task_name))
    }
}

pub fn alarm_state(task: &Task, store: &TaskStore) -> AlarmState {
    match task.alarm_time {
        None => AlarmState::Unarmed,
        Some(_) if store.is_notified(&task.id) => AlarmState::Notified,
        Some(_) => AlarmState::Armed,
    }
}

/// Apply the startup policy to a freshly loaded store.
pub fn seed_on_load(store: &mut TaskStore, now: DateTime<Utc>, policy: LoadPolicy) {
    if policy == LoadPolicy::RefireDue {
        return;
    }
    let stale: Vec<String> = store
        .tasks()
        .iter()
        .filter(|t| t.alarm_time.map(|a| a <= now).unwrap_or(false))
        .map(|t| t.id.clone())
        .collect();
    for id in stale {
        store.mark_notified(&id);
    }
}

/// One monitor tick: scan every task once, fire due alarms, record them as
/// notified. O(n) in task count, which is fine at to-do-list scale.
pub fn scan(store: &mut TaskStore, now: DateTime<Utc>) -> Vec<AlarmFire> {
    let due: Vec<AlarmFire> = store
        .tasks()
        .iter()
        .filter(|t| !t.completed && !store.is_notified(&t.id))
        .filter_map(|t| {
            let alarm = t.alarm_time?;
            (alarm <= now).then(|| AlarmFire {
                task_id: t.id.clone(),
                task_name: t.task_name.clone(),
                alarm_time: alarm,
            })
        })
        .collect();

    for fire in &due {
        store.mark_notified(&fire.task_id);
    }
    due
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;
    use chrono::Duration;

    fn armed_store(now: DateTime<Utc>, alarm: DateTime<Utc>) -> (TaskStore, String) {
        let mut s = TaskStore::new();
        let id = s
            .add(TaskDraft::new("stretch").with_alarm(alarm), now)
            .unwrap();
        (s, id)
    }

    #[test]
    fn due_alarm_fires_exactly_once() {
        let now = Utc::now();
        let (mut s, id) = armed_store(now, now - Duration::minutes(1));

        let fired = scan(&mut s, now);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].task_id, id);
        assert_eq!(alarm_state(s.get(&id).unwrap(), &s), AlarmState::Notified);

        assert!(scan(&mut s, now + Duration::seconds(10)).is_empty());
    }

    #[test]
    fn future_alarm_waits() {
        let now = Utc::now();
        let (mut s, id) = armed_store(now, now + Duration::minutes(5));
        assert!(scan(&mut s, now).is_empty());
        assert_eq!(alarm_state(s.get(&id).unwrap(), &s), AlarmState::Armed);
    }

    #[test]
    fn rearmed_alarm_fires_again() {
        let now = Utc::now();
        let (mut s, id) = armed_store(now, now - Duration::minutes(1));
        assert_eq!(scan(&mut s, now).len(), 1);

        s.set_alarm(&id, Some(now + Duration::minutes(1)));
        assert!(scan(&mut s, now).is_empty());
        assert_eq!(scan(&mut s, now + Duration::minutes(2)).len(), 1);
    }

    #[test]
    fn completed_task_is_suppressed_not_consumed() {
        let now = Utc::now();
        let (mut s, id) = armed_store(now, now - Duration::minutes(1));
        s.toggle_complete(&id);

        assert!(scan(&mut s, now).is_empty());
        // suppressed, not Notified
        assert_eq!(alarm_state(s.get(&id).unwrap(), &s), AlarmState::Armed);

        // un-complete before firing: still eligible
        s.toggle_complete(&id);
        assert_eq!(scan(&mut s, now).len(), 1);
    }

    #[test]
    fn unarmed_task_never_fires() {
        let now = Utc::now();
        let mut s = TaskStore::new();
        let id = s.add(TaskDraft::new("no alarm"), now).unwrap();
        assert!(scan(&mut s, now).is_empty());
        assert_eq!(alarm_state(s.get(&id).unwrap(), &s), AlarmState::Unarmed);
    }

    #[test]
    fn mute_stale_seeds_already_due() {
        let now = Utc::now();
        let (mut s, _) = armed_store(now, now - Duration::hours(1));
        seed_on_load(&mut s, now, LoadPolicy::MuteStale);
        assert!(scan(&mut s, now).is_empty());
    }

    #[test]
    fn refire_due_lets_stale_alarms_fire() {
        let now = Utc::now();
        let (mut s, _) = armed_store(now, now - Duration::hours(1));
        seed_on_load(&mut s, now, LoadPolicy::RefireDue);
        assert_eq!(scan(&mut s, now).len(), 1);
    }
}
