//! weaver-core: task list, alarms, persistence policy, and schedule
//! planning for Day Weaver.

pub mod alarm;
pub mod notify;
pub mod persist;
pub mod schedule;
pub mod store;
pub mod task;
pub mod time;

pub use alarm::{alarm_state, scan, seed_on_load, AlarmFire, AlarmState, LoadPolicy};
pub use notify::{Notice, NotificationSink, Severity};
pub use persist::{decode_tasks, encode_tasks, should_persist, STORE_KEY};
pub use schedule::{
    parse_response, BeginError, Outcome, PreparedRequest, ScheduleRequest, ScheduleResponse,
    ScheduleSlot, SchedulePlanner, ScheduledItem, TaskInput, SYSTEM_PROMPT,
};
pub use store::TaskStore;
pub use task::{Importance, Task, TaskDraft};
