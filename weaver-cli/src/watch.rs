use anyhow::Result;
use chrono::Utc;
use log::warn;
use std::time::Duration;

use weaver_core::{alarm, LoadPolicy, NotificationSink, TaskStore};

use crate::notify::ConsoleSink;
use crate::state;

/// Run the alarm monitor: an immediate scan, then one scan per interval
/// tick until Ctrl-C. Each tick reloads the task file so edits made by
/// other sessions are picked up; the notified set stays in this process.
pub async fn run(interval_secs: u64, once: bool, policy: LoadPolicy) -> Result<()> {
    let mut store = state::load_store()?;
    alarm::seed_on_load(&mut store, Utc::now(), policy);

    let mut sink = ConsoleSink;

    if !once {
        println!(
            "Watching {} task(s); checking alarms every {}s. Ctrl-C to stop.",
            store.len(),
            interval_secs
        );
    }

    // First check runs right away rather than one interval in.
    tick(&mut store, &mut sink);

    if once {
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.tick().await; // interval fires immediately once; already scanned

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match state::load_tasks() {
                    Ok(tasks) => store.sync_tasks(tasks),
                    Err(e) => warn!("task reload failed; scanning last known list ({e})"),
                }
                tick(&mut store, &mut sink);
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopped.");
                break;
            }
        }
    }

    Ok(())
}

/// One scan. Delivery is best-effort: a failed notice or bell becomes a
/// warning and the alarm still counts as fired.
fn tick(store: &mut TaskStore, sink: &mut impl NotificationSink) {
    for fire in alarm::scan(store, Utc::now()) {
        if let Err(e) = sink.deliver(&fire.notice()) {
            warn!("notification delivery failed for '{}': {e}", fire.task_name);
        }
        if let Err(e) = sink.audio_cue() {
            warn!("audio cue failed: {e}");
        }
    }
}
