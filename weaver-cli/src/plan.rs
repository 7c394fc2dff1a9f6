use anyhow::Result;

use weaver_core::{
    parse_response, BeginError, Notice, NotificationSink, Outcome, SchedulePlanner, SYSTEM_PROMPT,
};

use crate::config::Config;
use crate::llm;
use crate::notify::ConsoleSink;
use crate::state;

/// One-shot schedule request: snapshot pending tasks, ask the model for a
/// time-boxed plan, print it. Remote and validation failures are surfaced
/// as notices, never as process faults.
pub async fn run(cfg: &Config, dry_run: bool) -> Result<()> {
    let store = state::load_store()?;
    let mut planner = SchedulePlanner::new();
    let mut sink = ConsoleSink;

    let prepared = match planner.begin(&store.pending()) {
        Ok(p) => p,
        Err(BeginError::NoTasks) => {
            sink.deliver(&Notice::warning(
                "Nothing to plan",
                "Add at least one pending task first: weaver add --name \"...\"",
            ))?;
            return Ok(());
        }
        Err(e @ BeginError::RequestPending) => return Err(e.into()),
    };

    if dry_run {
        println!("{SYSTEM_PROMPT}\n\n{}", prepared.prompt);
        println!("Request body:\n{}", serde_json::to_string_pretty(&prepared.request)?);
        return Ok(());
    }

    let raw = match llm::complete(&cfg.llm, SYSTEM_PROMPT, &prepared.prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            planner.fail();
            sink.deliver(&Notice::error("Schedule request failed", format!("{e:#}")))?;
            return Ok(());
        }
    };

    let response = match parse_response(&raw) {
        Ok(r) => r,
        Err(e) => {
            planner.fail();
            sink.deliver(&Notice::error("Schedule request failed", format!("{e:#}")))?;
            return Ok(());
        }
    };

    match planner.complete(response) {
        Outcome::Empty => {
            sink.deliver(&Notice::warning(
                "Empty schedule",
                "The model returned no time slots. Re-run to try again.",
            ))?;
        }
        Outcome::Planned(n) => {
            println!("Proposed schedule ({n} slots):\n");
            for item in planner.items() {
                println!(
                    "{} to {}  {}  [{} priority, {} min]",
                    item.start_time,
                    item.end_time,
                    item.task_name,
                    item.importance.as_str(),
                    item.estimated_time
                );
            }
        }
    }

    Ok(())
}
