use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

mod config;
mod llm;
mod notify;
mod plan;
mod state;
mod watch;

use weaver_core::{alarm_state, time, AlarmState, Importance, TaskDraft};

#[derive(Parser, Debug)]
#[command(name = "weaver", version, about = "Day Weaver: a personal task manager")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a task to the list
    Add {
        #[arg(long)]
        name: String,

        /// Deadline, RFC 3339 or "YYYY-MM-DD HH:MM" local time. Defaults to now.
        #[arg(long)]
        deadline: Option<String>,

        /// high, medium, or low
        #[arg(long, default_value = "medium")]
        importance: String,

        /// Estimated minutes to complete
        #[arg(long, default_value_t = 30)]
        minutes: i64,

        /// Optional reminder time
        #[arg(long)]
        alarm: Option<String>,
    },

    /// Show the task list
    List,

    /// Toggle a task's completion (full id or unique prefix)
    Done { id: String },

    /// Remove a task
    Remove { id: String },

    /// Set or clear a task's reminder
    Alarm {
        id: String,

        /// Reminder time, RFC 3339 or "YYYY-MM-DD HH:MM" local
        #[arg(long, conflicts_with = "clear")]
        at: Option<String>,

        /// Remove the reminder
        #[arg(long, default_value_t = false)]
        clear: bool,
    },

    /// Run the alarm monitor until Ctrl-C
    Watch {
        /// Seconds between scans (default: from config)
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Scan once and exit
        #[arg(long, default_value_t = false)]
        once: bool,
    },

    /// Ask the model for a time-boxed plan of the pending tasks
    Plan {
        /// Print the prompt and request body without calling the model
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Manage ~/.dayweaver/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;

    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Command::Add {
            name,
            deadline,
            importance,
            minutes,
            alarm,
        } => add_task(&cfg, name, deadline, importance, minutes, alarm)?,

        Command::List => list_tasks(&cfg)?,

        Command::Done { id } => toggle_task(&id)?,

        Command::Remove { id } => remove_task(&id)?,

        Command::Alarm { id, at, clear } => set_alarm(&cfg, &id, at, clear)?,

        Command::Watch {
            interval_secs,
            once,
        } => {
            let every = interval_secs.unwrap_or(cfg.alarms.poll_interval_secs);
            watch::run(every, once, cfg.alarms.on_load).await?;
        }

        Command::Plan { dry_run } => plan::run(&cfg, dry_run).await?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config(&cfg)?,
        },
    }

    Ok(())
}

fn add_task(
    cfg: &config::Config,
    name: String,
    deadline: Option<String>,
    importance: String,
    minutes: i64,
    alarm: Option<String>,
) -> Result<()> {
    let tz = &cfg.display.timezone;
    let mut draft = TaskDraft::new(name)
        .with_importance(Importance::parse(&importance)?)
        .with_minutes(minutes);

    if let Some(d) = deadline {
        draft = draft.with_deadline(time::parse_user_datetime(&d, tz)?);
    }
    if let Some(a) = alarm {
        draft = draft.with_alarm(time::parse_user_datetime(&a, tz)?);
    }

    let mut store = state::load_store()?;
    let id = store.add(draft, Utc::now())?;
    state::save_store(&store)?;

    let task = store.get(&id).expect("just added");
    println!("Added [{}] {}", short_id(&id), task.task_name);
    Ok(())
}

fn list_tasks(cfg: &config::Config) -> Result<()> {
    let store = state::load_store()?;
    if store.is_empty() {
        println!("No tasks yet. Add one with: weaver add --name \"...\"");
        return Ok(());
    }

    let tz = &cfg.display.timezone;
    let now = Utc::now();
    let pending = store.tasks().iter().filter(|t| !t.completed).count();
    println!("Today's tasks ({pending} pending)\n");

    for task in store.display_order() {
        let mark = if task.completed { "x" } else { " " };
        println!("[{mark}] {}  {}", short_id(&task.id), task.task_name);

        let alarm = match task.alarm_time {
            None => "none".to_string(),
            Some(a) => {
                let due = if a <= now && !task.completed { " (due)" } else { "" };
                let state = match alarm_state(task, &store) {
                    AlarmState::Notified => " (fired)",
                    _ => due,
                };
                format!("{}{}", time::format_local(a, tz), state)
            }
        };
        println!(
            "         due {} | {} | {} min | alarm {}",
            time::format_local(task.deadline, tz),
            task.importance.as_str(),
            task.estimated_time,
            alarm
        );
    }
    Ok(())
}

fn toggle_task(prefix: &str) -> Result<()> {
    let mut store = state::load_store()?;
    let task = store.find_by_prefix(prefix)?;
    let (id, name) = (task.id.clone(), task.task_name.clone());

    store.toggle_complete(&id);
    state::save_store(&store)?;

    let state_word = if store.get(&id).map(|t| t.completed).unwrap_or(false) {
        "done"
    } else {
        "pending"
    };
    println!("Marked [{}] {} as {}", short_id(&id), name, state_word);
    Ok(())
}

fn remove_task(prefix: &str) -> Result<()> {
    let mut store = state::load_store()?;
    let task = store.find_by_prefix(prefix)?;
    let (id, name) = (task.id.clone(), task.task_name.clone());

    store.remove(&id);
    state::save_store(&store)?;

    println!("Removed [{}] {}", short_id(&id), name);
    Ok(())
}

fn set_alarm(cfg: &config::Config, prefix: &str, at: Option<String>, clear: bool) -> Result<()> {
    if at.is_none() && !clear {
        bail!("pass --at <time> to arm a reminder or --clear to remove it");
    }

    let mut store = state::load_store()?;
    let task = store.find_by_prefix(prefix)?;
    let (id, name) = (task.id.clone(), task.task_name.clone());

    match at {
        Some(a) => {
            let when = time::parse_user_datetime(&a, &cfg.display.timezone)?;
            store.set_alarm(&id, Some(when));
            state::save_store(&store)?;
            println!(
                "Alarm set for [{}] {} at {}",
                short_id(&id),
                name,
                time::format_local(when, &cfg.display.timezone)
            );
        }
        None => {
            store.set_alarm(&id, None);
            state::save_store(&store)?;
            println!("Cleared alarm for [{}] {}", short_id(&id), name);
        }
    }
    Ok(())
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}
