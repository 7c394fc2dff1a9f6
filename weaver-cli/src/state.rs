use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use weaver_core::{decode_tasks, encode_tasks, should_persist, Task, TaskStore, STORE_KEY};

pub fn weaver_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".dayweaver"))
}

pub fn ensure_weaver_home() -> Result<PathBuf> {
    let dir = weaver_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn tasks_path() -> Result<PathBuf> {
    Ok(weaver_home()?.join(format!("{STORE_KEY}.json")))
}

/// Read the persisted task list. Absent file means an empty list; corrupt
/// content is discarded by the codec rather than surfaced here.
pub fn load_tasks() -> Result<Vec<Task>> {
    let p = tasks_path()?;
    if !p.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(decode_tasks(&raw))
}

pub fn load_store() -> Result<TaskStore> {
    Ok(TaskStore::from_tasks(load_tasks()?))
}

/// Write the store back after a mutation. An empty store only overwrites a
/// file that already exists.
pub fn save_store(store: &TaskStore) -> Result<()> {
    let p = tasks_path()?;
    if !should_persist(store.len(), p.exists()) {
        return Ok(());
    }
    ensure_weaver_home()?;
    let json = encode_tasks(store.tasks())?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
