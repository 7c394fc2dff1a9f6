use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use weaver_core::LoadPolicy;

use crate::state::ensure_weaver_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmSection,
    pub alarms: AlarmSection,
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    /// "anthropic" or "openai". API keys come from ANTHROPIC_API_KEY /
    /// OPENAI_API_KEY.
    pub provider: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmSection {
    pub poll_interval_secs: u64,
    pub on_load: LoadPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySection {
    /// IANA timezone used to parse and render local times.
    pub timezone: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmSection {
                provider: "anthropic".to_string(),
                model: "claude-3-5-sonnet-latest".to_string(),
                temperature: 0.4,
            },
            alarms: AlarmSection {
                poll_interval_secs: 10,
                on_load: LoadPolicy::default(),
            },
            display: DisplaySection {
                timezone: "America/Chicago".to_string(),
            },
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_weaver_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    println!("Config file: {}\n", p.display());
    println!("[llm]");
    println!("- provider: {}", cfg.llm.provider);
    println!("- model: {}", cfg.llm.model);
    println!("- temperature: {}", cfg.llm.temperature);
    println!("[alarms]");
    println!("- poll_interval_secs: {}", cfg.alarms.poll_interval_secs);
    println!("- on_load: {:?}", cfg.alarms.on_load);
    println!("[display]");
    println!("- timezone: {}", cfg.display.timezone);
    Ok(())
}
