use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;
use triage_core::{BusinessCalendar, Strategy, DEFAULT_SUGGEST_COUNT};

use crate::state::ensure_triage_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringSection,
    #[serde(default)]
    pub calendar: CalendarSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSection {
    /// One of smart_balance, fastest_wins, high_impact, deadline_driven.
    pub strategy: String,
    /// Count urgency in business days (weekends and holidays skipped).
    pub business_days: bool,
    pub suggest_count: usize,
}

impl Default for ScoringSection {
    fn default() -> Self {
        Self {
            strategy: Strategy::default().to_string(),
            business_days: true,
            suggest_count: DEFAULT_SUGGEST_COUNT,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSection {
    /// YYYY-MM-DD. Empty keeps the built-in list.
    pub holidays: Vec<String>,
}

impl Config {
    pub fn calendar(&self) -> BusinessCalendar {
        if self.calendar.holidays.is_empty() {
            return BusinessCalendar::default();
        }

        let dates = self.calendar.holidays.iter().filter_map(|raw| {
            match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(e) => {
                    warn!(holiday = %raw, error = %e, "skipping unparsable holiday");
                    None
                }
            }
        });
        BusinessCalendar::new(dates)
    }

    /// `config.toml` under the triage home directory.
    pub fn path() -> Result<PathBuf> {
        Ok(ensure_triage_home()?.join("config.toml"))
    }

    /// Reads the user config; a missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };
        toml::from_str(&raw).with_context(|| format!("parse {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let body = toml::to_string_pretty(self).context("serialize config")?;
        fs::write(path, body).with_context(|| format!("write {}", path.display()))
    }

    /// Writes defaults to `path` unless a config is already there.
    /// Returns whether a file was created.
    pub fn init_at(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }
}
