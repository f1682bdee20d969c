//! On-disk state under ~/.triage (or $TRIAGE_HOME).

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use triage_core::{FeedbackSnapshot, FeedbackStore};

pub fn triage_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TRIAGE_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set (or set TRIAGE_HOME)")?;
    Ok(PathBuf::from(home).join(".triage"))
}

pub fn ensure_triage_home() -> Result<PathBuf> {
    let dir = triage_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn feedback_path() -> Result<PathBuf> {
    Ok(ensure_triage_home()?.join("feedback.json"))
}

/// Load the persisted feedback store; a missing file means no feedback yet.
pub fn load_feedback_store() -> Result<FeedbackStore> {
    let p = feedback_path()?;
    if !p.exists() {
        return Ok(FeedbackStore::new());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let snapshot: FeedbackSnapshot =
        serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    Ok(FeedbackStore::from_snapshot(snapshot))
}

pub fn save_feedback_store(store: &FeedbackStore) -> Result<()> {
    let p = feedback_path()?;
    let json = serde_json::to_string_pretty(&store.snapshot())?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
