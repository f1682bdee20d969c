//! Load task batches from JSON or CSV files.
//!
//! CSV header: title,due_date,estimated_hours,importance,dependencies
//! where dependencies is a `;`-separated list of batch positions.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::Path;
use triage_core::{parse_due_date, Task};

#[derive(Debug, Deserialize)]
struct CsvRow {
    title: String,
    due_date: String,
    estimated_hours: f64,
    importance: i32,
    #[serde(default)]
    dependencies: String,
}

const MAX_TITLE_LEN: usize = 200;

pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let tasks = if is_csv {
        let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let tasks = parse_tasks_csv(file).with_context(|| format!("parsing {}", path.display()))?;
        // +2: header line, 1-based numbering
        validate_tasks(&tasks, |idx| format!("row {}", idx + 2))
            .with_context(|| format!("invalid task in {}", path.display()))?;
        tasks
    } else {
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let tasks = parse_tasks_json(&s).with_context(|| format!("parsing {}", path.display()))?;
        validate_tasks(&tasks, |idx| format!("task {idx}"))
            .with_context(|| format!("invalid task in {}", path.display()))?;
        tasks
    };

    if tasks.is_empty() {
        bail!("No tasks provided in {}", path.display());
    }
    Ok(tasks)
}

/// Field presence and range checks the scorer expects to have been done.
/// `label` names a task by position for error messages.
pub fn validate_tasks(tasks: &[Task], label: impl Fn(usize) -> String) -> Result<()> {
    for (idx, task) in tasks.iter().enumerate() {
        validate_task(task).with_context(|| label(idx))?;
    }
    Ok(())
}

fn validate_task(task: &Task) -> Result<()> {
    if task.title.is_empty() {
        bail!("title must not be empty");
    }
    if task.title.chars().count() > MAX_TITLE_LEN {
        bail!("title longer than {MAX_TITLE_LEN} characters");
    }
    if task.estimated_hours.is_nan() || task.estimated_hours <= 0.0 {
        bail!("estimated_hours must be greater than 0 (got {})", task.estimated_hours);
    }
    if !(1..=10).contains(&task.importance) {
        bail!("importance must be between 1 and 10 (got {})", task.importance);
    }
    parse_due_date(&task.due_date)?;
    Ok(())
}

/// Accepts either a bare array of tasks or `{ "tasks": [...] }`.
pub fn parse_tasks_json(s: &str) -> Result<Vec<Task>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Batch {
        Bare(Vec<Task>),
        Wrapped { tasks: Vec<Task> },
    }

    let batch: Batch = serde_json::from_str(s).context("expected a JSON array of tasks")?;
    Ok(match batch {
        Batch::Bare(tasks) | Batch::Wrapped { tasks } => tasks,
    })
}

pub fn parse_tasks_csv<R: Read>(reader: R) -> Result<Vec<Task>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut tasks = Vec::new();
    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        // +2: header line, 1-based numbering
        let row = row.with_context(|| format!("row {}", i + 2))?;
        let dependencies = parse_dependency_list(&row.dependencies)
            .with_context(|| format!("row {}: dependencies", i + 2))?;

        tasks.push(Task {
            title: row.title,
            due_date: row.due_date,
            estimated_hours: row.estimated_hours,
            importance: row.importance,
            dependencies,
        });
    }
    Ok(tasks)
}

fn parse_dependency_list(raw: &str) -> Result<Vec<i64>> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().with_context(|| format!("not an index: '{s}'")))
        .collect()
}
