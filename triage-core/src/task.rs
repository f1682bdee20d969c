//! Task model for the scoring engine.
//!
//! `dependencies` hold indices into the same input batch, not stable ids.
//! A batch only lives for the duration of one scoring call.

use serde::{Deserialize, Serialize};

/// Raw task as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,

    /// ISO-8601 date or date-time.
    pub due_date: String,

    /// Hours.
    pub estimated_hours: f64,

    /// 1-10, higher is more important.
    pub importance: i32,

    /// Positions of other tasks in the same batch that this one waits on.
    #[serde(default)]
    pub dependencies: Vec<i64>,
}

impl Task {
    pub fn new(title: impl Into<String>, due_date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            due_date: due_date.into(),
            estimated_hours: 1.0,
            importance: 5,
            dependencies: Vec::new(),
        }
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    pub fn with_importance(mut self, importance: i32) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = i64>) -> Self {
        self.dependencies = deps.into_iter().collect();
        self
    }

    /// Dependency references that resolve to a position in a batch of `len` tasks.
    pub fn resolved_dependencies(&self, len: usize) -> impl Iterator<Item = usize> + '_ {
        self.dependencies
            .iter()
            .filter_map(move |&d| usize::try_from(d).ok().filter(|&i| i < len))
    }
}

/// A task after scoring. `id` is the task's position in the input batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTask {
    pub id: usize,
    pub title: String,
    pub due_date: String,
    pub estimated_hours: f64,
    pub importance: i32,
    pub dependencies: Vec<i64>,
    pub priority_score: Option<f64>,
    pub explanation: String,
}

impl ScoredTask {
    pub fn from_task(id: usize, task: &Task, score: f64, explanation: String) -> Self {
        Self {
            id,
            title: task.title.clone(),
            due_date: task.due_date.clone(),
            estimated_hours: task.estimated_hours,
            importance: task.importance,
            dependencies: task.dependencies.clone(),
            priority_score: Some(score),
            explanation,
        }
    }

    /// Score used for ordering; unscored counts as zero.
    pub fn score_or_zero(&self) -> f64 {
        self.priority_score.unwrap_or(0.0)
    }
}
