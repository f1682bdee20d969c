//! triage-core: priority scoring and dependency analysis for task batches

pub mod calendar;
pub mod error;
pub mod factors;
pub mod feedback;
pub mod graph;
pub mod scorer;
pub mod strategy;
pub mod task;
pub mod time;

pub use calendar::BusinessCalendar;
pub use error::TriageError;
pub use factors::{
    dependency_score, due_outlook, effort_score, importance_score, urgency_score, DueOutlook,
    NEUTRAL_URGENCY,
};
pub use feedback::{FeedbackRecord, FeedbackSnapshot, FeedbackStore, FeedbackSummary};
pub use graph::detect_circular_dependencies;
pub use scorer::{TaskScorer, DEFAULT_SUGGEST_COUNT};
pub use strategy::{Factor, FactorWeights, Strategy};
pub use task::{ScoredTask, Task};
pub use time::parse_due_date;
