//! Priority aggregation: weighted combination, explanations, batch ordering.

use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use crate::calendar::BusinessCalendar;
use crate::factors::{
    dependency_score, due_outlook, effort_score, importance_score, urgency_from_outlook, DueOutlook,
    NEUTRAL_URGENCY,
};
use crate::graph::detect_circular_dependencies;
use crate::strategy::{FactorWeights, Strategy};
use crate::task::{ScoredTask, Task};
use crate::time::local_now;

pub const CIRCULAR_EXPLANATION: &str = "Circular dependency detected - needs resolution";
pub const INVALID_EXPLANATION: &str = "Invalid task data";
pub const STANDARD_EXPLANATION: &str = "Standard priority";

/// Default number of tasks returned by [`TaskScorer::suggest_top`] callers.
pub const DEFAULT_SUGGEST_COUNT: usize = 3;

/// Scores a batch of tasks under one strategy.
///
/// Uses the strategy's base weights unless `with_weights` supplies an
/// explicit set (e.g. personalized weights from a `FeedbackStore`).
#[derive(Debug, Clone)]
pub struct TaskScorer {
    strategy: Strategy,
    business_days: bool,
    calendar: BusinessCalendar,
    weights: Option<FactorWeights>,
    now: Option<NaiveDateTime>,
}

impl Default for TaskScorer {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl TaskScorer {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            business_days: true,
            calendar: BusinessCalendar::default(),
            weights: None,
            now: None,
        }
    }

    pub fn with_business_days(mut self, enabled: bool) -> Self {
        self.business_days = enabled;
        self
    }

    pub fn with_calendar(mut self, calendar: BusinessCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_weights(mut self, weights: FactorWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Evaluate against a fixed instant instead of the local clock.
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }

    pub fn weights(&self) -> FactorWeights {
        self.weights.unwrap_or_else(|| self.strategy.base_weights())
    }

    fn now(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(local_now)
    }

    /// Urgency for a single due date under this scorer's calendar settings.
    pub fn urgency_score(&self, due_date: &str) -> f64 {
        self.outlook(due_date, self.now())
            .map(|o| urgency_from_outlook(&o))
            .unwrap_or(NEUTRAL_URGENCY)
    }

    fn outlook(&self, due_date: &str, now: NaiveDateTime) -> Option<DueOutlook> {
        due_outlook(due_date, now, &self.calendar, self.business_days)
    }

    /// Score one task of a batch. Returns `(score, explanation)`.
    pub fn score_task(
        &self,
        idx: usize,
        tasks: &[Task],
        circular: &BTreeSet<usize>,
    ) -> (f64, String) {
        self.score_task_at(idx, tasks, circular, self.now())
    }

    fn score_task_at(
        &self,
        idx: usize,
        tasks: &[Task],
        circular: &BTreeSet<usize>,
        now: NaiveDateTime,
    ) -> (f64, String) {
        if circular.contains(&idx) {
            return (0.0, CIRCULAR_EXPLANATION.to_string());
        }

        let task = match tasks.get(idx) {
            Some(t) if !t.title.is_empty() && t.estimated_hours > 0.0 => t,
            _ => return (0.0, INVALID_EXPLANATION.to_string()),
        };

        let outlook = self.outlook(&task.due_date, now);
        let scores = FactorWeights {
            urgency: outlook
                .as_ref()
                .map(urgency_from_outlook)
                .unwrap_or(NEUTRAL_URGENCY),
            importance: importance_score(task.importance),
            effort: effort_score(task.estimated_hours, self.strategy),
            dependencies: dependency_score(idx, tasks),
        };

        let score = round2(self.weights().combine(&scores));
        (score, explain(task, outlook.as_ref(), scores.dependencies))
    }

    /// Score every task and order the batch by descending score.
    pub fn score_tasks(&self, tasks: &[Task]) -> Vec<ScoredTask> {
        let circular = detect_circular_dependencies(tasks);
        let now = self.now();

        let mut scored: Vec<ScoredTask> = tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| {
                let (score, explanation) = self.score_task_at(idx, tasks, &circular, now);
                ScoredTask::from_task(idx, task, score, explanation)
            })
            .collect();

        // Stable: equal scores keep input order.
        scored.sort_by(|a, b| {
            b.score_or_zero()
                .partial_cmp(&a.score_or_zero())
                .unwrap_or(Ordering::Equal)
        });

        debug!(
            strategy = %self.strategy,
            tasks = scored.len(),
            circular = circular.len(),
            "scored batch"
        );
        scored
    }

    /// Highest-scoring tasks with a strictly positive score, at most `count`.
    pub fn suggest_top(&self, tasks: &[Task], count: usize) -> Vec<ScoredTask> {
        self.score_tasks(tasks)
            .into_iter()
            .filter(|t| t.score_or_zero() > 0.0)
            .take(count)
            .collect()
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn explain(task: &Task, outlook: Option<&DueOutlook>, dependency: f64) -> String {
    let mut reasons: Vec<String> = Vec::new();

    match outlook {
        Some(o) => {
            let weekend = if o.on_weekend { " (weekend)" } else { "" };
            let days = o.days_until;
            if days < 0 {
                reasons.push(format!("OVERDUE by {} {}{weekend}", days.abs(), o.unit()));
            } else if days == 0 {
                reasons.push(format!("Due TODAY{weekend}"));
            } else if days <= 3 {
                reasons.push(format!("Due in {days} {}{weekend}", o.unit()));
            } else if days <= 7 {
                reasons.push(format!("Due this week{weekend}"));
            }
        }
        None => reasons.push("Invalid due date".to_string()),
    }

    if task.importance >= 8 {
        reasons.push(format!("High importance ({}/10)", task.importance));
    } else if task.importance >= 5 {
        reasons.push(format!("Medium importance ({}/10)", task.importance));
    }

    if task.estimated_hours <= 2.0 {
        reasons.push(format!("Quick task ({}h)", task.estimated_hours));
    } else if task.estimated_hours >= 10.0 {
        reasons.push(format!("Large task ({}h)", task.estimated_hours));
    }

    if dependency > 0.0 {
        reasons.push("Blocks other tasks".to_string());
    }

    if reasons.is_empty() {
        STANDARD_EXPLANATION.to_string()
    } else {
        reasons.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // Wednesday 2025-03-12 09:00.
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 12)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn scorer(strategy: Strategy) -> TaskScorer {
        TaskScorer::new(strategy).at(now())
    }

    #[test]
    fn test_weighted_score_and_explanation() {
        // urgency 90 (later today), importance 90, effort 70, deps 0
        let tasks = vec![
            Task::new("Fix bug", "2025-03-12T17:00:00")
                .with_hours(2.0)
                .with_importance(9),
        ];
        let (score, why) = scorer(Strategy::SmartBalance).score_task(0, &tasks, &BTreeSet::new());

        assert!((score - 72.5).abs() < 1e-9);
        assert_eq!(why, "Due in 1 business days | High importance (9/10) | Quick task (2h)");
    }

    #[test]
    fn test_circular_short_circuits() {
        let tasks = vec![Task::new("a", "2025-03-12").with_dependencies([0])];
        let scored = scorer(Strategy::SmartBalance).score_tasks(&tasks);
        assert_eq!(scored[0].priority_score, Some(0.0));
        assert_eq!(scored[0].explanation, CIRCULAR_EXPLANATION);
    }

    #[test]
    fn test_invalid_data_short_circuits() {
        let tasks = vec![
            Task::new("", "2025-03-20").with_hours(2.0),
            Task::new("zero effort", "2025-03-20").with_hours(0.0),
        ];
        let scored = scorer(Strategy::SmartBalance).score_tasks(&tasks);
        assert!(scored.iter().all(|t| t.priority_score == Some(0.0)));
        assert!(scored.iter().all(|t| t.explanation == INVALID_EXPLANATION));
    }

    #[test]
    fn test_invalid_due_date_explained() {
        let tasks = vec![
            Task::new("undated", "someday")
                .with_hours(4.0)
                .with_importance(3),
        ];
        let (score, why) = scorer(Strategy::SmartBalance).score_task(0, &tasks, &BTreeSet::new());
        // 50*.35 + 30*.30 + 80*.20
        assert!((score - 42.5).abs() < 1e-9);
        assert_eq!(why, "Invalid due date");
    }

    #[test]
    fn test_standard_priority_fallback() {
        let tasks = vec![
            Task::new("later", "2025-05-30")
                .with_hours(4.0)
                .with_importance(2),
        ];
        let (_, why) = scorer(Strategy::SmartBalance).score_task(0, &tasks, &BTreeSet::new());
        assert_eq!(why, STANDARD_EXPLANATION);
    }

    #[test]
    fn test_blocks_and_weekend_clauses() {
        let tasks = vec![
            Task::new("base", "2025-03-15")
                .with_hours(12.0)
                .with_importance(5),
            Task::new("next", "2025-03-20")
                .with_hours(4.0)
                .with_dependencies([0]),
        ];
        let (_, why) = scorer(Strategy::SmartBalance).score_task(0, &tasks, &BTreeSet::new());
        assert_eq!(
            why,
            concat!(
                "Due in 3 business days (weekend) | Medium importance (5/10) | ",
                "Large task (12h) | Blocks other tasks"
            )
        );
    }

    #[test]
    fn test_sorted_descending_and_stable() {
        let tasks = vec![
            Task::new("same-a", "2025-04-30")
                .with_hours(4.0)
                .with_importance(5),
            Task::new("urgent", "2025-03-12T17:00:00")
                .with_hours(1.0)
                .with_importance(9),
            Task::new("same-b", "2025-04-30")
                .with_hours(4.0)
                .with_importance(5),
        ];
        let scored = scorer(Strategy::SmartBalance).score_tasks(&tasks);
        let order: Vec<usize> = scored.iter().map(|t| t.id).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn test_explicit_weights_override_base() {
        let tasks = vec![
            Task::new("t", "2025-03-12T17:00:00")
                .with_hours(2.0)
                .with_importance(9),
        ];
        let only_importance = FactorWeights::new(0.0, 1.0, 0.0, 0.0);
        let (score, _) = scorer(Strategy::SmartBalance)
            .with_weights(only_importance)
            .score_task(0, &tasks, &BTreeSet::new());
        assert_eq!(score, 90.0);
    }

    #[test]
    fn test_suggest_filters_zero_scores() {
        let tasks = vec![
            Task::new("loop-a", "2025-03-12").with_dependencies([1]),
            Task::new("loop-b", "2025-03-12").with_dependencies([0]),
            Task::new("ok", "2025-03-14").with_hours(3.0),
        ];
        let top = scorer(Strategy::SmartBalance).suggest_top(&tasks, 3);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].title, "ok");
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    /// Explanation for a low-importance, mid-effort task so only the
    /// urgency clause shows.
    fn urgency_clause(now: NaiveDateTime, business_days: bool, due: &str) -> String {
        let tasks = vec![Task::new("t", due).with_hours(4.0).with_importance(3)];
        TaskScorer::new(Strategy::SmartBalance)
            .at(now)
            .with_business_days(business_days)
            .score_task(0, &tasks, &BTreeSet::new())
            .1
    }

    #[test]
    fn test_overdue_clause() {
        assert_eq!(
            urgency_clause(now(), true, "2025-03-10T09:00:00"),
            "OVERDUE by 2 business days"
        );
        // Sat 09:00 -> Wed 09:00 walks Mon and Tue.
        assert_eq!(
            urgency_clause(now(), true, "2025-03-08T09:00:00"),
            "OVERDUE by 2 business days (weekend)"
        );
        assert_eq!(urgency_clause(now(), false, "2025-03-10T09:00:00"), "OVERDUE by 2 days");
        // No weekend bonus once overdue.
        assert_eq!(scorer(Strategy::SmartBalance).urgency_score("2025-03-08T09:00:00"), 120.0);
    }

    #[test]
    fn test_due_today_clause() {
        assert_eq!(urgency_clause(now(), true, "2025-03-12T09:00:00"), "Due TODAY");
        assert_eq!(scorer(Strategy::SmartBalance).urgency_score("2025-03-12T09:00:00"), 95.0);

        let saturday = at(2025, 3, 15, 9);
        assert_eq!(
            urgency_clause(saturday, true, "2025-03-15T17:00:00"),
            "Due TODAY (weekend)"
        );
        let weekend = TaskScorer::new(Strategy::SmartBalance).at(saturday);
        assert_eq!(weekend.urgency_score("2025-03-15T17:00:00"), 105.0);
    }

    #[test]
    fn test_due_this_week_clause() {
        assert_eq!(urgency_clause(now(), true, "2025-03-19T09:00:00"), "Due this week");

        // Mon 09:00 -> Sat: five business days.
        let monday = at(2025, 3, 10, 9);
        assert_eq!(
            urgency_clause(monday, true, "2025-03-15T09:00:00"),
            "Due this week (weekend)"
        );
        let from_monday = TaskScorer::new(Strategy::SmartBalance).at(monday);
        assert_eq!(from_monday.urgency_score("2025-03-15T09:00:00"), 75.0);
    }

    #[test]
    fn test_calendar_day_unit_keeps_weekend_marker() {
        assert_eq!(urgency_clause(now(), false, "2025-03-14T09:00:00"), "Due in 2 days");
        assert_eq!(
            urgency_clause(now(), false, "2025-03-15T09:00:00"),
            "Due in 3 days (weekend)"
        );
        // Marker only; the bonus applies in business-day mode.
        let plain = scorer(Strategy::SmartBalance).with_business_days(false);
        assert_eq!(plain.urgency_score("2025-03-15T09:00:00"), 80.0);
    }

    #[test]
    fn test_urgency_bucket_edges() {
        let s = scorer(Strategy::SmartBalance);
        // Business days from Wed 2025-03-12 09:00.
        assert_eq!(s.urgency_score("2025-03-17T09:00:00"), 80.0); // 3
        assert_eq!(s.urgency_score("2025-03-18T09:00:00"), 67.5); // 4
        assert_eq!(s.urgency_score("2025-03-21T09:00:00"), 60.0); // 7
        assert_eq!(s.urgency_score("2025-04-01T09:00:00"), 41.0); // 14
        assert_eq!(s.urgency_score("2025-04-02T09:00:00"), 33.5); // 15
    }

    #[test]
    fn test_far_future_due_date_scores() {
        let tasks = vec![Task::new("far", "+262142-12-31T23:59:59").with_hours(2.0)];
        let scored = scorer(Strategy::SmartBalance).score_tasks(&tasks);
        assert_eq!(scored.len(), 1);
        assert!(scored[0].score_or_zero() > 0.0);
        assert_eq!(scorer(Strategy::SmartBalance).urgency_score("9999-12-31"), 10.0);
    }
}
