//! Feedback store: learns per-factor weight deltas from helpful / not-helpful
//! signals on suggestions.
//!
//! The store is an explicit object shared by reference. All mutation goes
//! through `record_feedback`, which holds the write lock for the whole
//! read-modify-write; readers see a consistent snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::strategy::{Factor, FactorWeights, Strategy};

/// Step applied per feedback event.
pub const ADJUSTMENT_STEP: f64 = 0.02;
/// Accumulated deltas stay within +/- this bound.
pub const ADJUSTMENT_LIMIT: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub task_title: String,
    pub was_helpful: bool,
    pub strategy_used: Strategy,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub total_feedback: usize,
    pub helpful_count: usize,
    pub helpful_percentage: f64,
    pub recommended_strategy: Strategy,
    pub weight_adjustments: FactorWeights,
    pub strategy_preferences: BTreeMap<Strategy, i64>,
}

/// Full store state. Serializable so a front end can carry it between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSnapshot {
    pub history: Vec<FeedbackRecord>,
    pub strategy_preferences: BTreeMap<Strategy, i64>,
    pub weight_adjustments: FactorWeights,
}

impl Default for FeedbackSnapshot {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            strategy_preferences: Strategy::ALL.into_iter().map(|s| (s, 0)).collect(),
            weight_adjustments: FactorWeights::default(),
        }
    }
}

impl FeedbackSnapshot {
    fn apply(&mut self, record: FeedbackRecord) {
        let strategy = record.strategy_used;
        let helpful = record.was_helpful;
        self.history.push(record);

        *self.strategy_preferences.entry(strategy).or_insert(0) += if helpful { 1 } else { -1 };

        let step = if helpful { ADJUSTMENT_STEP } else { -ADJUSTMENT_STEP };
        let adj = &mut self.weight_adjustments;
        match strategy {
            Strategy::DeadlineDriven => adj.urgency += step,
            Strategy::HighImpact => adj.importance += step,
            Strategy::FastestWins => adj.effort += step,
            Strategy::SmartBalance => {
                for f in Factor::ALL {
                    *adj.get_mut(f) += step / 4.0;
                }
            }
        }

        for f in Factor::ALL {
            let v = adj.get_mut(f);
            *v = v.clamp(-ADJUSTMENT_LIMIT, ADJUSTMENT_LIMIT);
        }
    }

    fn recommended_strategy(&self) -> Strategy {
        // First strategy (in declaration order) holding the maximum wins.
        let mut best: Option<(Strategy, i64)> = None;
        for s in Strategy::ALL {
            let count = self.strategy_preferences.get(&s).copied().unwrap_or(0);
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((s, count));
            }
        }

        match best {
            Some((s, c)) if c > 0 => s,
            _ => Strategy::SmartBalance,
        }
    }
}

#[derive(Debug, Default)]
pub struct FeedbackStore {
    state: RwLock<FeedbackSnapshot>,
}

impl FeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: FeedbackSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    // Every write completes its update before releasing the lock, so a
    // poisoned lock still guards valid state.
    fn read(&self) -> RwLockReadGuard<'_, FeedbackSnapshot> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FeedbackSnapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_feedback(
        &self,
        task_title: impl Into<String>,
        was_helpful: bool,
        strategy: Strategy,
    ) {
        self.record_feedback_at(task_title, was_helpful, strategy, Utc::now());
    }

    pub fn record_feedback_at(
        &self,
        task_title: impl Into<String>,
        was_helpful: bool,
        strategy: Strategy,
        timestamp: DateTime<Utc>,
    ) {
        let record = FeedbackRecord {
            task_title: task_title.into(),
            was_helpful,
            strategy_used: strategy,
            timestamp,
        };

        let mut state = self.write();
        state.apply(record);
        info!(
            %strategy,
            was_helpful,
            total = state.history.len(),
            "recorded feedback"
        );
    }

    pub fn weight_adjustments(&self) -> FactorWeights {
        self.read().weight_adjustments
    }

    /// Base weights for `strategy` plus learned deltas, renormalized to sum 1.0.
    pub fn personalized_weights(&self, strategy: Strategy) -> FactorWeights {
        let adjustments = self.weight_adjustments();
        strategy.base_weights().plus(&adjustments).normalized()
    }

    pub fn recommended_strategy(&self) -> Strategy {
        self.read().recommended_strategy()
    }

    pub fn summary(&self) -> FeedbackSummary {
        let state = self.read();
        let total = state.history.len();
        let helpful = state.history.iter().filter(|r| r.was_helpful).count();
        let percentage = if total == 0 {
            0.0
        } else {
            (helpful as f64 / total as f64 * 1000.0).round() / 10.0
        };

        FeedbackSummary {
            total_feedback: total,
            helpful_count: helpful,
            helpful_percentage: percentage,
            recommended_strategy: state.recommended_strategy(),
            weight_adjustments: state.weight_adjustments,
            strategy_preferences: state.strategy_preferences.clone(),
        }
    }

    pub fn history(&self) -> Vec<FeedbackRecord> {
        self.read().history.clone()
    }

    pub fn snapshot(&self) -> FeedbackSnapshot {
        self.read().clone()
    }
}
