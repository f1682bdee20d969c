//! Strategy profiles and factor weights.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TriageError;

/// Named weighting profile. Declaration order is the tie-break order for
/// feedback-based recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    SmartBalance,
    FastestWins,
    HighImpact,
    DeadlineDriven,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::SmartBalance,
        Strategy::FastestWins,
        Strategy::HighImpact,
        Strategy::DeadlineDriven,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::SmartBalance => "smart_balance",
            Strategy::FastestWins => "fastest_wins",
            Strategy::HighImpact => "high_impact",
            Strategy::DeadlineDriven => "deadline_driven",
        }
    }

    /// Lenient parse: anything unrecognized becomes `smart_balance`.
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    pub fn base_weights(&self) -> FactorWeights {
        match self {
            Strategy::SmartBalance => FactorWeights::new(0.35, 0.30, 0.20, 0.15),
            Strategy::FastestWins => FactorWeights::new(0.25, 0.20, 0.40, 0.15),
            Strategy::HighImpact => FactorWeights::new(0.20, 0.50, 0.15, 0.15),
            Strategy::DeadlineDriven => FactorWeights::new(0.50, 0.25, 0.10, 0.15),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|st| st.as_str() == s.trim())
            .ok_or_else(|| TriageError::UnknownStrategy(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Urgency,
    Importance,
    Effort,
    Dependencies,
}

impl Factor {
    pub const ALL: [Factor; 4] = [
        Factor::Urgency,
        Factor::Importance,
        Factor::Effort,
        Factor::Dependencies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Urgency => "urgency",
            Factor::Importance => "importance",
            Factor::Effort => "effort",
            Factor::Dependencies => "dependencies",
        }
    }
}

/// One value per factor. Used both for weights and for accumulated
/// feedback deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FactorWeights {
    pub urgency: f64,
    pub importance: f64,
    pub effort: f64,
    pub dependencies: f64,
}

impl FactorWeights {
    pub const fn new(urgency: f64, importance: f64, effort: f64, dependencies: f64) -> Self {
        Self {
            urgency,
            importance,
            effort,
            dependencies,
        }
    }

    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Urgency => self.urgency,
            Factor::Importance => self.importance,
            Factor::Effort => self.effort,
            Factor::Dependencies => self.dependencies,
        }
    }

    pub fn get_mut(&mut self, factor: Factor) -> &mut f64 {
        match factor {
            Factor::Urgency => &mut self.urgency,
            Factor::Importance => &mut self.importance,
            Factor::Effort => &mut self.effort,
            Factor::Dependencies => &mut self.dependencies,
        }
    }

    pub fn sum(&self) -> f64 {
        Factor::ALL.iter().map(|&f| self.get(f)).sum()
    }

    /// Element-wise addition.
    pub fn plus(mut self, other: &FactorWeights) -> Self {
        for f in Factor::ALL {
            *self.get_mut(f) += other.get(f);
        }
        self
    }

    /// Scale so the four values sum to 1.0. Left as-is when the sum is not positive.
    pub fn normalized(mut self) -> Self {
        let total = self.sum();
        if total > 0.0 {
            for f in Factor::ALL {
                *self.get_mut(f) /= total;
            }
        }
        self
    }

    /// Weighted sum of the given factor scores.
    pub fn combine(&self, scores: &FactorWeights) -> f64 {
        Factor::ALL.iter().map(|&f| self.get(f) * scores.get(f)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_weights_sum_to_one() {
        for s in Strategy::ALL {
            assert!((s.base_weights().sum() - 1.0).abs() < 1e-9, "{s}");
        }
    }

    #[test]
    fn test_parse_strict_and_lenient() {
        assert_eq!("deadline_driven".parse::<Strategy>().unwrap(), Strategy::DeadlineDriven);
        assert_eq!(
            "yolo".parse::<Strategy>().unwrap_err(),
            TriageError::UnknownStrategy("yolo".to_string())
        );
        assert_eq!(Strategy::parse_or_default("yolo"), Strategy::SmartBalance);
        assert_eq!(Strategy::parse_or_default("high_impact"), Strategy::HighImpact);
    }

    #[test]
    fn test_normalized_skips_non_positive_total() {
        let w = FactorWeights::new(-0.1, 0.05, 0.0, 0.0).normalized();
        assert_eq!(w, FactorWeights::new(-0.1, 0.05, 0.0, 0.0));

        let w = FactorWeights::new(0.5, 0.5, 0.5, 0.5).normalized();
        assert!((w.urgency - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Strategy::FastestWins).unwrap();
        assert_eq!(json, "\"fastest_wins\"");
    }
}
