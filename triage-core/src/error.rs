//! Typed errors for the few fallible seams of the engine.
//!
//! Scoring itself never fails; these only surface from strict parsing helpers
//! that a caller layer may use for validation.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriageError {
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),

    #[error("invalid due date '{0}': expected ISO-8601 (YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS])")]
    InvalidDueDate(String),
}
