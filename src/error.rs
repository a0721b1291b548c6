//! Error Types
//!
//! Every failure a probe or a budget check can produce. The workload's own
//! error type is carried through untouched in [`EyeError::Workload`].

use std::convert::Infallible;

use thiserror::Error;

use crate::assertion::Dimension;

/// Failure of a probe run or budget assertion.
///
/// `E` is the workload's error type. Infallible workloads (plain closures)
/// use the default, so `EyeError` on its own never carries a workload error.
#[derive(Debug, Error)]
pub enum EyeError<E = Infallible> {
    /// The workload returned an error. It is passed back unchanged.
    #[error("workload failed: {0}")]
    Workload(E),

    /// A completed measurement exceeded the caller's limit.
    #[error("{dimension} budget exceeded: observed {observed}, limit {limit}")]
    BudgetExceeded {
        dimension: Dimension,
        limit: f64,
        observed: f64,
    },

    /// Rejected before the workload ran.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A workload tried to start another probe on the same thread.
    #[error("probe '{0}' started inside another probe on the same thread")]
    NestedProbe(String),

    /// The current process could not be inspected.
    #[error("resource sampling unavailable: {0}")]
    Sampling(String),
}

impl<E> EyeError<E> {
    /// Returns true for [`EyeError::BudgetExceeded`].
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, EyeError::BudgetExceeded { .. })
    }

    /// Returns the dimension that was exceeded, if any.
    pub fn exceeded_dimension(&self) -> Option<Dimension> {
        match self {
            EyeError::BudgetExceeded { dimension, .. } => Some(*dimension),
            _ => None,
        }
    }

    /// Consumes the error and returns the workload's own error, if that is
    /// what failed.
    pub fn into_workload(self) -> Option<E> {
        match self {
            EyeError::Workload(e) => Some(e),
            _ => None,
        }
    }
}

impl EyeError {
    /// Widens a probe-level error into one that can carry a workload error.
    ///
    /// The infallible variant cannot occur, so the match is exhaustive
    /// without a workload arm producing a value.
    pub fn widen<E>(self) -> EyeError<E> {
        match self {
            EyeError::Workload(never) => match never {},
            EyeError::BudgetExceeded {
                dimension,
                limit,
                observed,
            } => EyeError::BudgetExceeded {
                dimension,
                limit,
                observed,
            },
            EyeError::InvalidInput(msg) => EyeError::InvalidInput(msg),
            EyeError::NestedProbe(label) => EyeError::NestedProbe(label),
            EyeError::Sampling(msg) => EyeError::Sampling(msg),
        }
    }
}
