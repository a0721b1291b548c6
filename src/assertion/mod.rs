//! Assertion Module
//!
//! Budget checks on top of the probe.
//!
//! - [`Dimension`] / [`Budget`]: what is limited and by how much
//! - [`gate`]: [`BudgetGate`], a probe with budgets attached
//! - [`assert_within_budget`] / [`assert_algo_eye`]: one-call assertions

pub mod gate;

pub use gate::BudgetGate;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EyeError;
use crate::monitoring::EyeProgress;
use crate::probe::Measurement;

/// The measurement field a budget applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Wall-clock time in milliseconds
    Execution,
    /// Resident memory growth in bytes
    Memory,
    /// Bytes read plus written
    Io,
}

impl Dimension {
    /// Position in the gate's evaluation order.
    fn check_order(self) -> u8 {
        match self {
            Dimension::Memory => 0,
            Dimension::Execution => 1,
            Dimension::Io => 2,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Execution => "execution",
            Dimension::Memory => "memory",
            Dimension::Io => "io",
        };
        f.write_str(name)
    }
}

/// An upper limit on one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub dimension: Dimension,
    pub limit: f64,
}

impl Budget {
    /// Creates a budget, rejecting negative or NaN limits.
    pub fn new(dimension: Dimension, limit: f64) -> Result<Self, EyeError> {
        let budget = Self { dimension, limit };
        budget.validate()?;
        Ok(budget)
    }

    /// Fails with [`EyeError::InvalidInput`] for a negative or NaN limit.
    pub fn validate(&self) -> Result<(), EyeError> {
        if self.limit.is_nan() || self.limit < 0.0 {
            return Err(EyeError::InvalidInput(format!(
                "{} limit must be a non-negative number, got {}",
                self.dimension, self.limit
            )));
        }
        Ok(())
    }

    /// Fails with [`EyeError::BudgetExceeded`] when the measured value is
    /// strictly greater than the limit.
    pub fn check(&self, measurement: &Measurement) -> Result<(), EyeError> {
        let observed = measurement.observed(self.dimension);
        if observed > self.limit {
            return Err(EyeError::BudgetExceeded {
                dimension: self.dimension,
                limit: self.limit,
                observed,
            });
        }
        Ok(())
    }
}

/// Runs `workload` and fails if `dimension` ends up above `limit`.
///
/// ```rust,no_run
/// use algoeye::{assert_within_budget, Dimension, EyeError};
/// use std::{thread, time::Duration};
///
/// let result = assert_within_budget(Dimension::Execution, 100.0, |_| {
///     thread::sleep(Duration::from_millis(1000));
/// });
/// assert!(matches!(result, Err(EyeError::BudgetExceeded { .. })));
/// ```
pub fn assert_within_budget<F>(
    dimension: Dimension,
    limit: f64,
    workload: F,
) -> Result<(), EyeError>
where
    F: FnOnce(&mut EyeProgress),
{
    BudgetGate::new(format!("{} budget", dimension))
        .budget(dimension, limit)
        .run(workload)
        .map(|_| ())
}

/// Fallible-workload form of [`assert_within_budget`].
pub fn try_assert_within_budget<F, E>(
    dimension: Dimension,
    limit: f64,
    workload: F,
) -> Result<(), EyeError<E>>
where
    F: FnOnce(&mut EyeProgress) -> Result<(), E>,
{
    BudgetGate::new(format!("{} budget", dimension))
        .budget(dimension, limit)
        .try_run(workload)
        .map(|_| ())
}

/// Runs `workload` under a memory and an execution-time budget.
///
/// Memory growth is checked before execution time.
pub fn assert_algo_eye<F>(
    label: &str,
    memory_limit_bytes: u64,
    execution_limit_millis: u64,
    workload: F,
) -> Result<Measurement, EyeError>
where
    F: FnOnce(&mut EyeProgress),
{
    BudgetGate::new(label)
        .memory(memory_limit_bytes)
        .execution(execution_limit_millis)
        .run(workload)
}
