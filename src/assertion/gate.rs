//! Budget Gate
//!
//! Runs a probe and compares the finished measurement against one or more
//! budgets. Checks happen after the workload has completed; nothing is
//! interrupted early.

use log::{debug, warn};

use crate::error::EyeError;
use crate::monitoring::EyeProgress;
use crate::probe::{Measurement, ResourceProbe};

use super::{Budget, Dimension};

/// A probe with a set of budgets attached.
///
/// Budgets are evaluated memory first, then execution time, then I/O; the
/// first one exceeded is reported.
///
/// ```rust,no_run
/// use algoeye::{mb_to_byte, BudgetGate};
///
/// let measurement = BudgetGate::new("reverse 100k")
///     .memory(mb_to_byte(10))
///     .execution(50)
///     .run(|_| {
///         let _ = (0..100_000).rev().collect::<Vec<u32>>();
///     })?;
/// # let _ = measurement;
/// # Ok::<(), algoeye::EyeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BudgetGate {
    label: String,
    budgets: Vec<Budget>,
    probe: ResourceProbe,
}

impl BudgetGate {
    /// Creates a gate with no budgets using the default probe.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            budgets: Vec::new(),
            probe: ResourceProbe::new(),
        }
    }

    /// Measures with `probe` instead of the default one.
    pub fn with_probe(mut self, probe: ResourceProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Adds a budget on any dimension.
    pub fn budget(mut self, dimension: Dimension, limit: f64) -> Self {
        self.budgets.push(Budget { dimension, limit });
        self
    }

    /// Limits growth of resident memory, in bytes.
    pub fn memory(self, limit_bytes: u64) -> Self {
        self.budget(Dimension::Memory, limit_bytes as f64)
    }

    /// Limits wall-clock time, in milliseconds.
    pub fn execution(self, limit_millis: u64) -> Self {
        self.budget(Dimension::Execution, limit_millis as f64)
    }

    /// Limits bytes read plus written.
    pub fn io(self, limit_bytes: u64) -> Self {
        self.budget(Dimension::Io, limit_bytes as f64)
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    /// Compares an existing measurement against every budget.
    pub fn check(&self, measurement: &Measurement) -> Result<(), EyeError> {
        let mut ordered: Vec<&Budget> = self.budgets.iter().collect();
        ordered.sort_by_key(|b| b.dimension.check_order());

        for budget in ordered {
            budget.check(measurement)?;
        }
        Ok(())
    }

    /// Runs `workload` and checks the result.
    pub fn run<F>(&self, workload: F) -> Result<Measurement, EyeError>
    where
        F: FnOnce(&mut EyeProgress),
    {
        self.validate()?;
        let measurement = self.probe.run(&self.label, workload)?;
        self.check_logged(measurement)
    }

    /// Runs a fallible `workload` and checks the result. A workload error is
    /// returned as is and never turned into a budget failure.
    pub fn try_run<F, E>(&self, workload: F) -> Result<Measurement, EyeError<E>>
    where
        F: FnOnce(&mut EyeProgress) -> Result<(), E>,
    {
        self.validate().map_err(|e| e.widen())?;
        let measurement = self.probe.try_run(&self.label, workload)?;
        self.check_logged(measurement).map_err(|e| e.widen())
    }

    fn validate(&self) -> Result<(), EyeError> {
        self.budgets.iter().try_for_each(Budget::validate)
    }

    fn check_logged(&self, measurement: Measurement) -> Result<Measurement, EyeError> {
        match self.check(&measurement) {
            Ok(()) => {
                debug!("Probe '{}' stayed within {} budget(s)", self.label, self.budgets.len());
                Ok(measurement)
            }
            Err(e) => {
                warn!("Probe '{}': {}", self.label, e);
                Err(e)
            }
        }
    }
}
