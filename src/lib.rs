//! AlgoEye - Resource Budgets for Blocks of Work
//!
//! Measures how long a block of code takes and how much memory and disk I/O
//! it consumes, and asserts that it stays within a budget.
//!
//! # Architecture
//!
//! - [`probe`]: runs a workload and produces a [`Measurement`]
//! - [`assertion`]: compares measurements against [`Budget`]s
//! - [`format`]: memory, time and I/O formatters plus unit conversions
//! - [`monitoring`]: process sampling and the [`EyeProgress`] handle
//! - [`config`]: [`ProbeConfig`]
//!
//! # Example
//!
//! ```rust,no_run
//! use algoeye::{algo_eye, assert_algo_eye, mb_to_byte};
//! use algoeye::{IoFormatter, MemoryFormatter, TimeFormatter};
//!
//! fn main() -> Result<(), algoeye::EyeError> {
//!     let result = algo_eye("Algorithm #0629", |progress| {
//!         for _ in 0..100 {
//!             progress.inc();
//!         }
//!     })?;
//!     print!(
//!         "{}",
//!         result.pretty_print(MemoryFormatter::Kilobyte, TimeFormatter::Millis, IoFormatter::Kilobyte)
//!     );
//!
//!     assert_algo_eye("reverse", mb_to_byte(10), 100, |_| {
//!         let _ = (0..100_000).rev().collect::<Vec<u32>>();
//!     })?;
//!     Ok(())
//! }
//! ```

pub mod assertion;
pub mod config;
pub mod error;
pub mod format;
pub mod monitoring;
pub mod probe;

// Re-export commonly used types
pub use assertion::{
    assert_algo_eye, assert_within_budget, try_assert_within_budget, Budget, BudgetGate,
    Dimension,
};
pub use config::ProbeConfig;
pub use error::EyeError;
pub use format::{
    gb_to_byte, kb_to_byte, mb_to_byte, second_to_millis, IoFormatter, MemoryFormatter,
    TimeFormatter, UnitFormatter,
};
pub use monitoring::EyeProgress;
pub use probe::{algo_eye, try_algo_eye, Measurement, ResourceProbe};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const APP_NAME: &str = "AlgoEye";
