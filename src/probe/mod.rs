//! Probe Module
//!
//! Measures one workload at a time.
//!
//! - [`engine`]: [`ResourceProbe`], the measuring loop
//! - [`measurement`]: [`Measurement`], the immutable result and its report

pub mod engine;
pub mod measurement;

pub use engine::ResourceProbe;
pub use measurement::Measurement;

use crate::error::EyeError;
use crate::monitoring::EyeProgress;

/// Measures `workload` with the default probe.
///
/// ```rust,no_run
/// use algoeye::{algo_eye, IoFormatter, MemoryFormatter, TimeFormatter};
///
/// let result = algo_eye("Java Compatibility", |progress| {
///     while progress.get() < 100 {
///         progress.inc();
///         std::thread::sleep(std::time::Duration::from_millis(100));
///     }
/// })?;
///
/// print!(
///     "{}",
///     result.pretty_print(MemoryFormatter::Kilobyte, TimeFormatter::Millis, IoFormatter::Kilobyte)
/// );
/// # Ok::<(), algoeye::EyeError>(())
/// ```
pub fn algo_eye<F>(label: &str, workload: F) -> Result<Measurement, EyeError>
where
    F: FnOnce(&mut EyeProgress),
{
    ResourceProbe::new().run(label, workload)
}

/// Measures a fallible `workload` with the default probe.
pub fn try_algo_eye<F, E>(label: &str, workload: F) -> Result<Measurement, EyeError<E>>
where
    F: FnOnce(&mut EyeProgress) -> Result<(), E>,
{
    ResourceProbe::new().try_run(label, workload)
}
