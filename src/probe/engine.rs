//! Probe Execution
//!
//! Runs a workload between two process snapshots and turns the difference
//! into a [`Measurement`]. A sampler thread watches peak memory and CPU load
//! while the workload runs on the caller's thread.

use std::cell::Cell;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, info, warn};

use crate::config::{ProbeConfig, DEFAULT_CONFIG};
use crate::error::EyeError;
use crate::monitoring::{EyeProgress, ProcessSnapshot, ResourceMonitor};

use super::measurement::Measurement;

/// Memory and I/O counters are process-wide, so overlapping probes would
/// measure each other. Probes queue on this lock instead.
static PROBE_LOCK: Mutex<()> = Mutex::new(());

thread_local! {
    /// Set while this thread is inside a probe. The lock is not reentrant,
    /// so a nested probe must fail instead of waiting on itself.
    static IN_PROBE: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as probing until dropped, including on unwind.
struct ProbeScope;

impl ProbeScope {
    fn enter(label: &str) -> Result<Self, EyeError> {
        if IN_PROBE.with(|flag| flag.replace(true)) {
            return Err(EyeError::NestedProbe(label.to_string()));
        }
        Ok(ProbeScope)
    }
}

impl Drop for ProbeScope {
    fn drop(&mut self) {
        IN_PROBE.with(|flag| flag.set(false));
    }
}

/// Measures workloads.
///
/// # Example
///
/// ```rust,no_run
/// use algoeye::{MemoryFormatter, ResourceProbe, TimeFormatter, IoFormatter};
///
/// let probe = ResourceProbe::new();
/// let measurement = probe.run("sort 1M", |progress| {
///     let mut data: Vec<u64> = (0..1_000_000).rev().collect();
///     progress.set(50);
///     data.sort();
/// })?;
///
/// println!(
///     "{}",
///     measurement.pretty_print(
///         MemoryFormatter::Kilobyte,
///         TimeFormatter::Millis,
///         IoFormatter::Kilobyte,
///     )
/// );
/// # Ok::<(), algoeye::EyeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ResourceProbe {
    config: ProbeConfig,
}

impl ResourceProbe {
    /// Creates a probe with the process-wide default config.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CONFIG.clone())
    }

    /// Creates a probe with an explicit config.
    pub fn with_config(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Runs an infallible workload and measures it.
    pub fn run<F>(&self, label: &str, workload: F) -> Result<Measurement, EyeError>
    where
        F: FnOnce(&mut EyeProgress),
    {
        self.try_run(label, move |progress| {
            workload(progress);
            Ok::<(), Infallible>(())
        })
    }

    /// Runs a fallible workload and measures it.
    ///
    /// The workload runs exactly once, on the calling thread. If it returns
    /// an error, no measurement is produced and the error comes back as
    /// [`EyeError::Workload`] unchanged. Panics unwind through untouched.
    ///
    /// Runs from other threads wait for this one to finish. A run started
    /// from inside the workload fails with [`EyeError::NestedProbe`].
    pub fn try_run<F, E>(&self, label: &str, workload: F) -> Result<Measurement, EyeError<E>>
    where
        F: FnOnce(&mut EyeProgress) -> Result<(), E>,
    {
        validate_label(label).map_err(|e| e.widen())?;

        let _scope = ProbeScope::enter(label).map_err(|e| e.widen())?;
        let _guard = PROBE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        debug!("Starting probe '{}'", label);

        let mut progress = EyeProgress::new(label);
        if self.config.show_progress {
            progress = progress.with_rendering(self.config.progress_width);
        }

        let mut monitor = ResourceMonitor::new().map_err(|e| e.widen())?;
        let sampler = Sampler::start(self.config.sample_interval()).map_err(|e| e.widen())?;
        let before = monitor.snapshot().map_err(|e| e.widen())?;

        let started_at = Utc::now();
        let clock = Instant::now();
        let outcome = workload(&mut progress);
        let elapsed = clock.elapsed();

        let after = monitor.snapshot();
        let background = sampler.stop();
        progress.complete();

        if let Err(e) = outcome {
            debug!("Probe '{}' workload failed after {:?}", label, elapsed);
            return Err(EyeError::Workload(e));
        }
        let after = after.map_err(|e| e.widen())?;

        let (average_cpu_load, max_cpu_load, sampled_peak, sample_count) = match &background {
            Some(m) => (
                m.average_cpu(),
                m.max_cpu(),
                m.peak_memory_bytes(),
                m.get_samples().len(),
            ),
            None => (0.0, 0.0, 0, 0),
        };

        let (io_read_bytes, io_written_bytes) = io_delta(&before, &after);

        let measurement = Measurement {
            label: label.to_string(),
            started_at,
            elapsed_millis: duration_millis(elapsed),
            memory_delta_bytes: signed_delta(before.memory_bytes, after.memory_bytes),
            peak_memory_bytes: sampled_peak.max(before.memory_bytes).max(after.memory_bytes),
            io_read_bytes,
            io_written_bytes,
            average_cpu_load,
            max_cpu_load,
            sample_count,
        };

        info!(
            "Probe '{}' finished in {} ms (memory {:+} bytes, io {} bytes)",
            label,
            measurement.elapsed_millis,
            measurement.memory_delta_bytes,
            measurement.io_delta_bytes()
        );

        Ok(measurement)
    }
}

impl Default for ResourceProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Background thread collecting CPU and memory samples during a run.
///
/// Dropping it (for example while a workload panic unwinds) tells the
/// thread to exit without waiting for it.
struct Sampler {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<Option<ResourceMonitor>>>,
}

impl Sampler {
    fn start(interval: Duration) -> Result<Self, EyeError> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("algoeye-sampler".to_string())
            .spawn(move || {
                let mut monitor = match ResourceMonitor::new() {
                    Ok(monitor) => monitor.with_min_interval(Duration::ZERO),
                    Err(e) => {
                        warn!("Background sampling disabled: {}", e);
                        return None;
                    }
                };
                while flag.load(Ordering::Relaxed) {
                    monitor.sample();
                    thread::sleep(interval);
                }
                Some(monitor)
            })
            .map_err(|e| EyeError::Sampling(format!("cannot spawn sampler thread: {}", e)))?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    fn stop(mut self) -> Option<ResourceMonitor> {
        self.running.store(false, Ordering::Relaxed);
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(monitor) => monitor,
            Err(_) => {
                warn!("Sampler thread panicked, CPU and peak figures unavailable");
                None
            }
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

fn validate_label(label: &str) -> Result<(), EyeError> {
    if label.trim().is_empty() {
        return Err(EyeError::InvalidInput("probe label must not be empty".to_string()));
    }
    Ok(())
}

fn duration_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn signed_delta(before: u64, after: u64) -> i64 {
    let delta = i128::from(after) - i128::from(before);
    delta.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Bytes read and written between two snapshots. Counters that appear to
/// go backwards count as zero.
fn io_delta(before: &ProcessSnapshot, after: &ProcessSnapshot) -> (u64, u64) {
    (
        after.total_read_bytes.saturating_sub(before.total_read_bytes),
        after.total_written_bytes.saturating_sub(before.total_written_bytes),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::mb_to_byte;
    use crate::monitoring::MAX_PROGRESS;
    use std::io::Write as _;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn fast_probe() -> ResourceProbe {
        ResourceProbe::with_config(
            ProbeConfig::default().with_sample_interval(Duration::from_millis(5)),
        )
    }

    #[test]
    fn test_empty_label_rejected_before_workload() {
        init_logging();
        let mut called = false;

        let result = fast_probe().run("", |_| called = true);
        assert!(matches!(result, Err(EyeError::InvalidInput(_))));

        let result = fast_probe().run("   ", |_| called = true);
        assert!(matches!(result, Err(EyeError::InvalidInput(_))));
        assert!(!called);
    }

    #[test]
    fn test_empty_workload_measures() {
        init_logging();
        let measurement = fast_probe().run("Algorithm #0629", |_| {}).unwrap();

        assert_eq!(measurement.label(), "Algorithm #0629");
        assert!(measurement.elapsed_millis() < 1000);
        assert!(measurement.peak_memory_bytes() > 0);
    }

    #[test]
    fn test_elapsed_covers_blocking_duration() {
        init_logging();
        let measurement = fast_probe()
            .run("sleepy", |_| thread::sleep(Duration::from_millis(120)))
            .unwrap();

        assert!(measurement.elapsed_millis() >= 120);
    }

    #[test]
    fn test_workload_runs_exactly_once() {
        init_logging();
        let mut runs = 0;
        fast_probe().run("once", |_| runs += 1).unwrap();
        assert_eq!(runs, 1);
    }

    #[test]
    fn test_progress_reaches_100_and_never_decreases() {
        init_logging();
        let mut reads = Vec::new();

        fast_probe()
            .run("progress", |progress| {
                while progress.get() < MAX_PROGRESS {
                    progress.inc_by(7);
                    reads.push(progress.get());
                }
            })
            .unwrap();

        assert_eq!(reads.last(), Some(&100));
        assert!(reads.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_workload_error_propagates_unchanged() {
        init_logging();
        let result = fast_probe().try_run("fails", |_| Err::<(), _>("boom"));

        match result {
            Err(EyeError::Workload(e)) => assert_eq!(e, "boom"),
            other => panic!("expected workload error, got {:?}", other),
        }
    }

    #[test]
    fn test_fallible_workload_success() {
        init_logging();
        let measurement = fast_probe()
            .try_run("ok", |_| Ok::<(), std::io::Error>(()))
            .unwrap();
        assert_eq!(measurement.label(), "ok");
    }

    #[test]
    fn test_panic_unwinds_and_probe_recovers() {
        init_logging();
        let result = std::panic::catch_unwind(|| {
            let _ = fast_probe().run("panics", |_| panic!("workload panic"));
        });
        assert!(result.is_err());

        let measurement = fast_probe().run("after panic", |_| {}).unwrap();
        assert_eq!(measurement.label(), "after panic");
    }

    #[test]
    fn test_nested_run_fails_instead_of_hanging() {
        init_logging();
        let (tx, rx) = std::sync::mpsc::channel();

        thread::spawn(move || {
            let outer = fast_probe().run("outer", |_| {
                let inner = fast_probe().run("inner", |_| {});
                let _ = tx.send(inner.map(|_| ()));
            });
            assert!(outer.is_ok());
        });

        let inner = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("nested run did not return");
        assert!(matches!(inner, Err(EyeError::NestedProbe(ref label)) if label == "inner"));
    }

    #[test]
    fn test_runs_work_again_after_nested_attempt() {
        init_logging();
        let nested = fast_probe()
            .run("outer", |_| {
                assert!(fast_probe().run("inner", |_| {}).is_err());
            })
            .unwrap();
        assert_eq!(nested.label(), "outer");

        let measurement = fast_probe().run("next", |_| {}).unwrap();
        assert_eq!(measurement.label(), "next");
    }

    #[test]
    fn test_concurrent_runs_do_not_overlap() {
        init_logging();
        let handles: Vec<_> = (0..2)
            .map(|i| {
                thread::spawn(move || {
                    fast_probe()
                        .run(&format!("queued {}", i), |_| {
                            thread::sleep(Duration::from_millis(100))
                        })
                        .unwrap()
                })
            })
            .collect();

        let mut runs: Vec<Measurement> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        runs.sort_by_key(|m| m.started_at());

        let first_end =
            runs[0].started_at() + chrono::Duration::milliseconds(runs[0].elapsed_millis() as i64);
        assert!(runs[1].started_at() >= first_end);
        assert!(runs.iter().all(|m| m.elapsed_millis() >= 100));
    }

    #[test]
    fn test_retained_allocation_shows_in_memory_delta() {
        init_logging();
        let size = mb_to_byte(64) as usize;
        let mut retained = Vec::new();

        let measurement = fast_probe()
            .run("allocate", |_| retained = vec![1u8; size])
            .unwrap();

        assert_eq!(retained.len(), size);
        assert!(measurement.memory_delta_bytes() > mb_to_byte(32) as i64);
        assert!(measurement.peak_memory_bytes() >= mb_to_byte(64));
    }

    #[test]
    fn test_file_writes_do_not_break_io_accounting() {
        init_logging();
        let mut file = tempfile::tempfile().unwrap();
        let chunk = vec![7u8; 256 * 1024];

        let measurement = fast_probe()
            .try_run("write", |_| {
                for _ in 0..16 {
                    file.write_all(&chunk)?;
                }
                file.sync_all()
            })
            .unwrap();

        // Containers may hide /proc/<pid>/io, so only check consistency.
        assert_eq!(
            measurement.io_delta_bytes(),
            measurement.io_read_bytes() + measurement.io_written_bytes()
        );
    }

    #[test]
    fn test_background_sampler_collects() {
        init_logging();
        let measurement = fast_probe()
            .run("busy", |_| thread::sleep(Duration::from_millis(100)))
            .unwrap();

        assert!(measurement.sample_count() > 0);
        assert!(measurement.max_cpu_load() >= measurement.average_cpu_load());
        assert!(measurement.max_cpu_load() <= 100.0);
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(signed_delta(100, 300), 200);
        assert_eq!(signed_delta(300, 100), -200);
        assert_eq!(signed_delta(0, u64::MAX), i64::MAX);
        assert_eq!(signed_delta(u64::MAX, 0), i64::MIN);
    }

    #[test]
    fn test_io_delta_saturates() {
        let before = ProcessSnapshot {
            memory_bytes: 0,
            total_read_bytes: 500,
            total_written_bytes: 10,
        };
        let after = ProcessSnapshot {
            memory_bytes: 0,
            total_read_bytes: 400,
            total_written_bytes: 30,
        };
        assert_eq!(io_delta(&before, &after), (0, 20));
    }

    #[test]
    fn test_duration_millis() {
        assert_eq!(duration_millis(Duration::from_micros(1999)), 1);
        assert_eq!(duration_millis(Duration::from_secs(2)), 2000);
    }
}
