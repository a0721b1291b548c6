//! Process Resource Sampling
//!
//! Reads resident memory, CPU load and cumulative disk I/O of the current
//! process. A probe takes one [`ProcessSnapshot`] before and after the
//! workload, while a background [`ResourceMonitor`] collects
//! [`ResourceSample`]s for peak memory and CPU load.

use std::time::{Duration, Instant};

use sysinfo::{get_current_pid, Pid, ProcessRefreshKind, System};

use crate::error::EyeError;

/// Point-in-time counters for the current process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSnapshot {
    /// Resident memory in bytes
    pub memory_bytes: u64,
    /// Bytes read from disk since process start
    pub total_read_bytes: u64,
    /// Bytes written to disk since process start
    pub total_written_bytes: u64,
}

/// A single background resource sample.
#[derive(Debug, Clone)]
pub struct ResourceSample {
    /// When this sample was taken
    pub timestamp: Instant,
    /// CPU load as a share of the whole machine (0-100)
    pub cpu_load: f32,
    /// Resident memory in bytes
    pub memory_bytes: u64,
}

/// Monitors resource usage of the current process.
///
/// # Example
///
/// ```rust,no_run
/// use algoeye::monitoring::ResourceMonitor;
/// use std::time::Duration;
/// use std::thread;
///
/// let mut monitor = ResourceMonitor::new()?;
///
/// for _ in 0..5 {
///     monitor.sample();
///     thread::sleep(Duration::from_millis(100));
/// }
///
/// println!("peak: {} bytes", monitor.peak_memory_bytes());
/// # Ok::<(), algoeye::EyeError>(())
/// ```
pub struct ResourceMonitor {
    system: System,
    process_id: Pid,
    samples: Vec<ResourceSample>,
    warmup_done: bool,
    last_sample: Option<Instant>,
    min_interval: Duration,
    cpu_count: f32,
}

impl ResourceMonitor {
    /// Creates a monitor for the current process.
    pub fn new() -> Result<Self, EyeError> {
        let process_id = get_current_pid()
            .map_err(|e| EyeError::Sampling(format!("cannot resolve current pid: {}", e)))?;

        Ok(Self {
            system: System::new(),
            process_id,
            samples: Vec::new(),
            warmup_done: false,
            last_sample: None,
            min_interval: Duration::from_millis(10),
            cpu_count: num_cpus::get().max(1) as f32,
        })
    }

    /// Sets the minimum interval between samples.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Reads memory and disk counters right now, ignoring rate limiting.
    pub fn snapshot(&mut self) -> Result<ProcessSnapshot, EyeError> {
        let pid = self.process_id;
        let refresh_kind = ProcessRefreshKind::new().with_memory().with_disk_usage();

        if !self.system.refresh_process_specifics(pid, refresh_kind) {
            return Err(EyeError::Sampling(format!("process {} not found", pid)));
        }

        let process = self
            .system
            .process(pid)
            .ok_or_else(|| EyeError::Sampling(format!("process {} not found", pid)))?;
        let disk = process.disk_usage();

        Ok(ProcessSnapshot {
            memory_bytes: process.memory(),
            total_read_bytes: disk.total_read_bytes,
            total_written_bytes: disk.total_written_bytes,
        })
    }

    /// Takes a resource usage sample.
    ///
    /// The first call only primes the CPU counters. Later calls are
    /// rate-limited by `min_interval`.
    pub fn sample(&mut self) {
        let pid = self.process_id;
        let now = Instant::now();
        let refresh_kind = ProcessRefreshKind::new().with_cpu().with_memory();

        if !self.warmup_done {
            self.system.refresh_process_specifics(pid, refresh_kind);
            self.warmup_done = true;
            self.last_sample = Some(now);
            return;
        }

        if let Some(last) = self.last_sample {
            if now.duration_since(last) < self.min_interval {
                return;
            }
        }

        self.system.refresh_process_specifics(pid, refresh_kind);
        self.last_sample = Some(now);

        if let Some(process) = self.system.process(pid) {
            // sysinfo reports per-core percentages, so a busy 8-core process reads 800.
            let cpu_load = (process.cpu_usage() / self.cpu_count).clamp(0.0, 100.0);

            self.samples.push(ResourceSample {
                timestamp: now,
                cpu_load,
                memory_bytes: process.memory(),
            });
        }
    }

    /// Returns all collected samples.
    pub fn get_samples(&self) -> &[ResourceSample] {
        &self.samples
    }

    /// Returns the peak resident memory in bytes.
    pub fn peak_memory_bytes(&self) -> u64 {
        self.samples.iter().map(|s| s.memory_bytes).max().unwrap_or(0)
    }

    /// Returns the average CPU load.
    pub fn average_cpu(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|s| s.cpu_load).sum::<f32>() / self.samples.len() as f32
    }

    /// Returns the highest CPU load seen.
    pub fn max_cpu(&self) -> f32 {
        self.samples.iter().map(|s| s.cpu_load).fold(0.0, f32::max)
    }
}
