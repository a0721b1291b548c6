//! Resource Monitoring Module
//!
//! Process sampling and workload progress reporting used by the probe.
//!
//! # Components
//!
//! - [`ResourceMonitor`]: memory, CPU and disk I/O sampling
//! - [`EyeProgress`]: 0-100 progress handle given to workloads

pub mod progress;
pub mod resource;

pub use progress::{EyeProgress, MAX_PROGRESS};
pub use resource::{ProcessSnapshot, ResourceMonitor, ResourceSample};
