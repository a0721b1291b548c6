//! Probe Configuration
//!
//! Tunables for a probe run. Defaults can be overridden per probe with the
//! `with_*` builders, loaded from JSON, or read from `ALGOEYE_*` environment
//! variables.

use std::env;
use std::time::Duration;

use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Default interval between background resource samples.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 50;

/// Default width of the rendered progress bar, in cells.
pub const DEFAULT_PROGRESS_WIDTH: usize = 24;

/// Environment variable overriding the sample interval.
pub const ENV_SAMPLE_INTERVAL_MS: &str = "ALGOEYE_SAMPLE_INTERVAL_MS";

/// Environment variable enabling the progress bar (`1`, `true`, `yes`).
pub const ENV_SHOW_PROGRESS: &str = "ALGOEYE_SHOW_PROGRESS";

/// Environment variable overriding the progress bar width.
pub const ENV_PROGRESS_WIDTH: &str = "ALGOEYE_PROGRESS_WIDTH";

/// Process-wide defaults, resolved from the environment on first use.
pub static DEFAULT_CONFIG: Lazy<ProbeConfig> = Lazy::new(ProbeConfig::from_env);

/// Configuration for a [`ResourceProbe`](crate::ResourceProbe).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Interval between background memory/CPU samples, in milliseconds.
    pub sample_interval_ms: u64,

    /// Render the workload's progress as a bar on stderr.
    pub show_progress: bool,

    /// Width of the progress bar, in cells.
    pub progress_width: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            show_progress: false,
            progress_width: DEFAULT_PROGRESS_WIDTH,
        }
    }
}

impl ProbeConfig {
    /// Builds a config from the defaults, overridden by any `ALGOEYE_*`
    /// environment variables that are set and parse.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>(ENV_SAMPLE_INTERVAL_MS) {
            config.sample_interval_ms = ms;
        }
        if let Ok(value) = env::var(ENV_SHOW_PROGRESS) {
            config.show_progress = parse_flag(&value);
        }
        if let Some(width) = read_env::<usize>(ENV_PROGRESS_WIDTH) {
            config.progress_width = width;
        }

        debug!("Resolved probe config: {:?}", config);
        config.normalized()
    }

    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: ProbeConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Sets the background sample interval.
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval_ms = interval.as_millis().min(u64::MAX as u128) as u64;
        self.normalized()
    }

    /// Enables or disables the progress bar.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Sets the progress bar width.
    pub fn with_progress_width(mut self, width: usize) -> Self {
        self.progress_width = width;
        self.normalized()
    }

    /// Returns the sample interval as a [`Duration`].
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Clamps values that would make the sampler spin or the bar vanish.
    fn normalized(mut self) -> Self {
        if self.sample_interval_ms == 0 {
            warn!("Sample interval of 0 ms is not allowed, using 1 ms");
            self.sample_interval_ms = 1;
        }
        if self.progress_width == 0 {
            self.progress_width = DEFAULT_PROGRESS_WIDTH;
        }
        self
    }
}

fn read_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}: cannot parse '{}'", key, raw);
            None
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.sample_interval_ms, DEFAULT_SAMPLE_INTERVAL_MS);
        assert!(!config.show_progress);
        assert_eq!(config.progress_width, DEFAULT_PROGRESS_WIDTH);
    }

    #[test]
    fn test_builders() {
        let config = ProbeConfig::default()
            .with_sample_interval(Duration::from_millis(10))
            .with_progress(true)
            .with_progress_width(40);

        assert_eq!(config.sample_interval(), Duration::from_millis(10));
        assert!(config.show_progress);
        assert_eq!(config.progress_width, 40);
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let config = ProbeConfig::default()
            .with_sample_interval(Duration::ZERO)
            .with_progress_width(0);

        assert_eq!(config.sample_interval_ms, 1);
        assert_eq!(config.progress_width, DEFAULT_PROGRESS_WIDTH);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ProbeConfig::from_json(r#"{"show_progress": true}"#).unwrap();
        assert!(config.show_progress);
        assert_eq!(config.sample_interval_ms, DEFAULT_SAMPLE_INTERVAL_MS);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(ProbeConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" yes "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("nope"));
    }
}
