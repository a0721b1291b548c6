//! Workload Progress
//!
//! The handle a workload uses to report how far along it is. The probe never
//! reads it for control decisions.

use std::io::{self, Write};

use colored::Colorize;
use log::trace;

/// Upper bound of the progress counter.
pub const MAX_PROGRESS: u8 = 100;

/// Completion counter in `0..=100` handed to a workload.
///
/// The value never decreases and never exceeds 100: lower values passed to
/// [`set`](EyeProgress::set) are ignored and larger ones clamp.
#[derive(Debug)]
pub struct EyeProgress {
    label: String,
    progress: u8,
    touched: bool,
    render: bool,
    bar_width: usize,
}

impl EyeProgress {
    /// Creates a silent handle starting at 0.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            progress: 0,
            touched: false,
            render: false,
            bar_width: crate::config::DEFAULT_PROGRESS_WIDTH,
        }
    }

    /// Draws a progress bar on stderr whenever the value changes.
    pub fn with_rendering(mut self, bar_width: usize) -> Self {
        self.render = true;
        self.bar_width = bar_width.max(1);
        self
    }

    /// Current progress.
    pub fn get(&self) -> u8 {
        self.progress
    }

    /// True once the workload has reported progress at least once.
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Advances by one.
    pub fn inc(&mut self) {
        self.inc_by(1);
    }

    /// Advances by `step`, stopping at 100.
    pub fn inc_by(&mut self, step: u8) {
        let next = self.progress.saturating_add(step).min(MAX_PROGRESS);
        self.update(next);
    }

    /// Moves to `value`. Values below the current progress are ignored.
    pub fn set(&mut self, value: u8) {
        let next = value.min(MAX_PROGRESS).max(self.progress);
        self.update(next);
    }

    /// Renders the bar as text, e.g. `[■■■■        ] 33%`.
    pub fn render_bar(&self) -> String {
        let filled = usize::from(self.progress) * self.bar_width / usize::from(MAX_PROGRESS);
        format!(
            "[{}{}] {}%",
            "■".repeat(filled),
            " ".repeat(self.bar_width - filled),
            self.progress
        )
    }

    /// Marks a touched handle as done once the workload has returned.
    pub(crate) fn complete(&mut self) {
        if self.touched {
            self.update(MAX_PROGRESS);
            if self.render {
                eprintln!();
            }
        }
    }

    fn update(&mut self, next: u8) {
        self.touched = true;
        if next == self.progress {
            return;
        }
        self.progress = next;
        trace!("{} progress {}%", self.label, next);

        if self.render {
            self.draw();
        }
    }

    fn draw(&self) {
        let line = format!("\r  AlgoEye({}) {}", self.label, self.render_bar().green());

        let mut stderr = io::stderr().lock();
        // A broken terminal must not fail the measured workload.
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let progress = EyeProgress::new("test");
        assert_eq!(progress.get(), 0);
        assert!(!progress.is_touched());
    }

    #[test]
    fn test_increments_reach_exactly_100() {
        let mut progress = EyeProgress::new("test");
        let mut last = progress.get();

        while progress.get() < MAX_PROGRESS {
            progress.inc();
            assert!(progress.get() >= last);
            last = progress.get();
        }

        assert_eq!(progress.get(), 100);
    }

    #[test]
    fn test_inc_by_clamps() {
        let mut progress = EyeProgress::new("test");
        progress.inc_by(90);
        progress.inc_by(90);
        assert_eq!(progress.get(), 100);

        progress.inc_by(u8::MAX);
        assert_eq!(progress.get(), 100);
    }

    #[test]
    fn test_set_never_decreases() {
        let mut progress = EyeProgress::new("test");
        progress.set(60);
        progress.set(20);
        assert_eq!(progress.get(), 60);

        progress.set(200);
        assert_eq!(progress.get(), 100);
    }

    #[test]
    fn test_complete_only_when_touched() {
        let mut untouched = EyeProgress::new("a");
        untouched.complete();
        assert_eq!(untouched.get(), 0);

        let mut touched = EyeProgress::new("b");
        touched.inc();
        touched.complete();
        assert_eq!(touched.get(), 100);
    }

    #[test]
    fn test_render_bar() {
        let mut progress = EyeProgress::new("test");
        progress.progress = 50;
        let bar = progress.render_bar();
        assert_eq!(bar, format!("[{}{}] 50%", "■".repeat(12), " ".repeat(12)));

        progress.progress = 100;
        assert_eq!(progress.render_bar(), format!("[{}] 100%", "■".repeat(24)));
    }
}
