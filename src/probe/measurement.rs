//! Probe Measurement
//!
//! The immutable result of one probe run and its boxed text report.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assertion::Dimension;
use crate::format::units::floor_two_decimals;
use crate::format::{IoFormatter, MemoryFormatter, TimeFormatter, UnitFormatter};

/// What one probe run consumed.
///
/// Built once at the end of a run; all fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub(crate) label: String,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) elapsed_millis: u64,
    pub(crate) memory_delta_bytes: i64,
    pub(crate) peak_memory_bytes: u64,
    pub(crate) io_read_bytes: u64,
    pub(crate) io_written_bytes: u64,
    pub(crate) average_cpu_load: f32,
    pub(crate) max_cpu_load: f32,
    pub(crate) sample_count: usize,
}

impl Measurement {
    /// Label the probe ran under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wall-clock time at which the workload started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock duration of the workload in milliseconds.
    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed_millis
    }

    /// Change in resident memory; negative if memory was released.
    pub fn memory_delta_bytes(&self) -> i64 {
        self.memory_delta_bytes
    }

    /// Highest resident memory seen while the workload ran.
    pub fn peak_memory_bytes(&self) -> u64 {
        self.peak_memory_bytes
    }

    pub fn io_read_bytes(&self) -> u64 {
        self.io_read_bytes
    }

    pub fn io_written_bytes(&self) -> u64 {
        self.io_written_bytes
    }

    /// Bytes read plus bytes written during the run.
    pub fn io_delta_bytes(&self) -> u64 {
        self.io_read_bytes.saturating_add(self.io_written_bytes)
    }

    /// Mean CPU load over the run, as a share of the whole machine.
    pub fn average_cpu_load(&self) -> f32 {
        self.average_cpu_load
    }

    pub fn max_cpu_load(&self) -> f32 {
        self.max_cpu_load
    }

    /// Number of background samples behind the CPU and peak figures.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// The value a budget on `dimension` is compared against.
    pub fn observed(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Execution => self.elapsed_millis as f64,
            Dimension::Memory => self.memory_delta_bytes as f64,
            Dimension::Io => self.io_delta_bytes() as f64,
        }
    }

    /// Renders the measurement as a boxed report using exactly the given
    /// formatters.
    pub fn pretty_print(
        &self,
        memory: MemoryFormatter,
        time: TimeFormatter,
        io: IoFormatter,
    ) -> String {
        let rows: Vec<Option<(&str, String)>> = vec![
            Some((
                "Started",
                self.started_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            )),
            None,
            Some((
                "CPU Avg Load",
                format!("{}%", floor_two_decimals(f64::from(self.average_cpu_load))),
            )),
            Some((
                "CPU Max Load",
                format!("{}%", floor_two_decimals(f64::from(self.max_cpu_load))),
            )),
            None,
            Some(("Memory Usage", memory.format_bytes(self.memory_delta_bytes))),
            Some(("Memory Peak", memory.format(self.peak_memory_bytes as f64))),
            None,
            Some((
                "IO Read/Write",
                format!(
                    "{}/{}",
                    io.format_bytes(self.io_read_bytes),
                    io.format_bytes(self.io_written_bytes)
                ),
            )),
            Some(("IO Total", io.format_bytes(self.io_delta_bytes()))),
            None,
            Some(("Execution Time", time.format_millis(self.elapsed_millis))),
        ];
        let notes = [
            "Do not multi-task during execution;",
            "other threads share the same process counters.",
        ];

        let label: String = self
            .label
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        let title = format!("{} Eye Result", label);
        let width = rows
            .iter()
            .flatten()
            .map(|(key, value)| key.chars().count() + BoxPrinter::KEY_GAP + value.chars().count())
            .max()
            .unwrap_or(0)
            .max(title.chars().count())
            .max(notes.iter().map(|n| n.chars().count()).max().unwrap_or(0));
        let mut printer = BoxPrinter::new(width);

        printer.first_line();
        printer.line(&title);
        printer.break_line('=');
        for row in &rows {
            match row {
                Some((key, value)) => printer.row(key, value),
                None => printer.break_line('-'),
            }
        }
        printer.break_line('=');
        for note in &notes {
            printer.line(note);
        }
        printer.last_line();
        printer.finish()
    }

    /// Writes the [`pretty_print`](Measurement::pretty_print) report to `out`.
    pub fn write_pretty<W: Write>(
        &self,
        out: &mut W,
        memory: MemoryFormatter,
        time: TimeFormatter,
        io: IoFormatter,
    ) -> io::Result<()> {
        out.write_all(self.pretty_print(memory, time, io).as_bytes())?;
        out.flush()
    }

    /// Serializes the measurement as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Draws a fixed-width ASCII box around lines and key/value rows.
struct BoxPrinter {
    width: usize,
    out: String,
}

impl BoxPrinter {
    const KEY_GAP: usize = 4;

    fn new(width: usize) -> Self {
        Self {
            width,
            out: String::new(),
        }
    }

    fn first_line(&mut self) {
        self.edge();
    }

    fn last_line(&mut self) {
        self.edge();
    }

    fn edge(&mut self) {
        self.out.push('+');
        self.out.push_str(&"-".repeat(self.width + 2));
        self.out.push_str("+\n");
    }

    fn break_line(&mut self, fill: char) {
        self.out.push('|');
        self.out.push_str(&fill.to_string().repeat(self.width + 2));
        self.out.push_str("|\n");
    }

    fn line(&mut self, text: &str) {
        self.out
            .push_str(&format!("| {:<width$} |\n", text, width = self.width));
    }

    fn row(&mut self, key: &str, value: &str) {
        let padding = self.width - key.chars().count() - value.chars().count();
        self.out
            .push_str(&format!("| {}{}{} |\n", key, " ".repeat(padding), value));
    }

    fn finish(self) -> String {
        self.out
    }
}
