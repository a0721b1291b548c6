//! Measurement Formatters
//!
//! One closed enum per unit family. Each variant is a fixed scale and unit
//! suffix; formatting is pure and never fails.

use std::fmt;

use super::units::{
    floor_two_decimals, BYTES_PER_GB, BYTES_PER_KB, BYTES_PER_MB, MILLIS_PER_SECOND,
};

/// Printed for NaN or infinite values.
pub const NOT_AVAILABLE: &str = "n/a";

/// Shared behavior of the formatter families.
pub trait UnitFormatter {
    /// Unit suffix, e.g. `"KB"`.
    fn unit(&self) -> &'static str;

    /// Raw units per displayed unit.
    fn scale(&self) -> f64;

    /// Formats `raw` as `"<value> <unit>"`.
    ///
    /// The value is floored on magnitude to two decimals and printed without
    /// trailing zeros, so 102400 bytes in kilobytes reads `"100 KB"`.
    fn format(&self, raw: f64) -> String {
        if !raw.is_finite() {
            return NOT_AVAILABLE.to_string();
        }
        let value = floor_two_decimals(raw / self.scale());
        if !value.is_finite() {
            return NOT_AVAILABLE.to_string();
        }
        format!("{} {}", value, self.unit())
    }

    /// Reads back a string produced by [`format`](UnitFormatter::format) and
    /// returns the raw magnitude it represents.
    fn parse(&self, text: &str) -> Option<f64> {
        let mut parts = text.split_whitespace();
        let value: f64 = parts.next()?.parse().ok()?;
        let unit = parts.next()?;
        if parts.next().is_some() || !unit.eq_ignore_ascii_case(self.unit()) {
            return None;
        }
        Some(value * self.scale())
    }
}

/// Formats memory amounts given in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryFormatter {
    Byte,
    Kilobyte,
    Megabyte,
    Gigabyte,
}

impl MemoryFormatter {
    /// Looks a formatter up by identifier (`"b"`, `"kb"`, `"mb"`, `"gb"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "b" | "byte" | "bytes" => Some(Self::Byte),
            "kb" | "kilobyte" | "kilobytes" => Some(Self::Kilobyte),
            "mb" | "megabyte" | "megabytes" => Some(Self::Megabyte),
            "gb" | "gigabyte" | "gigabytes" => Some(Self::Gigabyte),
            _ => None,
        }
    }

    /// Formats a signed byte count, e.g. a memory delta.
    pub fn format_bytes(&self, bytes: i64) -> String {
        self.format(bytes as f64)
    }
}

impl UnitFormatter for MemoryFormatter {
    fn unit(&self) -> &'static str {
        match self {
            Self::Byte => "B",
            Self::Kilobyte => "KB",
            Self::Megabyte => "MB",
            Self::Gigabyte => "GB",
        }
    }

    fn scale(&self) -> f64 {
        match self {
            Self::Byte => 1.0,
            Self::Kilobyte => BYTES_PER_KB as f64,
            Self::Megabyte => BYTES_PER_MB as f64,
            Self::Gigabyte => BYTES_PER_GB as f64,
        }
    }
}

/// Formats durations given in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFormatter {
    Millis,
    Seconds,
    Minutes,
}

impl TimeFormatter {
    /// Looks a formatter up by identifier (`"ms"`, `"s"`, `"min"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ms" | "millis" | "milliseconds" => Some(Self::Millis),
            "s" | "sec" | "seconds" => Some(Self::Seconds),
            "min" | "minutes" => Some(Self::Minutes),
            _ => None,
        }
    }

    /// Formats a duration in milliseconds.
    pub fn format_millis(&self, millis: u64) -> String {
        self.format(millis as f64)
    }
}

impl UnitFormatter for TimeFormatter {
    fn unit(&self) -> &'static str {
        match self {
            Self::Millis => "ms",
            Self::Seconds => "s",
            Self::Minutes => "min",
        }
    }

    fn scale(&self) -> f64 {
        match self {
            Self::Millis => 1.0,
            Self::Seconds => MILLIS_PER_SECOND as f64,
            Self::Minutes => (60 * MILLIS_PER_SECOND) as f64,
        }
    }
}

/// Formats I/O volumes given in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoFormatter {
    Byte,
    Kilobyte,
    Megabyte,
}

impl IoFormatter {
    /// Looks a formatter up by identifier (`"b"`, `"kb"`, `"mb"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "b" | "byte" | "bytes" => Some(Self::Byte),
            "kb" | "kilobyte" | "kilobytes" => Some(Self::Kilobyte),
            "mb" | "megabyte" | "megabytes" => Some(Self::Megabyte),
            _ => None,
        }
    }

    /// Formats an I/O byte count.
    pub fn format_bytes(&self, bytes: u64) -> String {
        self.format(bytes as f64)
    }
}

impl UnitFormatter for IoFormatter {
    fn unit(&self) -> &'static str {
        match self {
            Self::Byte => "B",
            Self::Kilobyte => "KB",
            Self::Megabyte => "MB",
        }
    }

    fn scale(&self) -> f64 {
        match self {
            Self::Byte => 1.0,
            Self::Kilobyte => BYTES_PER_KB as f64,
            Self::Megabyte => BYTES_PER_MB as f64,
        }
    }
}

macro_rules! display_unit {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.unit())
            }
        })*
    };
}

display_unit!(MemoryFormatter, TimeFormatter, IoFormatter);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_kilobytes() {
        assert_eq!(MemoryFormatter::Kilobyte.format_bytes(102_400), "100 KB");
        assert_eq!(MemoryFormatter::Kilobyte.format_bytes(1536), "1.5 KB");
        assert_eq!(MemoryFormatter::Kilobyte.format_bytes(1000), "0.97 KB");
    }

    #[test]
    fn test_memory_negative_delta_keeps_sign() {
        assert_eq!(MemoryFormatter::Kilobyte.format_bytes(-2048), "-2 KB");
        assert_eq!(MemoryFormatter::Byte.format_bytes(-17), "-17 B");
    }

    #[test]
    fn test_memory_megabytes_and_bytes() {
        assert_eq!(MemoryFormatter::Megabyte.format_bytes(10_485_760), "10 MB");
        assert_eq!(MemoryFormatter::Byte.format_bytes(0), "0 B");
        assert_eq!(MemoryFormatter::Gigabyte.format_bytes(1_610_612_736), "1.5 GB");
    }

    #[test]
    fn test_time_formatters() {
        assert_eq!(TimeFormatter::Millis.format_millis(1003), "1003 ms");
        assert_eq!(TimeFormatter::Seconds.format_millis(1003), "1 s");
        assert_eq!(TimeFormatter::Seconds.format_millis(2500), "2.5 s");
        assert_eq!(TimeFormatter::Minutes.format_millis(90_000), "1.5 min");
    }

    #[test]
    fn test_io_formatters() {
        assert_eq!(IoFormatter::Kilobyte.format_bytes(4096), "4 KB");
        assert_eq!(IoFormatter::Megabyte.format_bytes(524_288), "0.5 MB");
        assert_eq!(IoFormatter::Byte.format_bytes(12), "12 B");
    }

    #[test]
    fn test_non_finite_is_sentinel() {
        assert_eq!(MemoryFormatter::Kilobyte.format(f64::NAN), NOT_AVAILABLE);
        assert_eq!(TimeFormatter::Millis.format(f64::INFINITY), NOT_AVAILABLE);
        assert_eq!(IoFormatter::Byte.format(f64::NEG_INFINITY), NOT_AVAILABLE);
    }

    #[test]
    fn test_parse_recovers_magnitude() {
        let text = MemoryFormatter::Kilobyte.format_bytes(102_400);
        assert_eq!(MemoryFormatter::Kilobyte.parse(&text), Some(102_400.0));

        let text = TimeFormatter::Seconds.format_millis(2500);
        assert_eq!(TimeFormatter::Seconds.parse(&text), Some(2500.0));

        // Rounding floors to 0.01 KB, so at most ~10 bytes are lost.
        let raw = 123_457_u64;
        let text = IoFormatter::Kilobyte.format_bytes(raw);
        let parsed = IoFormatter::Kilobyte.parse(&text).unwrap();
        assert!(parsed <= raw as f64);
        assert!(raw as f64 - parsed < 0.01 * 1024.0);
    }

    #[test]
    fn test_parse_rejects_other_units() {
        assert_eq!(MemoryFormatter::Kilobyte.parse("100 MB"), None);
        assert_eq!(MemoryFormatter::Kilobyte.parse(NOT_AVAILABLE), None);
        assert_eq!(TimeFormatter::Millis.parse("12 ms extra"), None);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(MemoryFormatter::from_name("KB"), Some(MemoryFormatter::Kilobyte));
        assert_eq!(TimeFormatter::from_name("millis"), Some(TimeFormatter::Millis));
        assert_eq!(IoFormatter::from_name("kb"), Some(IoFormatter::Kilobyte));
        assert_eq!(IoFormatter::from_name("gb"), None);
    }

    #[test]
    fn test_display_is_unit() {
        assert_eq!(MemoryFormatter::Megabyte.to_string(), "MB");
        assert_eq!(TimeFormatter::Seconds.to_string(), "s");
    }
}
