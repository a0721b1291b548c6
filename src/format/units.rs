//! Unit Conversions
//!
//! Helpers for expressing budgets in familiar units. All conversions take
//! whole numbers and saturate at `u64::MAX` instead of wrapping.

/// Bytes per kilobyte.
pub const BYTES_PER_KB: u64 = 1024;

/// Bytes per megabyte.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Bytes per gigabyte.
pub const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// Milliseconds per second.
pub const MILLIS_PER_SECOND: u64 = 1000;

/// Kilobytes to bytes.
pub fn kb_to_byte(kb: u64) -> u64 {
    kb.saturating_mul(BYTES_PER_KB)
}

/// Megabytes to bytes.
pub fn mb_to_byte(mb: u64) -> u64 {
    mb.saturating_mul(BYTES_PER_MB)
}

/// Gigabytes to bytes.
pub fn gb_to_byte(gb: u64) -> u64 {
    gb.saturating_mul(BYTES_PER_GB)
}

/// Seconds to milliseconds.
pub fn second_to_millis(seconds: u64) -> u64 {
    seconds.saturating_mul(MILLIS_PER_SECOND)
}

/// Floors the magnitude of `value` to two decimals, keeping its sign.
///
/// `1.239` becomes `1.23` and `-1.239` becomes `-1.23`. Non-finite input is
/// returned unchanged.
pub fn floor_two_decimals(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // 1.15 * 100.0 is 114.999..., the nudge keeps exact two-decimal inputs intact.
    let floored = (value.abs() * 100.0 + 1e-7).floor() / 100.0;
    if floored == 0.0 {
        0.0
    } else {
        floored.copysign(value)
    }
}
