//! Formatting Module
//!
//! Turns raw measurements into readable strings and converts budget values
//! between units.
//!
//! - [`formatters`]: memory, time and I/O formatter families
//! - [`units`]: `kb_to_byte`, `mb_to_byte`, `second_to_millis` and friends

pub mod formatters;
pub mod units;

pub use formatters::{IoFormatter, MemoryFormatter, TimeFormatter, UnitFormatter, NOT_AVAILABLE};
pub use units::{gb_to_byte, kb_to_byte, mb_to_byte, second_to_millis};
