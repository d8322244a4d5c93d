//! Platform abstraction layer
//!
//! Real input sources that feed the merged event channel:
//! - Time/ticks (fixed-rate interval timer)

pub mod time;

pub use time::IntervalTimer;
