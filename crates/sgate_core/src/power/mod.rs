//! Battery tiers and the voltage contract shared with the HAL.

pub mod battery;

pub use battery::{BatteryTier, BATTERY_CRITICAL_MV, BATTERY_LOW_MV, BATTERY_NOMINAL_MV};
