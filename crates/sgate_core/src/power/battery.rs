//! Battery tiers
//!
//! | Tier     | Voltage               | Threshold               |
//! |----------|-----------------------|-------------------------|
//! | Nominal  | `mv >= 3300`          | base                    |
//! | Low      | `3000 <= mv < 3300`   | base × low multiplier   |
//! | Critical | `mv < 3000`           | base × critical mult.   |
//!
//! `BATTERY_NOMINAL_MV` is reported by the HAL for a full cell but does not
//! open a tier of its own: everything at or above LOW is treated alike.

use serde::{Deserialize, Serialize};

use crate::decision::ThresholdConfig;
use crate::fixed_point::Fixed;

// =============================================================================
// Contract constants (millivolts)
// =============================================================================

/// Below this the node is in survival mode.
pub const BATTERY_CRITICAL_MV: u16 = 3000;

/// Below this uncertain readings are no longer worth the radio energy.
pub const BATTERY_LOW_MV: u16 = 3300;

/// Typical fully charged cell.
pub const BATTERY_NOMINAL_MV: u16 = 3700;

/// Voltage band that scales the decision threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BatteryTier {
    Critical,
    Low,
    Nominal,
}

impl BatteryTier {
    pub fn from_millivolts(battery_mv: u16) -> Self {
        if battery_mv < BATTERY_CRITICAL_MV {
            BatteryTier::Critical
        } else if battery_mv < BATTERY_LOW_MV {
            BatteryTier::Low
        } else {
            BatteryTier::Nominal
        }
    }

    /// Threshold multiplier for this tier, `None` when the base applies as is.
    pub fn multiplier(self, config: &ThresholdConfig) -> Option<Fixed> {
        match self {
            BatteryTier::Critical => Some(config.critical_battery_multiplier),
            BatteryTier::Low => Some(config.low_battery_multiplier),
            BatteryTier::Nominal => None,
        }
    }

    /// Whether exploratory (uncertain-class) transmissions are affordable.
    pub fn allows_exploration(self) -> bool {
        self == BatteryTier::Nominal
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BatteryTier::Critical => "CRITICAL",
            BatteryTier::Low => "LOW",
            BatteryTier::Nominal => "NOMINAL",
        }
    }
}

impl core::fmt::Display for BatteryTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
