//! Decision Engine: battery-tiered, class-conditional policy
//!
//! ```text
//! spectral gate ──(no signal)──────────────────────────────► SLEEP
//!      │
//!      ▼
//! class 0 (normal) ────────────────────────────────────────► SLEEP
//! class 1 (anomaly) ── conf ≥ T ──────────────────────────► TX_ALERT
//!                   └─ conf ≥ 0.7·T ──────────────────────► TX_UNCERTAIN
//!                   └─ otherwise ─────────────────────────► SLEEP
//! class 2 (uncertain) ── battery ≥ LOW and extra peak ────► TX_UNCERTAIN
//!                     └─ otherwise (energy veto) ─────────► SLEEP
//! ```
//!
//! `T` is the battery-scaled threshold. Confirmed alerts are never vetoed on
//! energy grounds; only the threshold they must clear rises as the cell
//! drains.

use serde::{Deserialize, Serialize};

use crate::fixed_point::{clamp, mul, to_fixed, Fixed, FIXED_ONE, FIXED_ZERO, FRAC_BITS};
use crate::inference::{InferenceResult, CLASS_ANOMALY, CLASS_NORMAL, CLASS_UNCERTAIN};
use crate::power::{BatteryTier, BATTERY_LOW_MV};
use crate::spectral::SpectralResult;

/// Fraction of the effective threshold above which an anomaly is still worth
/// an uncertain report (0.7).
const UNCERTAIN_FRACTION: Fixed = Fixed::from_bits(45_875);

/// Minimum peak magnitude for the window to count as physical activity (0.1).
const SIGNAL_FLOOR: Fixed = Fixed::from_bits(6_553);

/// What the node does with the radio after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Decision {
    Sleep = 0,
    TxAlert = 1,
    TxUncertain = 2,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Sleep => "SLEEP",
            Decision::TxAlert => "TX_ALERT",
            Decision::TxUncertain => "TX_UNCERTAIN",
        }
    }

    /// Alert type to hand to the radio, if this decision transmits.
    pub fn alert_kind(self) -> Option<AlertKind> {
        match self {
            Decision::Sleep => None,
            Decision::TxAlert => Some(AlertKind::Confirmed),
            Decision::TxUncertain => Some(AlertKind::Uncertain),
        }
    }

    pub fn transmits(self) -> bool {
        self != Decision::Sleep
    }
}

impl core::fmt::Display for Decision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert type carried in a transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AlertKind {
    Uncertain = 0,
    Confirmed = 1,
}

impl AlertKind {
    /// Wire code understood by the radio collaborator.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Thresholds for the Decision Engine. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdConfig {
    pub base_confidence_threshold: Fixed,
    pub low_battery_multiplier: Fixed,
    pub critical_battery_multiplier: Fixed,
    pub min_peaks_for_detection: u8,
}

impl Default for ThresholdConfig {
    /// base 0.65, low ×1.2, critical ×1.5, two peaks
    fn default() -> Self {
        Self {
            base_confidence_threshold: Fixed::from_bits(42_598),
            low_battery_multiplier: Fixed::from_bits(78_643),
            critical_battery_multiplier: Fixed::from_bits(98_304),
            min_peaks_for_detection: 2,
        }
    }
}

impl ThresholdConfig {
    /// Build from real values. Boundary use (configuration files, tests).
    pub fn from_real(base: f32, low_multiplier: f32, critical_multiplier: f32, min_peaks: u8) -> Self {
        Self {
            base_confidence_threshold: to_fixed(base),
            low_battery_multiplier: to_fixed(low_multiplier),
            critical_battery_multiplier: to_fixed(critical_multiplier),
            min_peaks_for_detection: min_peaks,
        }
    }
}

/// Confidence an anomaly must reach at `battery_mv`.
///
/// Non-decreasing as voltage falls, provided the multipliers are ordered
/// `1 <= low <= critical`.
pub fn effective_threshold(battery_mv: u16, config: &ThresholdConfig) -> Fixed {
    let base = config.base_confidence_threshold;
    match BatteryTier::from_millivolts(battery_mv).multiplier(config) {
        Some(multiplier) => mul(base, multiplier),
        None => base,
    }
}

/// Map one cycle's analysis onto a [`Decision`].
///
/// Pure: the same four inputs always give the same answer.
pub fn evaluate(
    spectral: &SpectralResult,
    inference: &InferenceResult,
    battery_mv: u16,
    config: &ThresholdConfig,
) -> Decision {
    let min_peaks = config.min_peaks_for_detection;

    // No physical signal: nothing the model says can override that
    if spectral.num_peaks < min_peaks || spectral.peak_magnitude <= SIGNAL_FLOOR {
        return Decision::Sleep;
    }

    match inference.predicted_class {
        CLASS_NORMAL => Decision::Sleep,
        CLASS_ANOMALY => {
            let threshold = effective_threshold(battery_mv, config);
            if inference.confidence >= threshold {
                Decision::TxAlert
            } else if inference.confidence >= mul(threshold, UNCERTAIN_FRACTION) {
                Decision::TxUncertain
            } else {
                Decision::Sleep
            }
        }
        CLASS_UNCERTAIN => {
            let extra_peak = spectral.num_peaks as u16 > min_peaks as u16;
            if battery_mv >= BATTERY_LOW_MV && extra_peak {
                Decision::TxUncertain
            } else {
                Decision::Sleep
            }
        }
        _ => Decision::Sleep,
    }
}

/// `round(confidence × 100)`, clamped to 0..=100.
pub fn confidence_percent(confidence: Fixed) -> u8 {
    let bits = clamp(confidence, FIXED_ZERO, FIXED_ONE).to_bits() as i64;
    let half = 1i64 << (FRAC_BITS - 1);
    ((bits * 100 + half) >> FRAC_BITS) as u8
}
