//! sgate core: energy-adaptive anomaly detection for battery-powered vibration sensors
//!
//! Raw accelerometer samples flow one way through three pure stages:
//!
//! ```text
//! [i16 samples] ──► SpectralProcessor ──► (SpectralResult, features)
//!                                              │
//!                                              ▼
//!                                        InferenceEngine ──► InferenceResult
//!                                              │
//!                   battery_mv ───────────────►▼
//!                                        evaluate() ──► Decision
//! ```
//!
//! Design constraints:
//! - No std: only `core::*`; nothing on the analysis path allocates
//! - Fixed-point math: Q15.16 (`I16F16`) for identical results on every target
//! - Fixed-capacity stack buffers (`MAX_BINS`, `MAX_OUTPUTS`) bound stack usage
//!   regardless of caller configuration
//! - Every stage holds only immutable configuration and is safe to share
//!   between threads without locking
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod decision;
pub mod error;
pub mod fixed_point;
pub mod inference;
pub mod pipeline;
pub mod power;
pub mod spectral;

pub use decision::{confidence_percent, effective_threshold, evaluate, AlertKind, Decision, ThresholdConfig};
pub use error::GateError;
pub use fixed_point::{mul, to_fixed, to_real, Fixed, FIXED_ONE};
pub use inference::{InferenceEngine, InferenceResult, Model, DEFAULT_MODEL, MAX_OUTPUTS};
pub use pipeline::{Analysis, SpectralGate};
pub use power::{BatteryTier, BATTERY_CRITICAL_MV, BATTERY_LOW_MV, BATTERY_NOMINAL_MV};
pub use spectral::{SpectralProcessor, SpectralResult, MAX_BINS};

/// Samples captured per wake cycle.
pub const VIBRATION_BUFFER_SIZE: usize = 256;

/// Frequency bins evaluated by the default front end.
pub const NUM_SPECTRAL_BINS: usize = 64;

/// Nominal accelerometer sample rate.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 1000;
