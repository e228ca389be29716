//! Wake-sample-compute-sleep duty cycle
//!
//! ```text
//!   ┌──────────┐   window    ┌─────────────┐  decision  ┌──────────────┐
//!   │   HAL    │ ──────────► │ SpectralGate │ ─────────► │ sleep / TX   │
//!   │ (sample) │   battery   │  (pure)      │            │ (HAL action) │
//!   └──────────┘             └─────────────┘            └──────────────┘
//! ```
//!
//! The node owns the only mutable state in the system: the HAL and a few
//! counters. Radio failures are logged and counted; a failed alert never
//! aborts the loop.

use serde::Serialize;
use sgate_core::{confidence_percent, to_real, Analysis, Decision, SpectralGate, VIBRATION_BUFFER_SIZE};
use tracing::{debug, info, warn};

use crate::hal::HardwareAbstraction;

/// Duty-cycle timing and window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSettings {
    pub sleep_interval_ms: u32,
    /// Samples per window, at most [`VIBRATION_BUFFER_SIZE`].
    pub window_size: usize,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            sleep_interval_ms: 1000,
            window_size: VIBRATION_BUFFER_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    pub cycles: u64,
    pub sleeps: u64,
    pub alerts: u64,
    pub uncertain: u64,
    pub tx_failures: u64,
}

/// What happened in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub tick_ms: u64,
    pub battery_mv: u16,
    pub samples: usize,
    pub analysis: Analysis,
    /// `false` when the decision called for a transmission that failed.
    pub delivered: bool,
}

impl CycleReport {
    pub fn decision(&self) -> Decision {
        self.analysis.decision
    }
}

pub struct SensorNode<'m, H: HardwareAbstraction> {
    hal: H,
    gate: SpectralGate<'m>,
    settings: NodeSettings,
    stats: NodeStats,
}

impl<'m, H: HardwareAbstraction> SensorNode<'m, H> {
    pub fn new(hal: H, gate: SpectralGate<'m>, settings: NodeSettings) -> Self {
        let settings = NodeSettings {
            window_size: settings.window_size.clamp(1, VIBRATION_BUFFER_SIZE),
            ..settings
        };
        Self {
            hal,
            gate,
            settings,
            stats: NodeStats::default(),
        }
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    pub fn into_hal(self) -> H {
        self.hal
    }

    pub fn settings(&self) -> &NodeSettings {
        &self.settings
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// Sample one window, analyse it and act on the decision.
    pub fn run_cycle(&mut self) -> CycleReport {
        let mut buffer = [0i16; VIBRATION_BUFFER_SIZE];
        let window = &mut buffer[..self.settings.window_size];
        let samples = self.hal.read_vibration_data(window).min(window.len());
        let battery_mv = self.hal.battery_voltage_mv();
        let tick_ms = self.hal.tick_ms();

        let analysis = self.gate.analyze(&window[..samples], battery_mv);
        self.stats.cycles += 1;

        debug!(
            tick_ms,
            samples,
            peak = to_real(analysis.spectral.peak_magnitude),
            num_peaks = analysis.spectral.num_peaks,
            dominant_hz = to_real(analysis.spectral.dominant_frequency),
            class = analysis.inference.predicted_class,
            confidence = to_real(analysis.inference.confidence),
            "Window analysed"
        );

        let delivered = self.act(&analysis, battery_mv);

        CycleReport {
            tick_ms,
            battery_mv,
            samples,
            analysis,
            delivered,
        }
    }

    /// Run an immediate cycle if the board raised a wake event.
    pub fn poll_wake(&mut self) -> Option<CycleReport> {
        if !self.hal.is_wake_event_pending() {
            return None;
        }
        self.hal.clear_wake_event();
        info!(tick_ms = self.hal.tick_ms(), "Wake event");
        Some(self.run_cycle())
    }

    /// Run `cycles` duty cycles back to back, servicing wake events first.
    pub fn run(&mut self, cycles: u64) -> Vec<CycleReport> {
        let mut reports = Vec::new();
        for _ in 0..cycles {
            if let Some(report) = self.poll_wake() {
                reports.push(report);
            }
            reports.push(self.run_cycle());
        }
        reports
    }

    fn act(&mut self, analysis: &Analysis, battery_mv: u16) -> bool {
        let decision = analysis.decision;
        let Some(kind) = decision.alert_kind() else {
            self.stats.sleeps += 1;
            self.hal.enter_sleep(self.settings.sleep_interval_ms);
            return true;
        };

        let percent = confidence_percent(analysis.inference.confidence);
        match self.hal.transmit_alert(kind, percent) {
            Ok(()) => {
                match decision {
                    Decision::TxAlert => self.stats.alerts += 1,
                    _ => self.stats.uncertain += 1,
                }
                info!(
                    decision = %decision,
                    confidence_percent = percent,
                    battery_mv,
                    tier = %analysis.battery_tier,
                    "Alert transmitted"
                );
                true
            }
            Err(e) => {
                self.stats.tx_failures += 1;
                warn!(error = %e, decision = %decision, battery_mv, "Transmission failed");
                false
            }
        }
    }
}
