//! Simulated accelerometer, battery and radio
//!
//! Runs the duty cycle on a desktop without hardware. Everything is
//! deterministic for a given seed, and time is simulated: reading a window
//! advances the clock by the window's duration and sleeping advances it by the
//! requested duration, without blocking the host.
//!
//! # Signal patterns (1 kHz sampling)
//!
//! | Pattern   | Content                                                   |
//! |-----------|-----------------------------------------------------------|
//! | Noise     | uniform noise only                                        |
//! | Sinusoid  | one tone at the configured frequency + noise              |
//! | Anomaly   | 46.875 / 156.25 / 234.375 Hz at 0.2 / 0.65 / 0.3 × amp,   |
//! |           | with 5% of samples carrying 3× burst noise (impacts)      |
//! | Resonance | 375 Hz × 0.7 + 125 Hz × 0.3, broadband structural hum     |
//!
//! The anomaly and resonance tones sit exactly on bins of a 64-bin, 256-sample
//! analysis, so every window sees whole periods.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sgate_core::{AlertKind, BATTERY_NOMINAL_MV, DEFAULT_SAMPLE_RATE_HZ};
use tracing::debug;

use crate::hal::{HalError, HardwareAbstraction};

// =============================================================================
// Simulation constants
// =============================================================================

/// Sleep drains the cell only while it is above this.
const SLEEP_DRAIN_FLOOR_MV: u16 = 2800;
const SLEEP_DRAIN_MV: u16 = 1;

/// Transmissions drain the cell only while it is above this.
const TX_DRAIN_FLOOR_MV: u16 = 2900;
const TX_DRAIN_MV: u16 = 10;

/// Out of 101, matching a 0..=100 roll below 5.
const BURST_PERCENT: u32 = 5;
const BURST_GAIN: i32 = 3;

/// Transmissions remembered by [`MockHal::transmissions`].
const TX_LOG_CAPACITY: usize = 64;

const DEFAULT_SEED: u64 = 0x5EED_6A7E;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VibrationPattern {
    Noise,
    Sinusoid,
    Anomaly,
    Resonance,
}

/// One radio transmission as seen by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transmission {
    pub tick_ms: u64,
    pub kind: AlertKind,
    pub confidence_percent: u8,
    pub battery_mv: u16,
}

#[derive(Debug, Clone)]
pub struct MockHal {
    battery_mv: u16,
    pattern: VibrationPattern,
    frequency_hz: f64,
    amplitude: i16,
    noise_level: i16,
    sample_rate_hz: u32,
    sample_phase: u64,
    rng: ChaCha8Rng,

    /// Simulated milliseconds since boot
    clock_ms: u64,
    wake_pending: bool,
    transmit_count: u32,
    total_sleep_ms: u64,
    sleep_count: u32,
    pending_failures: u32,
    transmissions: VecDeque<Transmission>,
}

impl MockHal {
    /// Nominal battery, 100 Hz sinusoid at amplitude 8000 with ±500 noise.
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            battery_mv: BATTERY_NOMINAL_MV,
            pattern: VibrationPattern::Sinusoid,
            frequency_hz: 100.0,
            amplitude: 8000,
            noise_level: 500,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            sample_phase: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock_ms: 0,
            wake_pending: false,
            transmit_count: 0,
            total_sleep_ms: 0,
            sleep_count: 0,
            pending_failures: 0,
            transmissions: VecDeque::with_capacity(TX_LOG_CAPACITY),
        }
    }

    pub fn with_battery(mut self, battery_mv: u16) -> Self {
        self.battery_mv = battery_mv;
        self
    }

    pub fn with_pattern(mut self, pattern: VibrationPattern) -> Self {
        self.set_pattern(pattern);
        self
    }

    // =========================================================================
    // Test controls
    // =========================================================================

    pub fn set_battery_voltage(&mut self, battery_mv: u16) {
        self.battery_mv = battery_mv;
    }

    /// Switch the generated signal. Restarts the waveform at phase zero.
    pub fn set_pattern(&mut self, pattern: VibrationPattern) {
        self.pattern = pattern;
        self.sample_phase = 0;
    }

    pub fn set_signal_frequency(&mut self, frequency_hz: f64) {
        self.frequency_hz = frequency_hz;
    }

    pub fn set_signal_amplitude(&mut self, amplitude: i16) {
        self.amplitude = amplitude;
    }

    /// Noise is uniform in `[-level, level]`; negative levels are treated as
    /// their magnitude.
    pub fn set_noise_level(&mut self, level: i16) {
        self.noise_level = level.saturating_abs();
    }

    pub fn trigger_wake_event(&mut self) {
        self.wake_pending = true;
    }

    /// Make the next `count` transmissions fail.
    pub fn fail_next_transmissions(&mut self, count: u32) {
        self.pending_failures = count;
    }

    pub fn pattern(&self) -> VibrationPattern {
        self.pattern
    }

    pub fn transmit_count(&self) -> u32 {
        self.transmit_count
    }

    pub fn total_sleep_ms(&self) -> u64 {
        self.total_sleep_ms
    }

    pub fn sleep_count(&self) -> u32 {
        self.sleep_count
    }

    /// Most recent transmissions, oldest first.
    pub fn transmissions(&self) -> impl Iterator<Item = &Transmission> {
        self.transmissions.iter()
    }

    // =========================================================================
    // Signal generation
    // =========================================================================

    fn noise(&mut self) -> i32 {
        let level = self.noise_level as i32;
        if level == 0 {
            return 0;
        }
        self.rng.gen_range(-level..=level)
    }

    fn tone(&self, frequency_hz: f64) -> f64 {
        let t = self.sample_phase as f64 / self.sample_rate_hz as f64;
        (TAU * frequency_hz * t).sin()
    }

    fn next_sample(&mut self) -> i16 {
        let amplitude = self.amplitude as f64;
        let value = match self.pattern {
            VibrationPattern::Noise => self.noise(),
            VibrationPattern::Sinusoid => (amplitude * self.tone(self.frequency_hz)) as i32 + self.noise(),
            VibrationPattern::Anomaly => {
                let signal = amplitude
                    * (0.20 * self.tone(46.875) + 0.65 * self.tone(156.25) + 0.30 * self.tone(234.375));
                let burst = self.rng.gen_range(0..=100u32) < BURST_PERCENT;
                let noise = self.noise();
                signal as i32 + if burst { noise * BURST_GAIN } else { noise }
            }
            VibrationPattern::Resonance => {
                let signal = amplitude * (0.7 * self.tone(375.0) + 0.3 * self.tone(125.0));
                signal as i32 + self.noise()
            }
        };

        self.sample_phase += 1;
        value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }

    fn advance_clock(&mut self, samples: usize) {
        let rate = self.sample_rate_hz.max(1) as u64;
        self.clock_ms += samples as u64 * 1000 / rate;
    }
}

impl Default for MockHal {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAbstraction for MockHal {
    fn read_vibration_data(&mut self, buf: &mut [i16]) -> usize {
        for slot in buf.iter_mut() {
            *slot = self.next_sample();
        }
        self.advance_clock(buf.len());
        buf.len()
    }

    fn battery_voltage_mv(&mut self) -> u16 {
        self.battery_mv
    }

    fn tick_ms(&self) -> u64 {
        self.clock_ms
    }

    fn enter_sleep(&mut self, duration_ms: u32) {
        self.clock_ms += duration_ms as u64;
        self.total_sleep_ms += duration_ms as u64;
        self.sleep_count += 1;

        if self.battery_mv > SLEEP_DRAIN_FLOOR_MV {
            self.battery_mv -= SLEEP_DRAIN_MV;
        }
    }

    fn transmit_alert(&mut self, kind: AlertKind, confidence_percent: u8) -> Result<(), HalError> {
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(HalError::Radio("simulated link loss".to_string()));
        }

        self.transmit_count += 1;
        if self.transmissions.len() == TX_LOG_CAPACITY {
            self.transmissions.pop_front();
        }
        self.transmissions.push_back(Transmission {
            tick_ms: self.clock_ms,
            kind,
            confidence_percent,
            battery_mv: self.battery_mv,
        });
        debug!(
            kind = ?kind,
            confidence_percent,
            battery_mv = self.battery_mv,
            "Mock radio transmission"
        );

        if self.battery_mv > TX_DRAIN_FLOOR_MV {
            self.battery_mv -= TX_DRAIN_MV;
        }
        Ok(())
    }

    fn is_wake_event_pending(&self) -> bool {
        self.wake_pending
    }

    fn clear_wake_event(&mut self) {
        self.wake_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(hal: &mut MockHal) -> Vec<i16> {
        let mut buf = vec![0i16; 256];
        assert_eq!(hal.read_vibration_data(&mut buf), 256);
        buf
    }

    #[test]
    fn test_defaults() {
        let mut hal = MockHal::new();
        assert_eq!(hal.battery_voltage_mv(), BATTERY_NOMINAL_MV);
        assert_eq!(hal.pattern(), VibrationPattern::Sinusoid);
        assert_eq!(hal.tick_ms(), 0);
        assert!(!hal.is_wake_event_pending());
    }

    #[test]
    fn test_same_seed_same_signal() {
        let mut a = MockHal::with_seed(7).with_pattern(VibrationPattern::Anomaly);
        let mut b = MockHal::with_seed(7).with_pattern(VibrationPattern::Anomaly);
        assert_eq!(window(&mut a), window(&mut b));

        let mut c = MockHal::with_seed(8).with_pattern(VibrationPattern::Anomaly);
        assert_ne!(window(&mut a), window(&mut c));
    }

    #[test]
    fn test_noise_stays_in_range() {
        let mut hal = MockHal::with_seed(1).with_pattern(VibrationPattern::Noise);
        hal.set_noise_level(300);
        assert!(window(&mut hal).iter().all(|s| (-300..=300).contains(s)));
    }

    #[test]
    fn test_silent_when_amplitude_and_noise_are_zero() {
        let mut hal = MockHal::with_seed(1).with_pattern(VibrationPattern::Resonance);
        hal.set_signal_amplitude(0);
        hal.set_noise_level(0);
        assert!(window(&mut hal).iter().all(|&s| s == 0));
    }

    #[test]
    fn test_samples_saturate() {
        let mut hal = MockHal::with_seed(1).with_pattern(VibrationPattern::Sinusoid);
        hal.set_signal_frequency(250.0);
        hal.set_signal_amplitude(i16::MAX);
        hal.set_noise_level(i16::MAX);
        let samples = window(&mut hal);
        assert!(samples.iter().any(|&s| s == i16::MAX || s == i16::MIN));
    }

    #[test]
    fn test_pattern_change_resets_phase() {
        let mut hal = MockHal::with_seed(3);
        hal.set_noise_level(0);
        let first = window(&mut hal);
        hal.set_pattern(VibrationPattern::Sinusoid);
        assert_eq!(window(&mut hal), first);
    }

    #[test]
    fn test_clock_is_simulated() {
        let mut hal = MockHal::new();
        window(&mut hal);
        assert_eq!(hal.tick_ms(), 256);
        hal.enter_sleep(1000);
        assert_eq!(hal.tick_ms(), 1256);
        assert_eq!(hal.total_sleep_ms(), 1000);
    }

    #[test]
    fn test_sleep_drain_stops_at_floor() {
        let mut hal = MockHal::new().with_battery(2802);
        for _ in 0..5 {
            hal.enter_sleep(10);
        }
        assert_eq!(hal.battery_voltage_mv(), 2800);
        assert_eq!(hal.sleep_count(), 5);
    }

    #[test]
    fn test_transmit_drains_and_logs() {
        let mut hal = MockHal::new().with_battery(2905);
        hal.transmit_alert(AlertKind::Confirmed, 98).unwrap();
        assert_eq!(hal.battery_voltage_mv(), 2895);

        // at or below the floor the radio no longer drains the cell
        hal.transmit_alert(AlertKind::Uncertain, 55).unwrap();
        hal.transmit_alert(AlertKind::Confirmed, 99).unwrap();
        assert_eq!(hal.battery_voltage_mv(), 2895);
        assert_eq!(hal.transmit_count(), 3);

        let log: Vec<_> = hal.transmissions().collect();
        assert_eq!(log[0].battery_mv, 2905);
        assert_eq!(log[1].kind, AlertKind::Uncertain);
        assert_eq!(log[2].confidence_percent, 99);
    }

    #[test]
    fn test_transmission_log_is_bounded() {
        let mut hal = MockHal::new();
        for i in 0..(TX_LOG_CAPACITY + 10) {
            hal.transmit_alert(AlertKind::Uncertain, (i % 100) as u8).unwrap();
        }
        assert_eq!(hal.transmissions().count(), TX_LOG_CAPACITY);
        assert_eq!(hal.transmissions().next().map(|t| t.confidence_percent), Some(10));
    }

    #[test]
    fn test_injected_radio_failure() {
        let mut hal = MockHal::new();
        hal.fail_next_transmissions(1);
        assert!(matches!(
            hal.transmit_alert(AlertKind::Confirmed, 90),
            Err(HalError::Radio(_))
        ));
        assert_eq!(hal.transmit_count(), 0);
        assert_eq!(hal.battery_voltage_mv(), BATTERY_NOMINAL_MV);
        assert!(hal.transmit_alert(AlertKind::Confirmed, 90).is_ok());
    }

    #[test]
    fn test_wake_events() {
        let mut hal = MockHal::new();
        hal.trigger_wake_event();
        assert!(hal.is_wake_event_pending());
        hal.clear_wake_event();
        assert!(!hal.is_wake_event_pending());
    }
}
