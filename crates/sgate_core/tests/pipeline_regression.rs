//! End-to-end regression on integer-synthesized windows.
//!
//! Every window is built from `fast_sin` itself, so the transform sees exactly
//! aligned tones and the expected outputs are exact bit patterns.

use sgate_core::spectral::fast_sin;
use sgate_core::{BatteryTier, Decision, SpectralGate, SpectralProcessor, VIBRATION_BUFFER_SIZE};

/// `gain * tri(bin) >> shift` summed over the given tones.
fn window(tones: &[(u32, i32, u32)]) -> [i16; VIBRATION_BUFFER_SIZE] {
    let mut samples = [0i16; VIBRATION_BUFFER_SIZE];
    for (n, sample) in samples.iter_mut().enumerate() {
        let mut value = 0i32;
        for &(bin, gain, shift) in tones {
            value += (fast_sin(4 * bin * n as u32).to_bits() * gain) >> shift;
        }
        *sample = value as i16;
    }
    samples
}

fn decisions(gate: &SpectralGate<'_>, samples: &[i16]) -> [Decision; 3] {
    [4100, 3200, 2900].map(|mv| gate.analyze(samples, mv).decision)
}

#[test]
fn low_band_tone_is_below_signal_floor() {
    let gate = SpectralGate::with_defaults();
    let samples = window(&[(8, 1, 2)]);
    let analysis = gate.analyze(&samples, 4100);

    assert_eq!(analysis.spectral.peak_magnitude.to_bits(), 6_144);
    assert_eq!(analysis.spectral.num_peaks, 4);
    assert_eq!(analysis.spectral.dominant_frequency.to_bits(), 4_096_000);
    assert_eq!(analysis.spectral.spectral_centroid.to_bits(), 2_097_152);
    assert_eq!(analysis.inference.predicted_class, 0);
    assert_eq!(analysis.inference.confidence.to_bits(), 50_470);
    assert_eq!(decisions(&gate, &samples), [Decision::Sleep; 3]);
}

#[test]
fn mid_band_tone_alerts_then_downgrades() {
    let gate = SpectralGate::with_defaults();
    let samples = window(&[(10, 3, 3)]);
    let analysis = gate.analyze(&samples, 4100);

    assert_eq!(analysis.spectral.peak_magnitude.to_bits(), 8_256);
    assert_eq!(analysis.spectral.num_peaks, 2);
    // 78.125 Hz
    assert_eq!(analysis.spectral.dominant_frequency.to_bits(), 5_120_000);
    assert_eq!(analysis.inference.predicted_class, 1);
    assert_eq!(analysis.inference.confidence.to_bits(), 50_973);
    assert_eq!(
        decisions(&gate, &samples),
        [Decision::TxAlert, Decision::TxUncertain, Decision::TxUncertain]
    );
}

#[test]
fn mid_band_pair_with_extra_peaks() {
    let gate = SpectralGate::with_defaults();
    let samples = window(&[(10, 3, 3), (12, 1, 3)]);
    let analysis = gate.analyze(&samples, 4100);

    assert_eq!(analysis.spectral.peak_magnitude.to_bits(), 8_256);
    assert_eq!(analysis.spectral.num_peaks, 4);
    assert_eq!(analysis.inference.predicted_class, 1);
    assert_eq!(analysis.inference.confidence.to_bits(), 50_726);
    assert_eq!(
        decisions(&gate, &samples),
        [Decision::TxAlert, Decision::TxUncertain, Decision::TxUncertain]
    );
}

#[test]
fn strong_low_tone_is_normal() {
    let gate = SpectralGate::with_defaults();
    let samples = window(&[(4, 3, 3)]);
    let analysis = gate.analyze(&samples, 4100);

    assert_eq!(analysis.spectral.peak_magnitude.to_bits(), 8_448);
    assert_eq!(analysis.spectral.num_peaks, 2);
    assert_eq!(analysis.spectral.dominant_frequency.to_bits(), 2_048_000);
    assert_eq!(analysis.inference.predicted_class, 0);
    assert_eq!(analysis.inference.confidence.to_bits(), 48_892);
    assert_eq!(decisions(&gate, &samples), [Decision::Sleep; 3]);
}

#[test]
fn high_band_tone_is_vetoed_when_energy_is_scarce() {
    let gate = SpectralGate::with_defaults();
    let samples = window(&[(24, 3, 3)]);
    let analysis = gate.analyze(&samples, 4100);

    assert_eq!(analysis.spectral.peak_magnitude.to_bits(), 9_216);
    assert_eq!(analysis.spectral.num_peaks, 4);
    // 187.5 Hz
    assert_eq!(analysis.spectral.dominant_frequency.to_bits(), 12_288_000);
    assert_eq!(analysis.inference.predicted_class, 2);
    assert_eq!(analysis.inference.confidence.to_bits(), 56_991);
    assert_eq!(
        decisions(&gate, &samples),
        [Decision::TxUncertain, Decision::Sleep, Decision::Sleep]
    );
}

#[test]
fn analysis_reports_tier_and_threshold() {
    let gate = SpectralGate::with_defaults();
    let samples = window(&[(10, 3, 3)]);

    let low = gate.analyze(&samples, 3200);
    assert_eq!(low.battery_tier, BatteryTier::Low);
    assert_eq!(low.effective_threshold.to_bits(), 51_117);

    let critical = gate.analyze(&samples, 2900);
    assert_eq!(critical.battery_tier, BatteryTier::Critical);
    assert_eq!(critical.effective_threshold.to_bits(), 63_897);
}

#[test]
fn repeated_analysis_is_identical() {
    let gate = SpectralGate::with_defaults();
    let samples = window(&[(10, 3, 3), (24, 1, 3)]);
    assert_eq!(gate.analyze(&samples, 3500), gate.analyze(&samples, 3500));
}

#[test]
fn oversized_processor_is_capped() {
    let processor = SpectralProcessor::new(4096, 1000);
    assert_eq!(processor.num_bins(), sgate_core::MAX_BINS);
    let result = processor.process(&window(&[(10, 3, 3)]));
    assert!(result.peak_magnitude.to_bits() > 0);
}
