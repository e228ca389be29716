//! Property sweeps over the Decision Engine.

use sgate_core::{
    effective_threshold, evaluate, to_fixed, Decision, Fixed, InferenceResult, SpectralResult, ThresholdConfig,
};

fn permissiveness(decision: Decision) -> u8 {
    match decision {
        Decision::Sleep => 0,
        Decision::TxUncertain => 1,
        Decision::TxAlert => 2,
    }
}

fn spectral(num_peaks: u8, peak: f32) -> SpectralResult {
    SpectralResult {
        dominant_frequency: to_fixed(156.25),
        peak_magnitude: to_fixed(peak),
        spectral_centroid: to_fixed(32.0),
        num_peaks,
    }
}

fn voltages_falling() -> impl Iterator<Item = u16> {
    (2400..=4300u16).rev().step_by(25)
}

fn configs() -> [ThresholdConfig; 3] {
    [
        ThresholdConfig::default(),
        ThresholdConfig::from_real(0.5, 1.0, 1.0, 1),
        ThresholdConfig::from_real(0.4, 1.6, 2.4, 3),
    ]
}

#[test]
fn effective_threshold_never_drops_as_battery_drains() {
    for config in configs() {
        let mut previous = Fixed::MIN;
        for mv in voltages_falling() {
            let threshold = effective_threshold(mv, &config);
            assert!(threshold >= previous, "threshold fell at {} mV", mv);
            previous = threshold;
        }
    }
}

#[test]
fn anomaly_decisions_never_loosen_as_battery_drains() {
    for config in configs() {
        for percent in 0..=100u32 {
            let inference = InferenceResult {
                confidence: Fixed::from_bits((percent as i32 * 65_536) / 100),
                predicted_class: 1,
            };
            let mut previous = u8::MAX;
            for mv in voltages_falling() {
                let rank = permissiveness(evaluate(&spectral(6, 0.5), &inference, mv, &config));
                assert!(rank <= previous, "{}% became more permissive at {} mV", percent, mv);
                previous = rank;
            }
        }
    }
}

#[test]
fn gate_wins_over_any_inference() {
    let config = ThresholdConfig::default();
    let quiet = [spectral(0, 5.0), spectral(1, 5.0), spectral(8, 0.1), spectral(8, 0.0)];
    for window in &quiet {
        for class in 0..=3u8 {
            let inference = InferenceResult {
                confidence: to_fixed(1.0),
                predicted_class: class,
            };
            for mv in [2500u16, 3100, 4100] {
                assert_eq!(evaluate(window, &inference, mv, &config), Decision::Sleep);
            }
        }
    }
}

#[test]
fn confirmed_alerts_survive_every_tier() {
    let config = ThresholdConfig::default();
    let certain = InferenceResult {
        confidence: to_fixed(1.0),
        predicted_class: 1,
    };
    for mv in voltages_falling() {
        assert_eq!(evaluate(&spectral(2, 0.5), &certain, mv, &config), Decision::TxAlert);
    }
}

#[test]
fn uncertain_class_is_vetoed_below_low() {
    let config = ThresholdConfig::default();
    let uncertain = InferenceResult {
        confidence: to_fixed(0.9),
        predicted_class: 2,
    };
    for mv in voltages_falling() {
        let expected = if mv >= 3300 { Decision::TxUncertain } else { Decision::Sleep };
        assert_eq!(evaluate(&spectral(3, 0.5), &uncertain, mv, &config), expected, "{} mV", mv);
    }
}

#[test]
fn documented_scenarios() {
    let config = ThresholdConfig::default();
    let anomaly = |confidence: f32| InferenceResult {
        confidence: to_fixed(confidence),
        predicted_class: 1,
    };
    let uncertain = InferenceResult {
        confidence: to_fixed(0.6),
        predicted_class: 2,
    };

    // energy veto
    assert_eq!(evaluate(&spectral(3, 0.5), &uncertain, 2900, &config), Decision::Sleep);
    assert_eq!(evaluate(&spectral(3, 0.5), &uncertain, 4100, &config), Decision::TxUncertain);

    // safety override
    assert_eq!(evaluate(&spectral(3, 0.5), &anomaly(0.98), 2700, &config), Decision::TxAlert);

    // alert / uncertain boundary at nominal battery
    assert_eq!(evaluate(&spectral(3, 0.5), &anomaly(0.85), 4100, &config), Decision::TxAlert);
    assert_eq!(evaluate(&spectral(3, 0.5), &anomaly(0.50), 4100, &config), Decision::TxUncertain);
    assert_eq!(evaluate(&spectral(3, 0.5), &anomaly(0.40), 4100, &config), Decision::Sleep);
}
