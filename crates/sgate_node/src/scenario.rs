//! Energy-adaptive day-in-the-life demo
//!
//! Twelve scripted readings walk the Decision Engine through three phases:
//!
//! | Phase   | Battery       | Reading                     | Expected       |
//! |---------|---------------|-----------------------------|----------------|
//! | Morning | 4100-4000 mV  | uncertain class, ~55%       | TX_UNCERTAIN   |
//! | Evening | 2900-2750 mV  | the same uncertain readings | SLEEP (veto)   |
//! | Damage  | 2700-2550 mV  | anomaly, ≥ 98%              | TX_ALERT       |
//!
//! Readings bypass the spectral and inference stages so the decision policy
//! is shown in isolation; the decisions are still acted on through the HAL.

use serde::Serialize;
use sgate_core::{
    confidence_percent, effective_threshold, evaluate, to_fixed, to_real, Decision, InferenceResult, SpectralResult,
    ThresholdConfig, BATTERY_LOW_MV,
};
use std::fmt;
use std::io;
use tracing::info;

use crate::hal::HardwareAbstraction;
use crate::mock_hal::MockHal;

const DEMO_SLEEP_MS: u32 = 1000;
const DEMO_DOMINANT_HZ: f32 = 150.0;
const DEMO_CENTROID: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoReading {
    pub time: &'static str,
    /// Set on the first reading of each phase.
    pub phase: Option<&'static str>,
    pub battery_mv: u16,
    pub confidence: f32,
    pub predicted_class: u8,
    pub num_peaks: u8,
    pub peak_magnitude: f32,
}

const fn reading(
    time: &'static str,
    phase: Option<&'static str>,
    battery_mv: u16,
    confidence: f32,
    predicted_class: u8,
    num_peaks: u8,
    peak_magnitude: f32,
) -> DemoReading {
    DemoReading {
        time,
        phase,
        battery_mv,
        confidence,
        predicted_class,
        num_peaks,
        peak_magnitude,
    }
}

pub const MORNING: &str = "PHASE 1: MORNING - High Energy, Abundant Resources";
pub const EVENING: &str = "PHASE 2: EVENING - Low Energy, Conservation Mode";
pub const DAMAGE: &str = "PHASE 3: DAMAGE DETECTED - Safety Critical Override";

#[rustfmt::skip]
pub const DEMO_READINGS: [DemoReading; 12] = [
    reading("06:00", Some(MORNING), 4100, 0.55, 2, 3, 0.5),
    reading("07:00", None,          4100, 0.58, 2, 3, 0.5),
    reading("08:00", None,          4050, 0.52, 2, 3, 0.5),
    reading("09:00", None,          4000, 0.60, 2, 4, 0.5),
    reading("17:00", Some(EVENING), 2900, 0.55, 2, 3, 0.5),
    reading("18:00", None,          2850, 0.58, 2, 3, 0.5),
    reading("19:00", None,          2800, 0.52, 2, 3, 0.5),
    reading("20:00", None,          2750, 0.60, 2, 4, 0.5),
    reading("21:00", Some(DAMAGE),  2700, 0.98, 1, 5, 0.9),
    reading("21:30", None,          2650, 0.99, 1, 6, 0.95),
    reading("22:00", None,          2600, 0.985, 1, 5, 0.85),
    reading("22:30", None,          2550, 0.995, 1, 7, 0.98),
];

/// One line of the demo table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DemoRow {
    pub time: &'static str,
    #[serde(skip)]
    pub phase: Option<&'static str>,
    pub battery_mv: u16,
    pub probability_percent: f32,
    pub threshold_percent: f32,
    pub decision: &'static str,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoSummary {
    pub rows: Vec<DemoRow>,
    pub tx_uncertain: u32,
    pub tx_alert: u32,
    pub sleeps: u32,
    pub tx_failures: u32,
}

/// Short label for why a reading ended the way it did.
pub fn decision_reason(decision: Decision, battery_mv: u16, class: u8, confidence: f32, threshold: f32) -> &'static str {
    match decision {
        Decision::TxUncertain => "Active Learn",
        Decision::TxAlert => "Safety Crit",
        Decision::Sleep => {
            if class == 2 && battery_mv < BATTERY_LOW_MV {
                "Energy Veto"
            } else if class == 1 && confidence < threshold {
                "Low Conf"
            } else if class == 0 {
                "Normal Op"
            } else {
                "Conserve"
            }
        }
    }
}

/// Replay `readings` through the Decision Engine, acting on each decision.
pub fn run_demo(hal: &mut MockHal, readings: &[DemoReading], config: &ThresholdConfig) -> DemoSummary {
    let mut summary = DemoSummary::default();

    for r in readings {
        hal.set_battery_voltage(r.battery_mv);

        let spectral = SpectralResult {
            dominant_frequency: to_fixed(DEMO_DOMINANT_HZ),
            peak_magnitude: to_fixed(r.peak_magnitude),
            spectral_centroid: to_fixed(DEMO_CENTROID),
            num_peaks: r.num_peaks,
        };
        let inference = InferenceResult {
            confidence: to_fixed(r.confidence),
            predicted_class: r.predicted_class,
        };

        let threshold = to_real(effective_threshold(r.battery_mv, config));
        let decision = evaluate(&spectral, &inference, r.battery_mv, config);
        let reason = decision_reason(decision, r.battery_mv, r.predicted_class, r.confidence, threshold);

        info!(
            time = r.time,
            battery_mv = r.battery_mv,
            confidence = r.confidence,
            threshold,
            decision = %decision,
            reason,
            "Demo reading"
        );

        match decision.alert_kind() {
            Some(kind) => {
                match decision {
                    Decision::TxAlert => summary.tx_alert += 1,
                    _ => summary.tx_uncertain += 1,
                }
                if hal.transmit_alert(kind, confidence_percent(inference.confidence)).is_err() {
                    summary.tx_failures += 1;
                }
            }
            None => {
                summary.sleeps += 1;
                hal.enter_sleep(DEMO_SLEEP_MS);
            }
        }

        summary.rows.push(DemoRow {
            time: r.time,
            phase: r.phase,
            battery_mv: r.battery_mv,
            probability_percent: r.confidence * 100.0,
            threshold_percent: threshold * 100.0,
            decision: decision.as_str(),
            reason,
        });
    }

    summary
}

/// Box-drawn console table with a banner per phase.
pub fn render_table(rows: &[DemoRow]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_table(&mut out, rows);
    out
}

fn write_table<W: fmt::Write>(out: &mut W, rows: &[DemoRow]) -> fmt::Result {
    const TOP: &str = "┌──────────┬────────────┬─────────────┬───────────┬──────────────┬───────────────┐";
    const CLOSE: &str = "├──────────┴────────────┴─────────────┴───────────┴──────────────┴───────────────┤";
    const OPEN: &str = "├──────────┬────────────┬─────────────┬───────────┬──────────────┬───────────────┤";
    const BOTTOM: &str = "└──────────┴────────────┴─────────────┴───────────┴──────────────┴───────────────┘";

    writeln!(out, "{TOP}")?;
    writeln!(
        out,
        "│ {:<8} │ {:>10} │ {:>11} │ {:>9} │ {:<12} │ {:<13} │",
        "Time", "V_bat (mV)", "Probability", "Threshold", "Decision", "Reason"
    )?;

    for row in rows {
        if let Some(phase) = row.phase {
            writeln!(out, "{CLOSE}")?;
            writeln!(out, "│ {:<78} │", phase)?;
            writeln!(out, "{OPEN}")?;
        }
        writeln!(
            out,
            "│ {:<8} │ {:>10} │ {:>10.1}% │ {:>8.1}% │ {:<12} │ {:<13} │",
            row.time, row.battery_mv, row.probability_percent, row.threshold_percent, row.decision, row.reason
        )?;
    }

    writeln!(out, "{BOTTOM}")
}

/// Write rows as CSV with a header line.
pub fn write_csv<W: io::Write>(rows: &[DemoRow], writer: W) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}
