//! One wake cycle end to end: samples and battery in, decision out.

use crate::decision::{effective_threshold, evaluate, Decision, ThresholdConfig};
use crate::error::GateError;
use crate::fixed_point::{Fixed, FIXED_ZERO};
use crate::inference::{InferenceEngine, InferenceResult};
use crate::power::BatteryTier;
use crate::spectral::{SpectralProcessor, SpectralResult, MAX_BINS};

/// Everything computed for one window, kept for logging and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analysis {
    pub spectral: SpectralResult,
    pub inference: InferenceResult,
    pub battery_tier: BatteryTier,
    pub effective_threshold: Fixed,
    pub decision: Decision,
}

/// Spectral Processor, Inference Engine and Decision Engine wired together.
#[derive(Debug, Clone, Copy)]
pub struct SpectralGate<'m> {
    spectral: SpectralProcessor,
    engine: InferenceEngine<'m>,
    thresholds: ThresholdConfig,
}

impl<'m> SpectralGate<'m> {
    /// The processor must emit exactly as many features as the model reads.
    pub fn new(
        spectral: SpectralProcessor,
        engine: InferenceEngine<'m>,
        thresholds: ThresholdConfig,
    ) -> Result<Self, GateError> {
        if spectral.num_bins() != engine.input_size() {
            return Err(GateError::FeatureWidthMismatch {
                bins: spectral.num_bins(),
                model_inputs: engine.input_size(),
            });
        }
        Ok(Self {
            spectral,
            engine,
            thresholds,
        })
    }

    pub fn spectral(&self) -> &SpectralProcessor {
        &self.spectral
    }

    pub fn engine(&self) -> &InferenceEngine<'m> {
        &self.engine
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn analyze(&self, samples: &[i16], battery_mv: u16) -> Analysis {
        let spectral = self.spectral.process(samples);

        let mut features = [FIXED_ZERO; MAX_BINS];
        // The bin count never exceeds MAX_BINS, so the buffer always fits
        let inference = match self.spectral.extract_features(samples, &mut features) {
            Ok(count) => self.engine.run(&features[..count]),
            Err(_) => InferenceResult::default(),
        };

        Analysis {
            spectral,
            inference,
            battery_tier: BatteryTier::from_millivolts(battery_mv),
            effective_threshold: effective_threshold(battery_mv, &self.thresholds),
            decision: evaluate(&spectral, &inference, battery_mv, &self.thresholds),
        }
    }
}

impl SpectralGate<'static> {
    /// 64 bins at 1 kHz, the baked model and default thresholds.
    pub fn with_defaults() -> Self {
        Self {
            spectral: SpectralProcessor::default(),
            engine: InferenceEngine::with_default_model(),
            thresholds: ThresholdConfig::default(),
        }
    }
}
