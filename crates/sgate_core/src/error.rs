use core::fmt;

/// Contract violations: a misconfigured caller, never a runtime data condition.
///
/// Data-dependent corner cases (silent input, flat outputs, size mismatch at
/// inference time) have defined fallbacks and never surface here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// Feature destination is shorter than the configured bin count.
    FeatureBufferTooSmall { required: usize, provided: usize },
    /// Model declares more classes than the engine's fixed output buffer holds.
    TooManyOutputs { configured: usize, max: usize },
    /// Model has zero inputs or zero outputs.
    EmptyModel,
    /// Weight table length differs from `input_size * output_size`.
    WeightCountMismatch { expected: usize, actual: usize },
    /// Bias vector length differs from `output_size`.
    BiasCountMismatch { expected: usize, actual: usize },
    /// Processor bin count and model input width disagree.
    FeatureWidthMismatch { bins: usize, model_inputs: usize },
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::FeatureBufferTooSmall { required, provided } => write!(
                f,
                "Feature buffer too small: {} bins configured, {} slots provided",
                required, provided
            ),
            GateError::TooManyOutputs { configured, max } => {
                write!(f, "Model declares {} outputs, at most {} supported", configured, max)
            }
            GateError::EmptyModel => write!(f, "Model has no inputs or no outputs"),
            GateError::WeightCountMismatch { expected, actual } => {
                write!(f, "Weight table has {} entries, expected {}", actual, expected)
            }
            GateError::BiasCountMismatch { expected, actual } => {
                write!(f, "Bias vector has {} entries, expected {}", actual, expected)
            }
            GateError::FeatureWidthMismatch { bins, model_inputs } => write!(
                f,
                "Spectral processor produces {} features but model expects {}",
                bins, model_inputs
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GateError {}
