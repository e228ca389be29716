//! Inference Engine: quantized single-layer classifier
//!
//! ```text
//! features[N] ─► Σ f·w (i64) ─► >>7 ─► ×scale ─► +bias ─► ReLU ─► normalize ─► argmax
//! ```
//!
//! Weights and biases are int8 with an implicit x128 scale. Normalization is a
//! min/max-then-sum rescale, not softmax; see [`normalize_outputs`].

mod model_weights;
mod quantized;

pub use model_weights::{DEFAULT_MODEL, MODEL_INPUT_SIZE, MODEL_OUTPUT_SIZE};
pub use quantized::{argmax, normalize_outputs, InferenceEngine, Model, MAX_OUTPUTS};

use crate::fixed_point::Fixed;

/// Normal operation; never transmitted.
pub const CLASS_NORMAL: u8 = 0;
/// Anomaly: eligible for a confirmed alert.
pub const CLASS_ANOMALY: u8 = 1;
/// Uncertain: reported for labelling only while energy is plentiful.
pub const CLASS_UNCERTAIN: u8 = 2;

/// Outcome of one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InferenceResult {
    /// Normalized output of the winning class, in [0, 1].
    pub confidence: Fixed,
    pub predicted_class: u8,
}
