use crate::error::GateError;
use crate::fixed_point::{clamp, div_bits_or, mul, saturate_bits, saturating_mul, Fixed, FIXED_ONE, FIXED_ZERO, FRAC_BITS, ONE_BITS};

use super::model_weights::DEFAULT_MODEL;
use super::InferenceResult;

/// Hard cap on classes, independent of the configured model.
pub const MAX_OUTPUTS: usize = 8;

/// Weights carry an implicit x128 scale.
const WEIGHT_SHIFT: u32 = 7;

/// Outputs whose spread is below this (0.001) are indistinguishable.
const FLAT_EPSILON: Fixed = Fixed::from_bits(65);

/// The spread is pre-shifted before inversion to keep the quotient in i32.
const SPREAD_SHIFT: u32 = 8;

/// Single-layer int8 classifier.
///
/// `weights` is row-major `[output_size][input_size]`. Biases are int8 values
/// on the same x128 scale as the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Model<'a> {
    pub weights: &'a [i8],
    pub biases: &'a [i8],
    pub input_size: usize,
    pub output_size: usize,
    pub scale_factor: Fixed,
}

impl<'a> Model<'a> {
    pub const fn new(
        weights: &'a [i8],
        biases: &'a [i8],
        input_size: usize,
        output_size: usize,
        scale_factor: Fixed,
    ) -> Self {
        Self {
            weights,
            biases,
            input_size,
            output_size,
            scale_factor,
        }
    }

    /// Check the shape against the engine's fixed buffers.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.output_size > MAX_OUTPUTS {
            return Err(GateError::TooManyOutputs {
                configured: self.output_size,
                max: MAX_OUTPUTS,
            });
        }
        if self.input_size == 0 || self.output_size == 0 {
            return Err(GateError::EmptyModel);
        }

        let expected = self.input_size.saturating_mul(self.output_size);
        if self.weights.len() != expected {
            return Err(GateError::WeightCountMismatch {
                expected,
                actual: self.weights.len(),
            });
        }
        if self.biases.len() != self.output_size {
            return Err(GateError::BiasCountMismatch {
                expected: self.output_size,
                actual: self.biases.len(),
            });
        }
        Ok(())
    }

    fn row(&self, class: usize) -> Option<&'a [i8]> {
        let start = class.checked_mul(self.input_size)?;
        self.weights.get(start..start.checked_add(self.input_size)?)
    }
}

/// Quantized inference over an immutable model.
///
/// Holds no mutable state; one engine can serve any number of callers.
#[derive(Debug, Clone, Copy)]
pub struct InferenceEngine<'a> {
    model: Model<'a>,
}

impl<'a> InferenceEngine<'a> {
    /// Build an engine, rejecting models that would overrun the output buffer
    /// or whose tables do not match their declared shape.
    pub fn new(model: Model<'a>) -> Result<Self, GateError> {
        model.validate()?;
        Ok(Self { model })
    }

    pub fn model(&self) -> &Model<'a> {
        &self.model
    }

    pub fn input_size(&self) -> usize {
        self.model.input_size
    }

    pub fn output_size(&self) -> usize {
        self.model.output_size
    }

    /// Classify one feature vector.
    ///
    /// A vector whose length differs from the model's input width yields the
    /// zero-confidence normal result, which the decision stage turns into
    /// SLEEP.
    pub fn run(&self, features: &[Fixed]) -> InferenceResult {
        if features.len() != self.model.input_size {
            return InferenceResult::default();
        }

        let classes = self.model.output_size.min(MAX_OUTPUTS);
        let mut outputs = [FIXED_ZERO; MAX_OUTPUTS];
        for (class, out) in outputs[..classes].iter_mut().enumerate() {
            // ReLU
            *out = self.dot_product(features, class).max(FIXED_ZERO);
        }

        let outputs = &mut outputs[..classes];
        normalize_outputs(outputs);

        let predicted_class = argmax(outputs);
        InferenceResult {
            confidence: clamp(outputs[predicted_class as usize], FIXED_ZERO, FIXED_ONE),
            predicted_class,
        }
    }

    /// Raw pre-activation output for `class`.
    ///
    /// `Σ feature·weight` in 64 bits, `>> 7` to undo the weight scale, times
    /// the model scale factor, plus the bias lifted to Q15.16. Zero for a class
    /// the model does not have or a vector of the wrong width.
    fn dot_product(&self, features: &[Fixed], class: usize) -> Fixed {
        let (Some(row), Some(&bias)) = (self.model.row(class), self.model.biases.get(class)) else {
            return FIXED_ZERO;
        };
        if features.len() != row.len() {
            return FIXED_ZERO;
        }

        let acc: i64 = features
            .iter()
            .zip(row)
            .map(|(f, &w)| f.to_bits() as i64 * w as i64)
            .sum();

        let scaled = saturating_mul(saturate_bits(acc >> WEIGHT_SHIFT), self.model.scale_factor);
        let bias = Fixed::from_bits((bias as i32) << (FRAC_BITS - WEIGHT_SHIFT));
        scaled.saturating_add(bias)
    }
}

impl InferenceEngine<'static> {
    /// Engine over the baked [`DEFAULT_MODEL`].
    pub fn with_default_model() -> Self {
        Self { model: DEFAULT_MODEL }
    }
}

/// Rescale outputs into a probability-like distribution without `exp`.
///
/// Min/max rescale onto [0, 1] relative to the spread, then divide by the sum.
/// This is a linear stand-in for softmax: the smallest output always lands on
/// exactly 0 and ratios are not calibrated probabilities. Decision thresholds
/// are tuned against this behaviour.
///
/// Near-identical outputs fall back to a uniform distribution.
pub fn normalize_outputs(outputs: &mut [Fixed]) {
    if outputs.is_empty() {
        return;
    }

    let (min, max) = outputs
        .iter()
        .fold((outputs[0], outputs[0]), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let spread = max.saturating_sub(min);
    let divisor = spread.to_bits() >> SPREAD_SHIFT;

    if spread < FLAT_EPSILON || divisor == 0 {
        let uniform = Fixed::from_bits(ONE_BITS / outputs.len() as i32);
        outputs.iter_mut().for_each(|v| *v = uniform);
        return;
    }

    let inverse_spread = Fixed::from_bits((ONE_BITS << SPREAD_SHIFT) / divisor);
    let mut sum: i64 = 0;
    for value in outputs.iter_mut() {
        *value = mul(value.saturating_sub(min), inverse_spread).max(FIXED_ZERO);
        sum += value.to_bits() as i64;
    }

    if sum > 0 {
        for value in outputs.iter_mut() {
            *value = div_bits_or(value.to_bits() as i64 * ONE_BITS as i64, sum, FIXED_ZERO);
        }
    }
}

/// Index of the largest output; the first one wins ties.
pub fn argmax(outputs: &[Fixed]) -> u8 {
    let mut best = 0;
    for (i, &v) in outputs.iter().enumerate().skip(1) {
        if v > outputs[best] {
            best = i;
        }
    }
    best as u8
}
