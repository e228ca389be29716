//! Pre-baked classifier for the default 64-bin / 1 kHz front end.
//!
//! Opaque constant data produced offline. Rows are row-major
//! `[class][bin]`, weights quantized with an implicit x128 scale.
//! Bands are mirrored because the real-valued input folds bin `k` onto
//! `64 - k`.

use super::quantized::Model;
use crate::fixed_point::Fixed;

pub const MODEL_INPUT_SIZE: usize = 64;
pub const MODEL_OUTPUT_SIZE: usize = 3;

/// 1.0
pub const MODEL_SCALE_FACTOR: Fixed = Fixed::from_bits(1 << 16);

#[rustfmt::skip]
pub static MODEL_WEIGHTS: [i8; MODEL_INPUT_SIZE * MODEL_OUTPUT_SIZE] = [
    // normal: low band (bins 1-8, mirrored 56-63)
    0, 48, 48, 48, 48, 48, 48, 48, 48, -16, -16, -16, -16, -16, -16, -16,
    -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16,
    -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16,
    -16, -16, -16, -16, -16, -16, -16, -16, 48, 48, 48, 48, 48, 48, 48, 48,
    // anomaly: mid band (bins 9-20, mirrored 44-55)
    0, -16, -16, -16, -16, -16, -16, -16, -16, 48, 48, 48, 48, 48, 48, 48,
    48, 48, 48, 48, 48, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16,
    -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, -16, 48, 48, 48, 48,
    48, 48, 48, 48, 48, 48, 48, 48, -16, -16, -16, -16, -16, -16, -16, -16,
    // uncertain: broadband
    0, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10,
    10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10,
    10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10,
    10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10,
];

pub static MODEL_BIASES: [i8; MODEL_OUTPUT_SIZE] = [4, 0, 0];

/// The default model as a borrowable view.
pub static DEFAULT_MODEL: Model<'static> = Model::new(
    &MODEL_WEIGHTS,
    &MODEL_BIASES,
    MODEL_INPUT_SIZE,
    MODEL_OUTPUT_SIZE,
    MODEL_SCALE_FACTOR,
);
