//! Q15.16 fixed-point kernel
//!
//! `Fixed` is the `fixed` crate's `I16F16`. The type gives us ordering,
//! constants and exact float conversion; the arithmetic the firmware depends on
//! (multiply, wide accumulation) is spelled out on the raw bits so the
//! truncation behaviour is explicit rather than inherited.
//!
//! Rounding: every right shift truncates toward negative infinity and every
//! integer division truncates toward zero. This is an approximation, not
//! banker's rounding, and results are bit-identical across targets.

use fixed::types::I16F16;

/// Q15.16 value: 1 sign bit, 15 integer bits, 16 fractional bits.
pub type Fixed = I16F16;

/// Number of fractional bits.
pub const FRAC_BITS: u32 = 16;

/// Raw bit pattern of 1.0.
pub const ONE_BITS: i32 = 1 << FRAC_BITS;

pub const FIXED_ONE: Fixed = Fixed::ONE;
pub const FIXED_ZERO: Fixed = Fixed::ZERO;

/// Convert a real number to Q15.16, truncating toward zero.
///
/// Boundary use only (configuration, fixtures, display). Values outside the
/// representable range saturate.
#[inline]
pub fn to_fixed(value: f32) -> Fixed {
    Fixed::from_bits((value * ONE_BITS as f32) as i32)
}

/// Convert Q15.16 back to a real number. Boundary use only.
#[inline]
pub fn to_real(value: Fixed) -> f32 {
    value.to_num::<f32>()
}

/// Multiply through a 64-bit intermediate, truncating the shifted product.
///
/// The caller keeps operands within a range whose product fits the Q15.16
/// result; the narrowing wraps otherwise.
#[inline]
pub fn mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a.to_bits() as i64 * b.to_bits() as i64) >> FRAC_BITS;
    Fixed::from_bits(wide as i32)
}

/// Multiply like [`mul`] but clamp to the representable range.
#[inline]
pub fn saturating_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a.to_bits() as i64 * b.to_bits() as i64) >> FRAC_BITS;
    saturate_bits(wide)
}

/// Interpret a wide accumulator as raw Q15.16 bits, clamped to i32.
#[inline]
pub fn saturate_bits(wide: i64) -> Fixed {
    Fixed::from_bits(wide.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

/// `numerator / denominator` where both are raw wide values and the quotient is
/// already in Q15.16 bits. Returns `fallback` for a zero denominator.
#[inline]
pub fn div_bits_or(numerator: i64, denominator: i64, fallback: Fixed) -> Fixed {
    if denominator == 0 {
        return fallback;
    }
    saturate_bits(numerator / denominator)
}

/// Clamp into `[lo, hi]`.
#[inline]
pub fn clamp(value: Fixed, lo: Fixed, hi: Fixed) -> Fixed {
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}
