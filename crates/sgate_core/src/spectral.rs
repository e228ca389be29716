//! Spectral Processor
//!
//! Turns a window of raw accelerometer samples into a coarse magnitude
//! spectrum using integer-only arithmetic, then derives the features the rest
//! of the pipeline consumes.
//!
//! # Shortcuts
//!
//! | Step       | Exact form            | Used here                                  |
//! |------------|-----------------------|--------------------------------------------|
//! | sin/cos    | Taylor / table        | triangle wave over a 256-step turn          |
//! | \|z\|      | sqrt(re² + im²)       | max(\|re\|,\|im\|) + 0.4·min(\|re\|,\|im\|) |
//! | transform  | FFT                   | per-bin correlation over the whole window  |
//!
//! Both approximations are part of the observable contract: peak counts and
//! thresholds downstream are tuned against these exact numbers, so they must
//! not be swapped for "more accurate" versions.

use crate::error::GateError;
use crate::fixed_point::{div_bits_or, mul, saturate_bits, Fixed, FIXED_ZERO, FRAC_BITS, ONE_BITS};

/// Hard cap on evaluated bins, independent of the configured count.
pub const MAX_BINS: usize = 128;

/// Steps in one full turn for [`fast_sin`] / [`fast_cos`].
pub const ANGLE_STEPS: u32 = 256;

const QUARTER_TURN: i32 = 64;
const HALF_TURN: i32 = 128;

/// A peak must exceed this fraction of the strongest bin (0.2).
const PEAK_FRACTION: Fixed = Fixed::from_bits(13_107);

/// Summary of one analysed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpectralResult {
    /// Frequency of the strongest non-DC bin, in Hz.
    pub dominant_frequency: Fixed,
    /// Magnitude of that bin.
    pub peak_magnitude: Fixed,
    /// Magnitude-weighted mean bin index.
    pub spectral_centroid: Fixed,
    /// Local maxima above 20% of `peak_magnitude`, edge bins excluded.
    pub num_peaks: u8,
}

/// Piecewise-linear sine over a 256-step turn.
///
/// The first quadrant rises linearly from 0 to 1.0 at step 64; the other three
/// are mirrored from it. Error against true sine is at most ~0.21, which is
/// fine for locating peaks and useless for anything finer.
#[inline]
pub fn fast_sin(angle: u32) -> Fixed {
    let angle = (angle & (ANGLE_STEPS - 1)) as i32;

    let mut x = angle;
    if x > HALF_TURN {
        x = ANGLE_STEPS as i32 - x;
    }
    if x > QUARTER_TURN {
        x = HALF_TURN - x;
    }

    let magnitude = x * ONE_BITS / QUARTER_TURN;
    if angle > HALF_TURN {
        Fixed::from_bits(-magnitude)
    } else {
        Fixed::from_bits(magnitude)
    }
}

/// `cos(x) = sin(x + quarter turn)`.
#[inline]
pub fn fast_cos(angle: u32) -> Fixed {
    fast_sin(angle.wrapping_add(QUARTER_TURN as u32))
}

/// Alpha-max-plus-beta-min magnitude with alpha = 1, beta = 0.4.
///
/// `real` and `imag` are per-sample averages of `sample × trig` products, so
/// they carry 16 fractional bits on top of the raw sample scale. The result is
/// shifted back down by those 16 bits, which leaves it in raw sample units
/// stored as `Fixed` bits.
#[inline]
pub fn magnitude_approx(real: i64, imag: i64) -> Fixed {
    let re = real.unsigned_abs();
    let im = imag.unsigned_abs();
    let (hi, lo) = if re > im { (re, im) } else { (im, re) };

    let approx = hi.saturating_add(lo.saturating_mul(4) / 10);
    saturate_bits((approx >> FRAC_BITS) as i64)
}

/// Frequency-domain front end with a fixed bin count and sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpectralProcessor {
    num_bins: usize,
    sample_rate: u32,
}

impl SpectralProcessor {
    /// Bin counts above [`MAX_BINS`] are capped.
    pub fn new(num_bins: usize, sample_rate: u32) -> Self {
        Self {
            num_bins: num_bins.min(MAX_BINS),
            sample_rate,
        }
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Analyse one window.
    ///
    /// An empty window (or a processor with no bins) yields the all-zero
    /// result; that is a fail-safe, not an error.
    pub fn process(&self, samples: &[i16]) -> SpectralResult {
        if samples.is_empty() || self.num_bins == 0 {
            return SpectralResult::default();
        }

        let mut magnitudes = [FIXED_ZERO; MAX_BINS];
        let spectrum = &mut magnitudes[..self.num_bins];
        self.magnitude_spectrum(samples, spectrum);
        let spectrum = &*spectrum;

        let (dominant_bin, peak_magnitude) = strongest_bin(spectrum);
        let threshold = mul(peak_magnitude, PEAK_FRACTION);

        SpectralResult {
            dominant_frequency: self.bin_frequency(dominant_bin),
            peak_magnitude,
            spectral_centroid: spectral_centroid(spectrum),
            num_peaks: count_peaks(spectrum, threshold),
        }
    }

    /// Write the normalized magnitude spectrum into `features`.
    ///
    /// The strongest bin (DC included) becomes exactly 1.0; a silent window
    /// leaves every entry at zero. Returns the number of features written,
    /// which is always the configured bin count.
    ///
    /// A destination shorter than the bin count is rejected rather than
    /// truncated: a clipped vector would silently skew inference.
    pub fn extract_features(&self, samples: &[i16], features: &mut [Fixed]) -> Result<usize, GateError> {
        let bins = self.num_bins;
        if features.len() < bins {
            return Err(GateError::FeatureBufferTooSmall {
                required: bins,
                provided: features.len(),
            });
        }

        let out = &mut features[..bins];
        self.magnitude_spectrum(samples, out);

        let max = out.iter().fold(FIXED_ZERO, |acc, &v| acc.max(v));
        if max > FIXED_ZERO {
            let max_bits = max.to_bits() as i64;
            for value in out.iter_mut() {
                *value = div_bits_or(value.to_bits() as i64 * ONE_BITS as i64, max_bits, FIXED_ZERO);
            }
        }

        Ok(bins)
    }

    /// Simplified DFT: correlate the window against each bin's trig pair.
    ///
    /// Bin `k` steps the angle by `k * 256 / N` per sample.
    fn magnitude_spectrum(&self, samples: &[i16], magnitudes: &mut [Fixed]) {
        let bins = self.num_bins;
        let count = samples.len() as i64;

        for (k, slot) in magnitudes.iter_mut().take(bins).enumerate() {
            if count == 0 {
                *slot = FIXED_ZERO;
                continue;
            }

            let freq_mult = (k * ANGLE_STEPS as usize / bins) as u32;
            let mut real: i64 = 0;
            let mut imag: i64 = 0;

            for (n, &sample) in samples.iter().enumerate() {
                // 2^32 is a multiple of 256, so the wrapping product keeps the residue
                let angle = freq_mult.wrapping_mul(n as u32) % ANGLE_STEPS;
                let s = sample as i64;
                real += s * fast_cos(angle).to_bits() as i64;
                imag += s * fast_sin(angle).to_bits() as i64;
            }

            *slot = magnitude_approx(real / count, imag / count);
        }
    }

    /// `bin * sample_rate / (2 * N)` in Hz.
    fn bin_frequency(&self, bin: usize) -> Fixed {
        let numerator = bin as i64 * self.sample_rate as i64 * ONE_BITS as i64;
        div_bits_or(numerator, 2 * self.num_bins as i64, FIXED_ZERO)
    }
}

impl Default for SpectralProcessor {
    fn default() -> Self {
        Self::new(crate::NUM_SPECTRAL_BINS, crate::DEFAULT_SAMPLE_RATE_HZ)
    }
}

/// Strongest bin, DC excluded. Returns `(0, 0)` when nothing beats zero.
fn strongest_bin(magnitudes: &[Fixed]) -> (usize, Fixed) {
    let mut best_bin = 0;
    let mut best = FIXED_ZERO;
    for (i, &m) in magnitudes.iter().enumerate().skip(1) {
        if m > best {
            best = m;
            best_bin = i;
        }
    }
    (best_bin, best)
}

/// Strict local maxima above `threshold`. Edge bins are never candidates.
fn count_peaks(magnitudes: &[Fixed], threshold: Fixed) -> u8 {
    let peaks = magnitudes
        .windows(3)
        .filter(|w| w[1] > threshold && w[1] > w[0] && w[1] > w[2])
        .count();
    peaks.min(u8::MAX as usize) as u8
}

/// Magnitude-weighted mean bin index; zero for a silent spectrum.
fn spectral_centroid(magnitudes: &[Fixed]) -> Fixed {
    let mut weighted: i64 = 0;
    let mut total: i64 = 0;
    for (i, &m) in magnitudes.iter().enumerate() {
        weighted += m.to_bits() as i64 * i as i64;
        total += m.to_bits() as i64;
    }
    div_bits_or(weighted * ONE_BITS as i64, total, FIXED_ZERO)
}
