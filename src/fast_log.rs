/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use std::sync::OnceLock;

/// Highest usable precision, all mantissa bits of `f32`
pub const LOG_PRECISION_MAX: u32 = 23;

/// Precision of the shared table used by the white balancing pipeline
pub const LOG_PRECISION: u32 = 12;

const LOG10_2: f32 = std::f32::consts::LOG10_2;
const LN_2: f32 = std::f32::consts::LN_2;

/// Logarithm approximation with adjustable accuracy.
///
/// The float exponent gives the integer part of log2, the top `precision` bits of
/// the mantissa index a table holding log2 over one octave `[1, 2)`. Each table
/// entry is sampled at the midpoint of its interval so the stepped function crosses
/// the true curve in the middle of every step, which halves the worst case error.
///
/// At precision 11 mean relative error stays below 0.001% and max error below 0.01%,
/// apart from arguments near 1 where the result itself approaches zero.
/// Arguments must be positive normal floats.
#[derive(Debug, Clone)]
pub struct FastLog {
    precision: u32,
    table: Box<[f32]>,
}

impl FastLog {
    /// Builds table with `2^precision` entries, precision is clamped to `[0, 23]`
    pub fn new(precision: u32) -> FastLog {
        let precision = precision.min(LOG_PRECISION_MAX);
        let size = 1usize << precision;
        let step = 1f64 / size as f64;
        let table = (0..size)
            .map(|i| {
                let one_to_two = 1f64 + (i as f64 + 0.5f64) * step;
                one_to_two.log2() as f32
            })
            .collect::<Vec<f32>>()
            .into_boxed_slice();
        FastLog { precision, table }
    }

    #[inline]
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Approximated base 2 logarithm
    #[inline(always)]
    pub fn two(&self, value: f32) -> f32 {
        let bits = value.to_bits();
        let exponent = ((bits >> 23) & 0xFF) as i32 - 127;
        let mantissa = ((bits & 0x7F_FFFF) >> (23 - self.precision)) as usize;
        exponent as f32 + unsafe { *self.table.get_unchecked(mantissa) }
    }

    /// Approximated natural logarithm
    #[inline(always)]
    pub fn e(&self, value: f32) -> f32 {
        self.two(value) * LN_2
    }

    /// Approximated base 10 logarithm
    #[inline(always)]
    pub fn ten(&self, value: f32) -> f32 {
        self.two(value) * LOG10_2
    }
}

impl Default for FastLog {
    fn default() -> Self {
        FastLog::new(11)
    }
}

static SHARED_LOG: OnceLock<FastLog> = OnceLock::new();

/// Process wide table at [LOG_PRECISION], built on first use
pub fn shared_fast_log() -> &'static FastLog {
    SHARED_LOG.get_or_init(|| FastLog::new(LOG_PRECISION))
}
