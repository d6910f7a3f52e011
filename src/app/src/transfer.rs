/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use clap::ValueEnum;

const SRGB_LINEAR_KNEE: f32 = 0.003_130_8;
const SRGB_ENCODED_KNEE: f32 = 0.040_45;

fn srgb_decode(encoded: f32) -> f32 {
    if encoded <= 0f32 {
        0f32
    } else if encoded <= SRGB_ENCODED_KNEE {
        encoded / 12.92f32
    } else {
        ((encoded + 0.055f32) / 1.055f32).powf(2.4f32)
    }
}

fn srgb_encode(linear: f32) -> f32 {
    if linear <= 0f32 {
        0f32
    } else if linear <= SRGB_LINEAR_KNEE {
        linear * 12.92f32
    } else {
        (1.055f32 * linear.powf(1f32 / 2.4f32) - 0.055f32).min(1f32)
    }
}

fn identity(value: f32) -> f32 {
    value
}

/// How the channels of a file relate to linear light
#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transfer {
    /// sRGB curve, usual for 8 and 16 bit images
    Srgb,
    /// Channels already hold linear light, usual for OpenEXR and Radiance files
    Linear,
}

impl Transfer {
    pub fn decoder(&self) -> fn(f32) -> f32 {
        match self {
            Transfer::Srgb => srgb_decode,
            Transfer::Linear => identity,
        }
    }

    pub fn encoder(&self) -> fn(f32) -> f32 {
        match self {
            Transfer::Srgb => srgb_encode,
            Transfer::Linear => identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_curve() {
        let decode = Transfer::Srgb.decoder();
        let encode = Transfer::Srgb.encoder();
        assert_eq!(decode(0.), 0.);
        assert!((decode(1.) - 1.).abs() < 1e-6);
        assert!((decode(0.5) - 0.214_041).abs() < 1e-5);
        for i in 0..=20 {
            let v = i as f32 / 20.;
            assert!((encode(decode(v)) - v).abs() < 1e-5);
        }
        assert_eq!(encode(4.), 1.);
        assert_eq!(decode(-0.5), 0.);
    }

    #[test]
    fn test_linear_keeps_highlights() {
        assert_eq!(Transfer::Linear.decoder()(12.5), 12.5);
        assert_eq!(Transfer::Linear.encoder()(12.5), 12.5);
    }
}
