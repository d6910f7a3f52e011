/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::cone::cone_constants;
use crate::{Affine3, Matrix3, OpponentTransform, Vector3};

/// Floor for cone responses before taking the logarithm
pub const PIXEL_SMALL: f32 = 1e-14;

/// Ceiling for input pixel channels
pub const PIXEL_LARGE: f32 = 1e14;

/// Clamps every channel into `[0, PIXEL_LARGE]`
#[inline(always)]
pub fn precondition_pixel(rgb: Vector3<f32>) -> Vector3<f32> {
    rgb.map(|v| {
        if v > 0f32 {
            if v < PIXEL_LARGE {
                v
            } else {
                PIXEL_LARGE
            }
        } else {
            0f32
        }
    })
}

/// Clamps every channel to non negative
#[inline(always)]
pub fn postcondition_pixel(rgb: Vector3<f32>) -> Vector3<f32> {
    rgb.map(|v| if v > 0f32 { v } else { 0f32 })
}

/// Per pixel chromatic shift.
///
/// RGB goes to log10 cone space, the opponent chroma of the illuminant scaled by
/// strength is subtracted, then the color returns to RGB and is rescaled to its
/// original luminance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PixelMapper {
    transform: OpponentTransform,
    shift: Affine3<f32>,
    to_luminance: Vector3<f32>,
    strength: f32,
}

impl PixelMapper {
    /// `strength` is clamped to `[0, 1]`, NaN is treated as 0
    pub fn new(
        rgb_to_xyz: &Matrix3<f64>,
        xyz_to_rgb: &Matrix3<f64>,
        illuminant: Vector3<f32>,
        strength: f32,
    ) -> PixelMapper {
        let strength = strength.max(0f32).min(1f32);
        let constants = cone_constants();

        // only the chromatic axes move, luminance axis is left as is
        let chroma = illuminant.as_::<f64>().mul_components(&Vector3::new(0f64, 1f64, 1f64));
        let translation = Affine3::translation(-(chroma * strength as f64));
        let shift = Affine3::from_linear(constants.opponent_to_cone)
            .then_after(&translation)
            .then_after(&Affine3::from_linear(constants.cone_to_opponent));

        PixelMapper {
            transform: OpponentTransform::new(rgb_to_xyz, xyz_to_rgb),
            shift: shift.as_(),
            to_luminance: rgb_to_xyz.row(1).as_(),
            strength,
        }
    }

    /// Effective strength after clamping
    #[inline]
    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Affine operator applied in log10 cone space
    #[inline]
    pub fn log_cone_shift(&self) -> Affine3<f32> {
        self.shift
    }

    /// Maps one preconditioned linear RGB pixel
    #[inline(always)]
    pub fn apply(&self, rgb: Vector3<f32>) -> Vector3<f32> {
        let log_cone = self.transform.rgb_to_log_cone(rgb);
        let shifted = self.shift.apply(log_cone);
        let out = self.transform.log_cone_to_rgb(shifted);

        let in_luminance = rgb.dot(&self.to_luminance);
        let out_luminance = out.dot(&self.to_luminance);
        let scale = if out_luminance != 0f32 {
            in_luminance / out_luminance
        } else {
            0f32
        };
        out * scale
    }
}
