/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::{Matrix3, Vector3, WhiteBalanceError};

/// ITU-R BT.709 / sRGB primaries, `[rx, ry, gx, gy, bx, by]`
pub const SRGB_PRIMARIES: [f32; 6] = [0.64, 0.33, 0.30, 0.60, 0.15, 0.06];

/// CIE standard illuminant D65
pub const D65_WHITE_POINT: [f32; 2] = [0.3127, 0.3290];

/// Equal energy white
pub const FLAT_WHITE: [f32; 2] = [1f32 / 3f32, 1f32 / 3f32];

/// Whitepoints closer than this to [FLAT_WHITE] on both axes use white `(1, 1, 1)`
/// exactly, so the flat case round trips without error
pub const FLAT_WHITE_TOLERANCE: f32 = 1e-3;

/// CIE 1931 xy coordinate
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chromaticity {
    pub x: f32,
    pub y: f32,
}

impl Chromaticity {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Chromaticity {
        Chromaticity { x, y }
    }

    /// `[x, y, 1 - x - y]`
    #[inline]
    pub fn to_xyz_direction(&self) -> Vector3<f64> {
        let x = self.x as f64;
        let y = self.y as f64;
        Vector3::new(x, y, 1f64 - (x + y))
    }

    #[inline]
    fn is_flat(&self) -> bool {
        (self.x - FLAT_WHITE[0]).abs() < FLAT_WHITE_TOLERANCE
            && (self.y - FLAT_WHITE[1]).abs() < FLAT_WHITE_TOLERANCE
    }
}

/// RGB color space defined by its primaries and whitepoint with derived
/// RGB <-> XYZ conversions
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorSpace {
    primaries: [Chromaticity; 3],
    white_point: Chromaticity,
    rgb_to_xyz: Matrix3<f64>,
    xyz_to_rgb: Matrix3<f64>,
}

impl ColorSpace {
    /// Builds conversions from `[rx, ry, gx, gy, bx, by]` primaries and `[wx, wy]` whitepoint
    ///
    /// # Errors
    /// * [WhiteBalanceError::InvalidChromaticities] primary outside `[0, 1]` or primaries are collinear
    /// * [WhiteBalanceError::InvalidWhitePoint] whitepoint outside `[f32::EPSILON, 1)`
    /// * [WhiteBalanceError::InvalidColorSpace] resulting conversion is not invertible
    pub fn new(primaries: [f32; 6], white_point: [f32; 2]) -> Result<ColorSpace, WhiteBalanceError> {
        let primaries = [
            Chromaticity::new(primaries[0], primaries[1]),
            Chromaticity::new(primaries[2], primaries[3]),
            Chromaticity::new(primaries[4], primaries[5]),
        ];
        if primaries
            .iter()
            .any(|c| !(0f32..=1f32).contains(&c.x) || !(0f32..=1f32).contains(&c.y))
        {
            return Err(WhiteBalanceError::InvalidChromaticities);
        }

        let white_point = Chromaticity::new(white_point[0], white_point[1]);
        let white_range = f32::EPSILON..1f32;
        if !white_range.contains(&white_point.x) || !white_range.contains(&white_point.y) {
            return Err(WhiteBalanceError::InvalidWhitePoint);
        }

        let white = if white_point.is_flat() {
            Vector3::ones()
        } else {
            let direction = white_point.to_xyz_direction();
            direction / direction.y
        };

        let chromaticities = Matrix3::from_columns(
            primaries[0].to_xyz_direction(),
            primaries[1].to_xyz_direction(),
            primaries[2].to_xyz_direction(),
        );
        let scale = chromaticities
            .inverse()
            .ok_or(WhiteBalanceError::InvalidChromaticities)?
            * white;

        let rgb_to_xyz = chromaticities.scale_columns(scale);
        let xyz_to_rgb = rgb_to_xyz
            .inverse()
            .ok_or(WhiteBalanceError::InvalidColorSpace)?;

        Ok(ColorSpace {
            primaries,
            white_point,
            rgb_to_xyz,
            xyz_to_rgb,
        })
    }

    /// sRGB primaries with D65 whitepoint
    pub fn srgb() -> Result<ColorSpace, WhiteBalanceError> {
        ColorSpace::new(SRGB_PRIMARIES, D65_WHITE_POINT)
    }

    /// sRGB primaries with given whitepoint
    pub fn with_srgb_primaries(white_point: [f32; 2]) -> Result<ColorSpace, WhiteBalanceError> {
        ColorSpace::new(SRGB_PRIMARIES, white_point)
    }

    #[inline]
    pub fn primaries(&self) -> [Chromaticity; 3] {
        self.primaries
    }

    #[inline]
    pub fn white_point(&self) -> Chromaticity {
        self.white_point
    }

    #[inline]
    pub fn rgb_to_xyz(&self) -> Matrix3<f64> {
        self.rgb_to_xyz
    }

    #[inline]
    pub fn xyz_to_rgb(&self) -> Matrix3<f64> {
        self.xyz_to_rgb
    }

    /// Weights giving relative luminance `Y` of a linear RGB value
    #[inline]
    pub fn luminance_weights(&self) -> Vector3<f64> {
        self.rgb_to_xyz.row(1)
    }
}
