/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::cone::cone_constants;
use crate::pixel_mapper::PIXEL_SMALL;
use crate::{shared_fast_log, shared_fast_pow, ColorSpace, Matrix3, Vector3};
use erydanos::{Exponential, Logarithmic};

/// Represents Ruderman l-alpha-beta opponent colorspace, built from log10 cone responses
#[derive(Debug, Copy, Clone, Default, PartialOrd, PartialEq)]
pub struct Opponent {
    /// Achromatic axis
    pub l: f32,
    /// Yellow-blue axis
    pub alpha: f32,
    /// Red-green axis
    pub beta: f32,
}

impl Opponent {
    #[inline]
    /// Creates new instance
    pub fn new(l: f32, alpha: f32, beta: f32) -> Opponent {
        Opponent { l, alpha, beta }
    }

    #[inline]
    pub fn from_vector(v: Vector3<f32>) -> Opponent {
        Opponent::new(v.x, v.y, v.z)
    }

    #[inline]
    pub fn to_vector(&self) -> Vector3<f32> {
        Vector3::new(self.l, self.alpha, self.beta)
    }

    /// Converts linear RGB to opponent with full precision logarithm
    #[inline]
    pub fn from_linear_rgb_exact(rgb: Vector3<f32>, transform: &OpponentTransform) -> Opponent {
        let cone = transform.rgb_to_cone.mul_vector(rgb).clamp_min(PIXEL_SMALL);
        let log_cone = cone.map(|v| v.eln() * std::f32::consts::LOG10_E);
        Opponent::from_vector(transform.cone_to_opponent.mul_vector(log_cone))
    }

    /// Converts opponent to linear RGB with full precision exponent
    #[inline]
    pub fn to_linear_rgb_exact(&self, transform: &OpponentTransform) -> Vector3<f32> {
        let log_cone = transform.opponent_to_cone.mul_vector(self.to_vector());
        let cone = log_cone.map(|v| (v * std::f32::consts::LN_10).eexp());
        transform.cone_to_rgb.mul_vector(cone)
    }
}

/// Linear RGB <-> opponent conversions for one RGB color space
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OpponentTransform {
    rgb_to_cone: Matrix3<f32>,
    cone_to_rgb: Matrix3<f32>,
    cone_to_opponent: Matrix3<f32>,
    opponent_to_cone: Matrix3<f32>,
}

impl OpponentTransform {
    /// Composes the color space matrices with the fixed cone transforms in `f64`
    pub fn new(rgb_to_xyz: &Matrix3<f64>, xyz_to_rgb: &Matrix3<f64>) -> OpponentTransform {
        let constants = cone_constants();
        OpponentTransform {
            rgb_to_cone: constants.xyz_to_cone.mat_mul(rgb_to_xyz).as_(),
            cone_to_rgb: xyz_to_rgb.mat_mul(&constants.cone_to_xyz).as_(),
            cone_to_opponent: constants.cone_to_opponent.as_(),
            opponent_to_cone: constants.opponent_to_cone.as_(),
        }
    }

    #[inline]
    pub fn from_color_space(space: &ColorSpace) -> OpponentTransform {
        OpponentTransform::new(&space.rgb_to_xyz(), &space.xyz_to_rgb())
    }

    #[inline]
    pub fn rgb_to_cone(&self) -> Matrix3<f32> {
        self.rgb_to_cone
    }

    #[inline]
    pub fn cone_to_rgb(&self) -> Matrix3<f32> {
        self.cone_to_rgb
    }

    #[inline]
    pub fn cone_to_opponent(&self) -> Matrix3<f32> {
        self.cone_to_opponent
    }

    #[inline]
    pub fn opponent_to_cone(&self) -> Matrix3<f32> {
        self.opponent_to_cone
    }

    /// log10 of the cone response, floored at [PIXEL_SMALL] before the logarithm
    #[inline(always)]
    pub fn rgb_to_log_cone(&self, rgb: Vector3<f32>) -> Vector3<f32> {
        let log = shared_fast_log();
        self.rgb_to_cone
            .mul_vector(rgb)
            .clamp_min(PIXEL_SMALL)
            .map(|v| log.ten(v))
    }

    #[inline(always)]
    pub fn log_cone_to_rgb(&self, log_cone: Vector3<f32>) -> Vector3<f32> {
        let pow = shared_fast_pow();
        self.cone_to_rgb.mul_vector(log_cone.map(|v| pow.ten(v)))
    }

    /// Linear RGB to opponent through the shared lookup tables
    #[inline(always)]
    pub fn from_rgb(&self, rgb: Vector3<f32>) -> Vector3<f32> {
        self.cone_to_opponent.mul_vector(self.rgb_to_log_cone(rgb))
    }

    /// Opponent to linear RGB through the shared lookup tables
    #[inline(always)]
    pub fn to_rgb(&self, opponent: Vector3<f32>) -> Vector3<f32> {
        self.log_cone_to_rgb(self.opponent_to_cone.mul_vector(opponent))
    }
}
