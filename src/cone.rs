/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
#![allow(clippy::excessive_precision)]
use crate::Matrix3;
use std::sync::OnceLock;

/// XYZ to LMS cone responses, Hunt-Pointer-Estevez (Wyszecki & Stiles)
pub const XYZ_TO_CONE: Matrix3<f64> = Matrix3::new([
    [0.38971, 0.68898, -0.07868],
    [-0.22981, 1.18340, 0.04641],
    [0.00000, 0.00000, 1.00000],
]);

/// log10 LMS to opponent *lαβ* axes.
///
/// Ruderman, Cronin, Chiao, "Statistics of cone responses to natural images",
/// J. Optical Soc. of America, vol. 15, no. 8, 1998.
/// Row 0 is achromatic, rows 1 and 2 are the yellow-blue and red-green axes.
pub const CONE_TO_OPPONENT: Matrix3<f64> = Matrix3::new([
    [
        0.57735026918962576,
        0.57735026918962576,
        0.57735026918962576,
    ],
    [
        0.40824829046386302,
        0.40824829046386302,
        -0.81649658092772603,
    ],
    [0.70710678118654752, -0.70710678118654752, 0.],
]);

/// Fixed cone and opponent transforms with their inverses
#[derive(Debug, Copy, Clone)]
pub struct ConeConstants {
    pub xyz_to_cone: Matrix3<f64>,
    pub cone_to_xyz: Matrix3<f64>,
    pub cone_to_opponent: Matrix3<f64>,
    pub opponent_to_cone: Matrix3<f64>,
}

static CONE_CONSTANTS: OnceLock<ConeConstants> = OnceLock::new();

/// Cone constants shared by the whole process, initialized once on first access
pub fn cone_constants() -> &'static ConeConstants {
    CONE_CONSTANTS.get_or_init(|| ConeConstants {
        xyz_to_cone: XYZ_TO_CONE,
        cone_to_xyz: XYZ_TO_CONE
            .inverse()
            .expect("Cone response matrix must be invertible"),
        cone_to_opponent: CONE_TO_OPPONENT,
        opponent_to_cone: CONE_TO_OPPONENT
            .inverse()
            .expect("Opponent matrix must be invertible"),
    })
}
