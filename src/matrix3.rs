/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::utils::mlaf;
use crate::Vector3;
use num_traits::{AsPrimitive, Float};
use std::ops::Mul;

/// Row-major 3x3 matrix
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Matrix3<T> {
    pub v: [[T; 3]; 3],
}

impl<T: Copy> Matrix3<T> {
    #[inline]
    pub const fn new(v: [[T; 3]; 3]) -> Matrix3<T> {
        Matrix3 { v }
    }

    #[inline]
    pub const fn row(&self, index: usize) -> Vector3<T> {
        Vector3::from_array(self.v[index])
    }

    #[inline]
    pub const fn column(&self, index: usize) -> Vector3<T> {
        Vector3::new(self.v[0][index], self.v[1][index], self.v[2][index])
    }

    /// Builds matrix with given vectors as columns
    #[inline]
    pub const fn from_columns(c0: Vector3<T>, c1: Vector3<T>, c2: Vector3<T>) -> Matrix3<T> {
        Matrix3 {
            v: [[c0.x, c1.x, c2.x], [c0.y, c1.y, c2.y], [c0.z, c1.z, c2.z]],
        }
    }

    #[inline]
    pub const fn transpose(&self) -> Matrix3<T> {
        Matrix3::from_columns(self.row(0), self.row(1), self.row(2))
    }

    /// Converts every element with `as` semantics
    #[inline]
    pub fn as_<U: Copy + 'static>(&self) -> Matrix3<U>
    where
        T: AsPrimitive<U>,
    {
        let v = self.v;
        Matrix3 {
            v: [
                [v[0][0].as_(), v[0][1].as_(), v[0][2].as_()],
                [v[1][0].as_(), v[1][1].as_(), v[1][2].as_()],
                [v[2][0].as_(), v[2][1].as_(), v[2][2].as_()],
            ],
        }
    }
}

impl<T: Float> Matrix3<T> {
    #[inline]
    pub fn identity() -> Matrix3<T> {
        let (o, z) = (T::one(), T::zero());
        Matrix3 {
            v: [[o, z, z], [z, o, z], [z, z, o]],
        }
    }

    #[inline]
    pub fn determinant(&self) -> T {
        let v = self.v;
        let a0 = mlaf(v[1][1], v[2][2], -v[1][2] * v[2][1]);
        let a1 = mlaf(v[1][0], v[2][2], -v[1][2] * v[2][0]);
        let a2 = mlaf(v[1][0], v[2][1], -v[1][1] * v[2][0]);
        mlaf(v[0][0], a0, mlaf(-v[0][1], a1, v[0][2] * a2))
    }

    /// Inverse matrix, `None` when the matrix is singular to working precision
    pub fn inverse(&self) -> Option<Matrix3<T>> {
        let det = self.determinant();
        let magnitude = self
            .v
            .iter()
            .flatten()
            .fold(T::zero(), |acc, x| acc.max(x.abs()));
        if !det.is_finite() || det.abs() <= T::epsilon() * magnitude * magnitude * magnitude {
            return None;
        }
        let det = T::one() / det;
        let [[a, b, c], [d, e, f], [g, h, i]] = self.v;

        let inverse = Matrix3 {
            v: [
                [
                    (e * i - f * h) * det,
                    (c * h - b * i) * det,
                    (b * f - c * e) * det,
                ],
                [
                    (f * g - d * i) * det,
                    (a * i - c * g) * det,
                    (c * d - a * f) * det,
                ],
                [
                    (d * h - e * g) * det,
                    (b * g - a * h) * det,
                    (a * e - b * d) * det,
                ],
            ],
        };
        if inverse.v.iter().flatten().all(|x| x.is_finite()) {
            Some(inverse)
        } else {
            None
        }
    }

    /// Scales column `i` by `scale[i]`
    #[inline]
    pub fn scale_columns(&self, scale: Vector3<T>) -> Matrix3<T> {
        Matrix3::from_columns(
            self.column(0) * scale.x,
            self.column(1) * scale.y,
            self.column(2) * scale.z,
        )
    }

    #[inline]
    pub fn mul_vector(&self, rhs: Vector3<T>) -> Vector3<T> {
        Vector3::new(
            self.row(0).dot(&rhs),
            self.row(1).dot(&rhs),
            self.row(2).dot(&rhs),
        )
    }

    #[inline]
    pub fn mat_mul(&self, rhs: &Matrix3<T>) -> Matrix3<T> {
        let mut v = [[T::zero(); 3]; 3];
        for (i, row) in v.iter_mut().enumerate() {
            let lhs_row = self.row(i);
            for (j, dst) in row.iter_mut().enumerate() {
                *dst = lhs_row.dot(&rhs.column(j));
            }
        }
        Matrix3 { v }
    }
}

impl<T: Float> Mul<Vector3<T>> for Matrix3<T> {
    type Output = Vector3<T>;

    #[inline]
    fn mul(self, rhs: Vector3<T>) -> Self::Output {
        self.mul_vector(rhs)
    }
}

impl<T: Float> Mul<Matrix3<T>> for Matrix3<T> {
    type Output = Matrix3<T>;

    #[inline]
    fn mul(self, rhs: Matrix3<T>) -> Self::Output {
        self.mat_mul(&rhs)
    }
}

/// 3x3 linear part with a translation column, applied as `linear * v + offset`
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Affine3<T> {
    pub linear: Matrix3<T>,
    pub offset: Vector3<T>,
}

impl<T: Float> Affine3<T> {
    #[inline]
    pub fn new(linear: Matrix3<T>, offset: Vector3<T>) -> Affine3<T> {
        Affine3 { linear, offset }
    }

    #[inline]
    pub fn from_linear(linear: Matrix3<T>) -> Affine3<T> {
        Affine3::new(linear, Vector3::zero())
    }

    #[inline]
    pub fn translation(offset: Vector3<T>) -> Affine3<T> {
        Affine3::new(Matrix3::identity(), offset)
    }

    /// Composition applying `inner` first, then `self`
    #[inline]
    pub fn then_after(&self, inner: &Affine3<T>) -> Affine3<T> {
        Affine3::new(
            self.linear.mat_mul(&inner.linear),
            self.linear.mul_vector(inner.offset) + self.offset,
        )
    }

    #[inline]
    pub fn apply(&self, v: Vector3<T>) -> Vector3<T> {
        self.linear.mul_vector(v) + self.offset
    }

    #[inline]
    pub fn as_<U: Copy + 'static>(&self) -> Affine3<U>
    where
        T: AsPrimitive<U>,
    {
        Affine3 {
            linear: self.linear.as_(),
            offset: self.offset.as_(),
        }
    }
}
