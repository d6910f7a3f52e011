/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::utils::mlaf;
use num_traits::{AsPrimitive, Float};
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub, SubAssign};

/// Immutable 3 component vector used for colors in every space of the pipeline
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vector3<T> {
    #[inline]
    pub const fn new(x: T, y: T, z: T) -> Vector3<T> {
        Vector3 { x, y, z }
    }
}

impl<T: Copy> Vector3<T> {
    #[inline]
    pub const fn dup(v: T) -> Vector3<T> {
        Vector3 { x: v, y: v, z: v }
    }

    #[inline]
    pub const fn from_array(v: [T; 3]) -> Vector3<T> {
        Vector3 {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }

    #[inline]
    pub const fn to_array(&self) -> [T; 3] {
        [self.x, self.y, self.z]
    }

    /// Applies `f` to every component
    #[inline]
    pub fn map<U, F: Fn(T) -> U>(&self, f: F) -> Vector3<U> {
        Vector3::new(f(self.x), f(self.y), f(self.z))
    }

    /// Converts every component with `as` semantics
    #[inline]
    pub fn as_<U: Copy + 'static>(&self) -> Vector3<U>
    where
        T: AsPrimitive<U>,
    {
        Vector3::new(self.x.as_(), self.y.as_(), self.z.as_())
    }
}

impl<T: Float> Vector3<T> {
    #[inline]
    pub fn zero() -> Vector3<T> {
        Vector3::dup(T::zero())
    }

    #[inline]
    pub fn ones() -> Vector3<T> {
        Vector3::dup(T::one())
    }

    #[inline]
    pub fn dot(&self, other: &Vector3<T>) -> T {
        mlaf(self.x, other.x, mlaf(self.y, other.y, self.z * other.z))
    }

    #[inline]
    pub fn sum(&self) -> T {
        self.x + self.y + self.z
    }

    /// Mean of the three components
    #[inline]
    pub fn average(&self) -> T {
        self.sum() / (T::one() + T::one() + T::one())
    }

    /// Component-wise product
    #[inline]
    pub fn mul_components(&self, other: &Vector3<T>) -> Vector3<T> {
        Vector3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    #[inline]
    pub fn clamp_min(&self, min: T) -> Vector3<T> {
        self.map(|v| if v >= min { v } else { min })
    }

    #[inline]
    pub fn clamp_max(&self, max: T) -> Vector3<T> {
        self.map(|v| if v <= max { v } else { max })
    }

    #[inline]
    pub fn has_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Largest absolute component difference
    #[inline]
    pub fn max_abs_diff(&self, other: &Vector3<T>) -> T {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }
}

impl<T> Index<usize> for Vector3<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => {
                panic!("Index out of bounds for Vector3: {}", index)
            }
        }
    }
}

impl<T: Float> Add<Vector3<T>> for Vector3<T> {
    type Output = Vector3<T>;

    #[inline]
    fn add(self, rhs: Vector3<T>) -> Self::Output {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T: Float> Sub<Vector3<T>> for Vector3<T> {
    type Output = Vector3<T>;

    #[inline]
    fn sub(self, rhs: Vector3<T>) -> Self::Output {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<T: Float> Mul<T> for Vector3<T> {
    type Output = Vector3<T>;

    #[inline]
    fn mul(self, rhs: T) -> Self::Output {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl<T: Float> Div<T> for Vector3<T> {
    type Output = Vector3<T>;

    #[inline]
    fn div(self, rhs: T) -> Self::Output {
        Vector3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl<T: Float> Neg for Vector3<T> {
    type Output = Vector3<T>;

    #[inline]
    fn neg(self) -> Self::Output {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl<T: Float> AddAssign<Vector3<T>> for Vector3<T> {
    #[inline]
    fn add_assign(&mut self, rhs: Vector3<T>) {
        *self = *self + rhs;
    }
}

impl<T: Float> SubAssign<Vector3<T>> for Vector3<T> {
    #[inline]
    fn sub_assign(&mut self, rhs: Vector3<T>) {
        *self = *self - rhs;
    }
}

impl<T: Float> MulAssign<T> for Vector3<T> {
    #[inline]
    fn mul_assign(&mut self, rhs: T) {
        *self = *self * rhs;
    }
}

impl<T: Float> DivAssign<T> for Vector3<T> {
    #[inline]
    fn div_assign(&mut self, rhs: T) {
        *self = *self / rhs;
    }
}
