/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::image::ResolvedLayout;
use crate::pixel_mapper::precondition_pixel;
use crate::{Matrix3, OpponentTransform, PixelChannel, Vector3};
#[cfg(feature = "rayon")]
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
#[cfg(feature = "rayon")]
use rayon::prelude::ParallelSlice;
use tracing::{debug, warn};

/// Where the scene illuminant comes from
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IlluminantSource {
    /// Mean of the image in opponent space
    #[default]
    GrayWorld,
    /// Linear RGB color of the light, its magnitude is matched to the image
    Supplied([f32; 3]),
}

/// Derives the scene illuminant, in opponent space, for one image
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IlluminantEstimator {
    transform: OpponentTransform,
}

impl IlluminantEstimator {
    pub fn new(rgb_to_xyz: &Matrix3<f64>, xyz_to_rgb: &Matrix3<f64>) -> IlluminantEstimator {
        IlluminantEstimator {
            transform: OpponentTransform::new(rgb_to_xyz, xyz_to_rgb),
        }
    }

    pub fn from_transform(transform: OpponentTransform) -> IlluminantEstimator {
        IlluminantEstimator { transform }
    }

    /// Illuminant for `source` over the pixels described by `layout`
    pub fn estimate<T: PixelChannel>(
        &self,
        source: &IlluminantSource,
        pixels: &[T],
        layout: &ResolvedLayout,
    ) -> Vector3<f32> {
        match source {
            IlluminantSource::GrayWorld => self.gray_world(pixels, layout),
            IlluminantSource::Supplied(color) => self.supplied(*color, pixels, layout),
        }
    }

    /// Scales `color` so its channel average equals the mean channel average of the
    /// image, then encodes it in opponent space
    pub fn supplied<T: PixelChannel>(
        &self,
        color: [f32; 3],
        pixels: &[T],
        layout: &ResolvedLayout,
    ) -> Vector3<f32> {
        let (sum, count) = sum_pixels(pixels, layout, |rgb| {
            Vector3::new(precondition_pixel(rgb).average() as f64, 0f64, 0f64)
        });
        if count == 0 {
            warn!(pixels = layout.pixels, "image has no usable pixels");
        }
        let mean = (sum.x / count.max(1) as f64) as f32;

        let color = Vector3::from_array(color).clamp_min(0f32);
        let magnitude = color.average();
        let normalized = color * (mean / if magnitude > 0f32 { magnitude } else { 1f32 });
        let illuminant = self.transform.from_rgb(normalized);

        debug!(
            mean,
            r = normalized.x,
            g = normalized.y,
            b = normalized.z,
            l = illuminant.x,
            alpha = illuminant.y,
            beta = illuminant.z,
            "supplied illuminant"
        );
        illuminant
    }

    /// Gray world estimate, the mean opponent color over every non NaN pixel.
    /// Zero when there is no such pixel.
    pub fn gray_world<T: PixelChannel>(&self, pixels: &[T], layout: &ResolvedLayout) -> Vector3<f32> {
        let transform = &self.transform;
        let (sum, count) = sum_pixels(pixels, layout, |rgb| {
            transform.from_rgb(precondition_pixel(rgb)).as_::<f64>()
        });
        if count == 0 {
            warn!(pixels = layout.pixels, "image has no usable pixels");
            return Vector3::zero();
        }
        let illuminant = (sum / count as f64).as_::<f32>();

        debug!(
            count,
            l = illuminant.x,
            alpha = illuminant.y,
            beta = illuminant.z,
            "gray world illuminant"
        );
        illuminant
    }
}

/// Sums `f` over every pixel without a NaN channel, returns the sum and the count
fn sum_pixels<T, F>(pixels: &[T], layout: &ResolvedLayout, f: F) -> (Vector3<f64>, usize)
where
    T: PixelChannel,
    F: Fn(Vector3<f32>) -> Vector3<f64> + Sync + Send,
{
    if layout.pixels == 0 {
        return (Vector3::zero(), 0);
    }
    let order = layout.channel_order;
    let accumulate = |pixel: &[T]| {
        let rgb = order.read(pixel);
        if rgb.has_nan() {
            (Vector3::zero(), 0usize)
        } else {
            (f(rgb), 1usize)
        }
    };

    let totals;
    #[cfg(feature = "rayon")]
    {
        totals = pixels
            .par_chunks(layout.stride)
            .take(layout.pixels)
            .map(accumulate)
            .reduce(
                || (Vector3::zero(), 0usize),
                |a, b| (a.0 + b.0, a.1 + b.1),
            );
    }
    #[cfg(not(feature = "rayon"))]
    {
        totals = pixels
            .chunks(layout.stride)
            .take(layout.pixels)
            .map(accumulate)
            .fold((Vector3::zero(), 0usize), |a, b| (a.0 + b.0, a.1 + b.1));
    }
    totals
}
