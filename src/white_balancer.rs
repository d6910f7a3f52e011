/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::image::ResolvedLayout;
use crate::pixel_mapper::{postcondition_pixel, precondition_pixel};
use crate::{
    ColorSpace, IlluminantEstimator, IlluminantSource, ImageLayout, OpponentTransform,
    PixelChannel, PixelMapper, Vector3, WhiteBalanceError, FLAT_WHITE, SRGB_PRIMARIES,
};
#[cfg(feature = "rayon")]
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
#[cfg(feature = "rayon")]
use rayon::prelude::{ParallelSlice, ParallelSliceMut};
use tracing::debug;

/// Strength used when [STRENGTH_SENTINEL] is requested
pub const DEFAULT_STRENGTH: f32 = 0.8;

/// Strength value asking for [DEFAULT_STRENGTH]
pub const STRENGTH_SENTINEL: f32 = -1f32;

/// Parameters of white balancing, every field has a default
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WhiteBalanceOptions {
    /// `[rx, ry, gx, gy, bx, by]`, sRGB primaries when absent
    pub primaries: Option<[f32; 6]>,
    /// `[wx, wy]`, equal energy white when absent
    pub white_point: Option<[f32; 2]>,
    pub illuminant: IlluminantSource,
    /// Fraction of the correction to apply, clamped to `[0, 1]`.
    /// [STRENGTH_SENTINEL] selects [DEFAULT_STRENGTH].
    pub strength: f32,
}

impl Default for WhiteBalanceOptions {
    fn default() -> Self {
        WhiteBalanceOptions {
            primaries: None,
            white_point: None,
            illuminant: IlluminantSource::GrayWorld,
            strength: DEFAULT_STRENGTH,
        }
    }
}

impl WhiteBalanceOptions {
    pub fn with_primaries(mut self, primaries: [f32; 6]) -> Self {
        self.primaries = Some(primaries);
        self
    }

    pub fn with_white_point(mut self, white_point: [f32; 2]) -> Self {
        self.white_point = Some(white_point);
        self
    }

    pub fn with_illuminant(mut self, illuminant: [f32; 3]) -> Self {
        self.illuminant = IlluminantSource::Supplied(illuminant);
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    fn check_for_nans(&self) -> Result<(), WhiteBalanceError> {
        if self.primaries.is_some_and(|p| p.iter().any(|v| v.is_nan())) {
            return Err(WhiteBalanceError::InvalidParameter("NaN in primaries"));
        }
        if self.white_point.is_some_and(|w| w.iter().any(|v| v.is_nan())) {
            return Err(WhiteBalanceError::InvalidParameter("NaN in whitepoint"));
        }
        if let IlluminantSource::Supplied(color) = self.illuminant {
            if color.iter().any(|v| v.is_nan()) {
                return Err(WhiteBalanceError::InvalidParameter("NaN in illuminant"));
            }
        }
        if self.strength.is_nan() {
            return Err(WhiteBalanceError::InvalidParameter("NaN in strength"));
        }
        Ok(())
    }
}

/// Configured white balancing, reusable for any number of images
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WhiteBalancer {
    color_space: ColorSpace,
    illuminant: IlluminantSource,
    strength: f32,
}

impl WhiteBalancer {
    /// Resolves defaults and builds the color space conversions
    ///
    /// # Errors
    /// * [WhiteBalanceError::InvalidParameter] NaN in any option
    /// * color space errors of [ColorSpace::new]
    pub fn new(options: &WhiteBalanceOptions) -> Result<WhiteBalancer, WhiteBalanceError> {
        options.check_for_nans()?;

        let primaries = options.primaries.unwrap_or(SRGB_PRIMARIES);
        let white_point = options.white_point.unwrap_or(FLAT_WHITE);
        let strength = if options.strength == STRENGTH_SENTINEL {
            DEFAULT_STRENGTH
        } else {
            options.strength
        };
        let color_space = ColorSpace::new(primaries, white_point)?;

        debug!(
            ?primaries,
            ?white_point,
            illuminant = ?options.illuminant,
            strength,
            "white balancer configured"
        );

        Ok(WhiteBalancer {
            color_space,
            illuminant: options.illuminant,
            strength,
        })
    }

    #[inline]
    pub fn color_space(&self) -> &ColorSpace {
        &self.color_space
    }

    #[inline]
    pub fn illuminant_source(&self) -> IlluminantSource {
        self.illuminant
    }

    /// Requested strength with the sentinel resolved, before clamping
    #[inline]
    pub fn strength(&self) -> f32 {
        self.strength
    }

    fn transform(&self) -> OpponentTransform {
        OpponentTransform::from_color_space(&self.color_space)
    }

    /// Opponent space illuminant of an image
    pub fn estimate_illuminant<T: PixelChannel>(
        &self,
        pixels: &[T],
        layout: &ImageLayout,
    ) -> Result<Vector3<f32>, WhiteBalanceError> {
        let resolved = layout.resolve::<T>(pixels.len())?;
        Ok(self.illuminant_for(pixels, &resolved))
    }

    fn illuminant_for<T: PixelChannel>(&self, pixels: &[T], layout: &ResolvedLayout) -> Vector3<f32> {
        IlluminantEstimator::from_transform(self.transform()).estimate(&self.illuminant, pixels, layout)
    }

    fn mapper(&self, illuminant: Vector3<f32>) -> PixelMapper {
        PixelMapper::new(
            &self.color_space.rgb_to_xyz(),
            &self.color_space.xyz_to_rgb(),
            illuminant,
            self.strength,
        )
    }

    /// Writes the balanced `src` into `dst`, both described by `layout`.
    /// Pixels with a NaN channel are copied unchanged, channels past the third are never written.
    ///
    /// # Errors
    /// [WhiteBalanceError::InvalidImage] when either buffer doesn't fit `layout`, nothing is written then
    pub fn balance<T: PixelChannel>(
        &self,
        src: &[T],
        dst: &mut [T],
        layout: &ImageLayout,
    ) -> Result<(), WhiteBalanceError> {
        let resolved = layout.resolve::<T>(src.len())?;
        layout.resolve::<T>(dst.len())?;
        if resolved.pixels == 0 {
            return Ok(());
        }

        let illuminant = self.illuminant_for(src, &resolved);
        let mapper = self.mapper(illuminant);
        let order = resolved.channel_order;

        debug!(
            pixels = resolved.pixels,
            strength = mapper.strength(),
            "balancing image"
        );

        let iter;
        #[cfg(feature = "rayon")]
        {
            iter = dst
                .par_chunks_mut(resolved.stride)
                .take(resolved.pixels)
                .zip(src.par_chunks(resolved.stride).take(resolved.pixels));
        }
        #[cfg(not(feature = "rayon"))]
        {
            iter = dst
                .chunks_mut(resolved.stride)
                .take(resolved.pixels)
                .zip(src.chunks(resolved.stride).take(resolved.pixels));
        }

        iter.for_each(|(dst, src)| {
            let rgb = order.read(src);
            if rgb.has_nan() {
                dst[..3].copy_from_slice(&src[..3]);
            } else {
                order.write(dst, postcondition_pixel(mapper.apply(precondition_pixel(rgb))));
            }
        });

        Ok(())
    }

    /// Balances `pixels` in place, NaN pixels are left untouched
    ///
    /// # Errors
    /// [WhiteBalanceError::InvalidImage] when the buffer doesn't fit `layout`, nothing is written then
    pub fn balance_in_place<T: PixelChannel>(
        &self,
        pixels: &mut [T],
        layout: &ImageLayout,
    ) -> Result<(), WhiteBalanceError> {
        let resolved = layout.resolve::<T>(pixels.len())?;
        if resolved.pixels == 0 {
            return Ok(());
        }

        let illuminant = self.illuminant_for(pixels, &resolved);
        let mapper = self.mapper(illuminant);
        let order = resolved.channel_order;

        debug!(
            pixels = resolved.pixels,
            strength = mapper.strength(),
            "balancing image in place"
        );

        let iter;
        #[cfg(feature = "rayon")]
        {
            iter = pixels
                .par_chunks_mut(resolved.stride)
                .take(resolved.pixels);
        }
        #[cfg(not(feature = "rayon"))]
        {
            iter = pixels.chunks_mut(resolved.stride).take(resolved.pixels);
        }

        iter.for_each(|pixel| {
            let rgb = order.read(pixel);
            if !rgb.has_nan() {
                order.write(pixel, postcondition_pixel(mapper.apply(precondition_pixel(rgb))));
            }
        });

        Ok(())
    }
}

/// Balances `src` into `dst` with `options`, see [WhiteBalancer::balance]
pub fn white_balance<T: PixelChannel>(
    src: &[T],
    dst: &mut [T],
    layout: &ImageLayout,
    options: &WhiteBalanceOptions,
) -> Result<(), WhiteBalanceError> {
    WhiteBalancer::new(options)?.balance(src, dst, layout)
}

/// Balances `pixels` in place with `options`, see [WhiteBalancer::balance_in_place]
pub fn white_balance_in_place<T: PixelChannel>(
    pixels: &mut [T],
    layout: &ImageLayout,
    options: &WhiteBalanceOptions,
) -> Result<(), WhiteBalanceError> {
    WhiteBalancer::new(options)?.balance_in_place(pixels, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cone::cone_constants;
    use crate::{ChannelOrder, Matrix3, D65_WHITE_POINT};
    use half::f16;

    fn packed(width: u32, height: u32) -> ImageLayout {
        ImageLayout::packed(width, height, ChannelOrder::Rgb)
    }

    fn run(pixels: &[f32], options: &WhiteBalanceOptions) -> Vec<f32> {
        let mut out = vec![0f32; pixels.len()];
        let layout = packed((pixels.len() / 3) as u32, 1);
        white_balance(pixels, &mut out, &layout, options).unwrap();
        out
    }

    fn luminance(weights: Vector3<f64>, rgb: &[f32]) -> f64 {
        weights.dot(&Vector3::new(rgb[0] as f64, rgb[1] as f64, rgb[2] as f64))
    }

    fn relative_diff(a: &[f32], b: &[f32]) -> f32 {
        let scale = b.iter().fold(0f32, |acc, v| acc.max(v.abs())).max(1e-6);
        a.iter()
            .zip(b.iter())
            .fold(0f32, |acc, (x, y)| acc.max((x - y).abs()))
            / scale
    }

    /// Double precision pipeline with exact logarithms and gray world estimation
    fn reference(pixels: &[[f64; 3]], space: &ColorSpace, strength: f64) -> Vec<[f64; 3]> {
        let constants = cone_constants();
        let rgb_to_cone: Matrix3<f64> = constants.xyz_to_cone * space.rgb_to_xyz();
        let cone_to_rgb: Matrix3<f64> = space.xyz_to_rgb() * constants.cone_to_xyz;
        let to_opponent = |rgb: Vector3<f64>| {
            let cone = (rgb_to_cone * rgb).clamp_min(1e-14);
            constants.cone_to_opponent * cone.map(|v| v.log10())
        };
        let illuminant = pixels
            .iter()
            .fold(Vector3::zero(), |acc, p| acc + to_opponent(Vector3::from_array(*p)))
            / pixels.len() as f64;
        let shift = Vector3::new(0f64, illuminant.y, illuminant.z) * strength;
        let weights = space.luminance_weights();
        pixels
            .iter()
            .map(|p| {
                let rgb = Vector3::from_array(*p);
                let opponent = to_opponent(rgb) - shift;
                let cone = (constants.opponent_to_cone * opponent).map(|v| 10f64.powf(v));
                let out = cone_to_rgb * cone;
                let out_luminance = out.dot(&weights);
                let scale = if out_luminance != 0f64 {
                    rgb.dot(&weights) / out_luminance
                } else {
                    0f64
                };
                (out * scale).clamp_min(0f64).to_array()
            })
            .collect()
    }

    #[test]
    fn test_two_pixel_gray_world() {
        let pixels = [1f32, 1., 1., 0.5, 0.5, 0.5];
        let out = run(&pixels, &WhiteBalanceOptions::default());
        let space = ColorSpace::with_srgb_primaries(FLAT_WHITE).unwrap();
        let weights = space.luminance_weights();

        let expected = reference(&[[1., 1., 1.], [0.5, 0.5, 0.5]], &space, 0.8);
        for (i, expected) in expected.iter().enumerate() {
            let pixel = &out[i * 3..i * 3 + 3];
            let input = &pixels[i * 3..i * 3 + 3];
            assert!((luminance(weights, pixel) - luminance(weights, input)).abs() < 1e-5);
            for (a, b) in pixel.iter().zip(expected.iter()) {
                assert!((*a as f64 - b).abs() < 2e-3, "{:?} {:?}", pixel, expected);
            }
        }
    }

    #[test]
    fn test_colored_image_matches_reference() {
        let pixels = [0.9f32, 0.5, 0.2, 0.3, 0.35, 0.1, 0.05, 0.2, 0.6];
        let options = WhiteBalanceOptions::default().with_white_point(D65_WHITE_POINT);
        let out = run(&pixels, &options);
        let space = ColorSpace::srgb().unwrap();
        let weights = space.luminance_weights();

        let input = pixels
            .chunks_exact(3)
            .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
            .collect::<Vec<[f64; 3]>>();
        let expected = reference(&input, &space, 0.8);
        for (i, expected) in expected.iter().enumerate() {
            let pixel = &out[i * 3..i * 3 + 3];
            let luma = luminance(weights, &pixels[i * 3..i * 3 + 3]);
            assert!((luminance(weights, pixel) - luma).abs() < 1e-4 * luma);
            for (a, b) in pixel.iter().zip(expected.iter()) {
                assert!((*a as f64 - b).abs() < 2e-3, "{:?} {:?}", pixel, expected);
            }
        }
        // the mean is bluish, so the correction warms the image
        assert!(out[0] > pixels[0] || out[8] < pixels[8]);
    }

    #[test]
    fn test_zero_strength_is_identity() {
        let pixels = [0.9f32, 0.5, 0.2, 0.3, 0.35, 0.1, 0.05, 0.2, 0.6, 4., 2., 1.];
        let options = WhiteBalanceOptions::default().with_strength(0.);
        let out = run(&pixels, &options);
        for (a, b) in out.chunks_exact(3).zip(pixels.chunks_exact(3)) {
            assert!(relative_diff(a, b) < 5e-3, "{:?} {:?}", a, b);
        }
    }

    #[test]
    fn test_sentinel_matches_default_strength() {
        let pixels = [0.9f32, 0.5, 0.2, 0.3, 0.35, 0.1, 0.05, 0.2, 0.6];
        let sentinel = run(&pixels, &WhiteBalanceOptions::default().with_strength(STRENGTH_SENTINEL));
        let explicit = run(&pixels, &WhiteBalanceOptions::default().with_strength(0.8));
        assert!(relative_diff(&sentinel, &explicit) < 1e-6);
        assert_eq!(
            WhiteBalancer::new(&WhiteBalanceOptions::default().with_strength(-1.))
                .unwrap()
                .strength(),
            DEFAULT_STRENGTH
        );
    }

    #[test]
    fn test_black_maps_to_black() {
        let pixels = [0f32, 0., 0., 0.8, 0.2, 0.1];
        for options in [
            WhiteBalanceOptions::default(),
            WhiteBalanceOptions::default().with_strength(1.),
            WhiteBalanceOptions::default().with_illuminant([1., 0.2, 0.1]),
        ] {
            let out = run(&pixels, &options);
            assert_eq!(&out[..3], &[0f32, 0., 0.]);
        }
    }

    #[test]
    fn test_nan_pixels_pass_through() {
        let nan = f32::from_bits(0x7FC0_1234);
        let pixels = [0.4f32, nan, 0.1, 0.9, 0.5, 0.2, -0., f32::NAN, f32::INFINITY];
        let out = run(&pixels, &WhiteBalanceOptions::default().with_strength(1.));
        for i in [0usize, 1, 2, 6, 7, 8] {
            assert_eq!(out[i].to_bits(), pixels[i].to_bits());
        }

        let clean = [0.9f32, 0.5, 0.2];
        let alone = run(&clean, &WhiteBalanceOptions::default().with_strength(1.));
        assert!(relative_diff(&out[3..6], &alone) < 1e-6);
    }

    #[test]
    fn test_constant_image_becomes_neutral() {
        let pixels = [0.6f32, 0.4, 0.2].repeat(16);
        let balancer = WhiteBalancer::new(&WhiteBalanceOptions::default().with_strength(1.)).unwrap();
        let layout = packed(4, 4);
        let illuminant = balancer.estimate_illuminant(&pixels, &layout).unwrap();
        let transform = OpponentTransform::from_color_space(balancer.color_space());
        assert!(illuminant.max_abs_diff(&transform.from_rgb(Vector3::new(0.6, 0.4, 0.2))) < 1e-5);

        let mut out = vec![0f32; pixels.len()];
        balancer.balance(&pixels, &mut out, &layout).unwrap();
        let corrected = transform.from_rgb(Vector3::new(out[0], out[1], out[2]));
        assert!(corrected.y.abs() < 2e-3 && corrected.z.abs() < 2e-3);
    }

    #[test]
    fn test_in_place_matches_copy() {
        let pixels = [0.9f32, 0.5, 0.2, 0.3, 0.35, 0.1, f32::NAN, 0.2, 0.6];
        let options = WhiteBalanceOptions::default().with_illuminant([1., 0.9, 0.6]);
        let copied = run(&pixels, &options);
        let mut in_place = pixels;
        white_balance_in_place(&mut in_place, &packed(3, 1), &options).unwrap();
        assert!(relative_diff(&in_place[..6], &copied[..6]) < 1e-6);
        assert!(in_place[6].is_nan());
    }

    #[test]
    fn test_strided_bgr_keeps_padding() {
        let rgb = [0.9f32, 0.5, 0.2, 0.3, 0.35, 0.1];
        let expected = run(&rgb, &WhiteBalanceOptions::default());

        let bgra = [0.2f32, 0.5, 0.9, 7., 0.1, 0.35, 0.3, 8.];
        let layout = ImageLayout::new(2, 1, ChannelOrder::Bgr, 16);
        let mut out = [-1f32; 8];
        WhiteBalancer::new(&WhiteBalanceOptions::default())
            .unwrap()
            .balance(&bgra, &mut out, &layout)
            .unwrap();
        assert_eq!(out[3], -1.);
        assert_eq!(out[7], -1.);
        let as_rgb = [out[2], out[1], out[0], out[6], out[5], out[4]];
        assert!(relative_diff(&as_rgb, &expected) < 1e-6);
    }

    #[test]
    fn test_half_pixels() {
        let values = [0.9f32, 0.5, 0.2, 0.3, 0.35, 0.1];
        let mut pixels = values.iter().map(|&v| f16::from_f32(v)).collect::<Vec<f16>>();
        let as_f32 = pixels.iter().map(|v| v.to_f32()).collect::<Vec<f32>>();
        let expected = run(&as_f32, &WhiteBalanceOptions::default());
        white_balance_in_place(&mut pixels, &packed(2, 1), &WhiteBalanceOptions::default()).unwrap();
        for (a, b) in pixels.iter().zip(expected.iter()) {
            assert!((a.to_f32() - b).abs() < 2e-3);
        }
    }

    #[test]
    fn test_bright_half_pixels_stay_finite() {
        // a blue cast removed from a white pixel pushes red far above 65504
        let mut pixels = [f16::from_f32(50000.); 3];
        let options = WhiteBalanceOptions::default()
            .with_illuminant([0.1, 0.1, 1.])
            .with_strength(1.);
        white_balance_in_place(&mut pixels, &packed(1, 1), &options).unwrap();
        assert_eq!(pixels[0], f16::MAX);
        assert!(pixels.iter().all(|v| v.is_finite()));
        assert!(pixels[2].to_f32() < 10000.);
    }

    #[test]
    fn test_invalid_parameters() {
        let nan_cases = [
            (
                WhiteBalanceOptions::default().with_strength(f32::NAN),
                "NaN in strength",
            ),
            (
                WhiteBalanceOptions::default().with_illuminant([1., f32::NAN, 1.]),
                "NaN in illuminant",
            ),
            (
                WhiteBalanceOptions::default().with_white_point([f32::NAN, 0.3]),
                "NaN in whitepoint",
            ),
            (
                WhiteBalanceOptions::default().with_primaries([0.64, 0.33, 0.3, 0.6, 0.15, f32::NAN]),
                "NaN in primaries",
            ),
        ];
        for (options, message) in nan_cases {
            assert_eq!(
                WhiteBalancer::new(&options),
                Err(WhiteBalanceError::InvalidParameter(message))
            );
        }
        assert_eq!(
            WhiteBalancer::new(&WhiteBalanceOptions::default().with_white_point([0.3, 0.])),
            Err(WhiteBalanceError::InvalidWhitePoint)
        );
        assert_eq!(
            WhiteBalancer::new(
                &WhiteBalanceOptions::default().with_primaries([0.2, 0.2, 0.3, 0.3, 0.4, 0.4])
            ),
            Err(WhiteBalanceError::InvalidChromaticities)
        );
    }

    #[test]
    fn test_invalid_image_writes_nothing() {
        let pixels = [0.5f32; 6];
        let mut out = [-1f32; 6];
        let balancer = WhiteBalancer::new(&WhiteBalanceOptions::default()).unwrap();
        assert_eq!(
            balancer.balance(&pixels, &mut out, &ImageLayout::new(2, 1, ChannelOrder::Rgb, 4)),
            Err(WhiteBalanceError::InvalidImage("pixel stride too small"))
        );
        assert_eq!(
            balancer.balance(&pixels, &mut out[..5], &packed(2, 1)),
            Err(WhiteBalanceError::InvalidImage("pixel buffer too short"))
        );
        assert_eq!(out, [-1f32; 6]);
    }
}
