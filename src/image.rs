/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::{Vector3, WhiteBalanceError};
use half::f16;

/// Storage order of the color channels inside one pixel
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelOrder {
    #[default]
    Rgb = 0,
    Bgr = 1,
}

impl ChannelOrder {
    #[inline(always)]
    pub fn get_r_channel_offset(&self) -> usize {
        match self {
            ChannelOrder::Rgb => 0,
            ChannelOrder::Bgr => 2,
        }
    }

    #[inline(always)]
    pub fn get_g_channel_offset(&self) -> usize {
        1
    }

    #[inline(always)]
    pub fn get_b_channel_offset(&self) -> usize {
        match self {
            ChannelOrder::Rgb => 2,
            ChannelOrder::Bgr => 0,
        }
    }

    /// Reads the first three channels of `pixel` as RGB
    #[inline(always)]
    pub fn read<T: PixelChannel>(&self, pixel: &[T]) -> Vector3<f32> {
        Vector3::new(
            pixel[self.get_r_channel_offset()].to_f32(),
            pixel[self.get_g_channel_offset()].to_f32(),
            pixel[self.get_b_channel_offset()].to_f32(),
        )
    }

    /// Stores RGB into the first three channels of `pixel`
    #[inline(always)]
    pub fn write<T: PixelChannel>(&self, pixel: &mut [T], rgb: Vector3<f32>) {
        pixel[self.get_r_channel_offset()] = T::from_f32(rgb.x);
        pixel[self.get_g_channel_offset()] = T::from_f32(rgb.y);
        pixel[self.get_b_channel_offset()] = T::from_f32(rgb.z);
    }

    /// Channel order from C format flags, `1` is BGR and anything else RGB
    #[inline]
    pub fn from_flags(flags: u32) -> ChannelOrder {
        match flags {
            1 => ChannelOrder::Bgr,
            _ => ChannelOrder::Rgb,
        }
    }
}

/// Floating point channel storage the pipeline can read and write.
/// Computation always happens in `f32`.
pub trait PixelChannel: Copy + Send + Sync + 'static {
    fn to_f32(self) -> f32;
    fn from_f32(value: f32) -> Self;
}

impl PixelChannel for f32 {
    #[inline(always)]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline(always)]
    fn from_f32(value: f32) -> Self {
        value
    }
}

impl PixelChannel for f16 {
    #[inline(always)]
    fn to_f32(self) -> f32 {
        f16::to_f32(self)
    }

    /// Saturates at [f16::MAX] instead of rounding to infinity
    #[inline(always)]
    fn from_f32(value: f32) -> Self {
        if value > f16::MAX.to_f32() {
            f16::MAX
        } else {
            f16::from_f32(value)
        }
    }
}

/// Shape of a caller owned pixel buffer
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageLayout {
    pub width: u32,
    pub height: u32,
    pub channel_order: ChannelOrder,
    /// Bytes from one pixel to the next, 0 means tightly packed RGB
    pub pixel_stride: u32,
}

impl ImageLayout {
    #[inline]
    pub fn new(width: u32, height: u32, channel_order: ChannelOrder, pixel_stride: u32) -> ImageLayout {
        ImageLayout {
            width,
            height,
            channel_order,
            pixel_stride,
        }
    }

    /// Tightly packed three channel layout
    #[inline]
    pub fn packed(width: u32, height: u32, channel_order: ChannelOrder) -> ImageLayout {
        ImageLayout::new(width, height, channel_order, 0)
    }

    /// Validates the layout against a buffer of `buffer_len` channels of type `T`
    ///
    /// # Errors
    /// [WhiteBalanceError::InvalidImage] when `width * height * 3` overflows, the stride
    /// is smaller than one pixel or not a whole number of channels, or the buffer is short
    pub fn resolve<T: PixelChannel>(&self, buffer_len: usize) -> Result<ResolvedLayout, WhiteBalanceError> {
        let resolved = self.measure::<T>()?;
        let required = resolved.required_len();
        if buffer_len < required {
            return Err(WhiteBalanceError::InvalidImage("pixel buffer too short"));
        }
        tracing::trace!(
            pixels = resolved.pixels,
            stride = resolved.stride,
            required,
            buffer_len,
            "resolved image layout"
        );
        Ok(resolved)
    }

    /// Number of `T` channels a buffer needs to hold this image
    pub fn required_len<T: PixelChannel>(&self) -> Result<usize, WhiteBalanceError> {
        Ok(self.measure::<T>()?.required_len())
    }

    fn measure<T: PixelChannel>(&self) -> Result<ResolvedLayout, WhiteBalanceError> {
        let channel_size = std::mem::size_of::<T>();
        let pixels = (self.width as usize)
            .checked_mul(self.height as usize)
            .filter(|&n| {
                n.checked_mul(3)
                    .is_some_and(|channels| u32::try_from(channels).is_ok())
            })
            .ok_or(WhiteBalanceError::InvalidImage("size out of range"))?;

        let stride_bytes = if self.pixel_stride == 0 {
            channel_size * 3
        } else {
            self.pixel_stride as usize
        };
        if stride_bytes < channel_size * 3 {
            return Err(WhiteBalanceError::InvalidImage("pixel stride too small"));
        }
        if stride_bytes % channel_size != 0 {
            return Err(WhiteBalanceError::InvalidImage(
                "pixel stride is not a multiple of channel size",
            ));
        }
        let stride = stride_bytes / channel_size;
        if pixels > 0
            && (pixels - 1)
                .checked_mul(stride)
                .and_then(|v| v.checked_add(3))
                .is_none()
        {
            return Err(WhiteBalanceError::InvalidImage("size out of range"));
        }

        Ok(ResolvedLayout {
            pixels,
            stride,
            channel_order: self.channel_order,
        })
    }
}

/// Validated layout measured in channels
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ResolvedLayout {
    pub pixels: usize,
    /// Channels from one pixel to the next
    pub stride: usize,
    pub channel_order: ChannelOrder,
}

impl ResolvedLayout {
    /// Channels spanned from the first pixel to the last channel of the last pixel
    #[inline]
    pub fn required_len(&self) -> usize {
        if self.pixels == 0 {
            0
        } else {
            (self.pixels - 1) * self.stride + 3
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_offsets() {
        let bgr = ChannelOrder::Bgr;
        let pixel = [0.1f32, 0.2, 0.3];
        assert_eq!(bgr.read(&pixel), Vector3::new(0.3, 0.2, 0.1));
        assert_eq!(ChannelOrder::Rgb.read(&pixel), Vector3::new(0.1, 0.2, 0.3));

        let mut out = [0f32; 4];
        bgr.write(&mut out, Vector3::new(1., 2., 3.));
        assert_eq!(out, [3., 2., 1., 0.]);
        assert_eq!(ChannelOrder::from_flags(1), ChannelOrder::Bgr);
        assert_eq!(ChannelOrder::from_flags(7), ChannelOrder::Rgb);
    }

    #[test]
    fn test_half_channels() {
        let pixel = [f16::from_f32(0.5), f16::from_f32(0.25), f16::from_f32(2.)];
        assert_eq!(ChannelOrder::Rgb.read(&pixel), Vector3::new(0.5, 0.25, 2.));
        let mut out = [f16::ZERO; 3];
        ChannelOrder::Rgb.write(&mut out, Vector3::new(1., 0.125, 4.));
        assert_eq!(out[1].to_f32(), 0.125);
    }

    #[test]
    fn test_half_saturates() {
        assert_eq!(<f16 as PixelChannel>::from_f32(1e6), f16::MAX);
        assert_eq!(<f16 as PixelChannel>::from_f32(f32::INFINITY), f16::MAX);
        assert_eq!(<f16 as PixelChannel>::from_f32(65504.), f16::MAX);
        assert!(<f16 as PixelChannel>::from_f32(f32::NAN).is_nan());
    }

    #[test]
    fn test_packed_layout() {
        let layout = ImageLayout::packed(4, 2, ChannelOrder::Rgb);
        let resolved = layout.resolve::<f32>(24).unwrap();
        assert_eq!(resolved.pixels, 8);
        assert_eq!(resolved.stride, 3);
        assert_eq!(
            layout.resolve::<f32>(23),
            Err(WhiteBalanceError::InvalidImage("pixel buffer too short"))
        );
    }

    #[test]
    fn test_strided_layout() {
        // RGBA floats, alpha left untouched
        let layout = ImageLayout::new(3, 1, ChannelOrder::Bgr, 16);
        let resolved = layout.resolve::<f32>(11).unwrap();
        assert_eq!(resolved.stride, 4);
        assert_eq!(layout.required_len::<f32>(), Ok(11));
        assert_eq!(resolved.channel_order, ChannelOrder::Bgr);

        let half = ImageLayout::new(2, 2, ChannelOrder::Rgb, 8).resolve::<f16>(15).unwrap();
        assert_eq!(half.stride, 4);
    }

    #[test]
    fn test_invalid_strides() {
        assert_eq!(
            ImageLayout::new(1, 1, ChannelOrder::Rgb, 8).resolve::<f32>(3),
            Err(WhiteBalanceError::InvalidImage("pixel stride too small"))
        );
        assert_eq!(
            ImageLayout::new(1, 1, ChannelOrder::Rgb, 14).resolve::<f32>(4),
            Err(WhiteBalanceError::InvalidImage(
                "pixel stride is not a multiple of channel size"
            ))
        );
    }

    #[test]
    fn test_empty_and_oversized() {
        let empty = ImageLayout::packed(0, 7, ChannelOrder::Rgb).resolve::<f32>(0).unwrap();
        assert_eq!(empty.pixels, 0);
        assert_eq!(
            ImageLayout::packed(u32::MAX, 2, ChannelOrder::Rgb).resolve::<f32>(0),
            Err(WhiteBalanceError::InvalidImage("size out of range"))
        );
    }
}
