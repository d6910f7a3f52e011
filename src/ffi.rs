/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::error::bounded;
use crate::{
    ChannelOrder, IlluminantSource, ImageLayout, WhiteBalanceError, WhiteBalanceOptions,
    WhiteBalancer, STRENGTH_SENTINEL,
};
use std::ffi::{c_char, c_float, c_int, c_uint};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Interface version, `0x00MMmmpp`
pub const WB_VERSION: c_int = 0x0001_0200;

/// Older interface version still served by this library
pub const WB_VERSION_PREVIOUS: c_int = 0x0001_0001;

/// Format flag for RGB channel order
pub const WB_RGB: c_uint = 0;

/// Format flag for BGR channel order
pub const WB_BGR: c_uint = 1;

pub const WB_SUPPORTED_NOT: c_int = 0;
pub const WB_SUPPORTED_FULLY: c_int = 1;

const UNANNOTATED: &str = "unannotated exception";

#[no_mangle]
pub extern "C" fn wb_version() -> c_int {
    WB_VERSION
}

#[no_mangle]
pub extern "C" fn wb_is_version_supported(version: c_int) -> c_int {
    if version == WB_VERSION || version == WB_VERSION_PREVIOUS {
        WB_SUPPORTED_FULLY
    } else {
        WB_SUPPORTED_NOT
    }
}

/// White balances `width * height` float pixels.
///
/// `color_space6`, `white_point2` and `illuminant3` may be null to use sRGB primaries,
/// equal energy white and a gray world estimate. `strength` of -1 selects the default.
/// `in_pixels == out_pixels` balances in place. Returns 1 on success, 0 on failure with a
/// NUL terminated reason written to `message128` when it is not null.
///
/// # Safety
/// Non null parameter arrays must hold 6, 2 and 3 floats. Both pixel buffers must span
/// `(width * height - 1) * pixel_stride` bytes plus one pixel, and must either be the
/// same pointer or not overlap at all. `message128` must be null or hold 128 bytes.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn wb_white_balance(
    color_space6: *const c_float,
    white_point2: *const c_float,
    illuminant3: *const c_float,
    strength: c_float,
    width: c_uint,
    height: c_uint,
    format_flags: c_uint,
    pixel_stride: c_uint,
    in_pixels: *const c_float,
    out_pixels: *mut c_float,
    message128: *mut c_char,
) -> c_int {
    if !message128.is_null() {
        *message128 = 0;
    }

    let result = catch_unwind(AssertUnwindSafe(|| {
        let options = WhiteBalanceOptions {
            primaries: read_array::<6>(color_space6),
            white_point: read_array::<2>(white_point2),
            illuminant: match read_array::<3>(illuminant3) {
                Some(color) => IlluminantSource::Supplied(color),
                None => IlluminantSource::GrayWorld,
            },
            strength,
        };
        let layout = ImageLayout::new(
            width,
            height,
            ChannelOrder::from_flags(format_flags),
            pixel_stride,
        );
        balance_raw(&options, &layout, in_pixels, out_pixels)
    }));

    let message = match result {
        Ok(Ok(())) => return 1,
        Ok(Err(error)) => error.bounded_message(),
        Err(_) => UNANNOTATED.to_string(),
    };
    tracing::warn!(%message, "white balancing failed");
    write_message(message128, &message);
    0
}

/// White balances with every option at its default, see [wb_white_balance]
///
/// # Safety
/// Same pixel buffer requirements as [wb_white_balance].
#[no_mangle]
pub unsafe extern "C" fn wb_white_balance_default(
    width: c_uint,
    height: c_uint,
    format_flags: c_uint,
    pixel_stride: c_uint,
    in_pixels: *const c_float,
    out_pixels: *mut c_float,
) -> c_int {
    wb_white_balance(
        std::ptr::null(),
        std::ptr::null(),
        std::ptr::null(),
        STRENGTH_SENTINEL,
        width,
        height,
        format_flags,
        pixel_stride,
        in_pixels,
        out_pixels,
        std::ptr::null_mut(),
    )
}

unsafe fn read_array<const N: usize>(ptr: *const c_float) -> Option<[f32; N]> {
    if ptr.is_null() {
        None
    } else {
        Some(ptr.cast::<[f32; N]>().read_unaligned())
    }
}

unsafe fn balance_raw(
    options: &WhiteBalanceOptions,
    layout: &ImageLayout,
    in_pixels: *const c_float,
    out_pixels: *mut c_float,
) -> Result<(), WhiteBalanceError> {
    let balancer = WhiteBalancer::new(options)?;
    if in_pixels.is_null() || out_pixels.is_null() {
        return Err(WhiteBalanceError::InvalidImage("pixels pointer null"));
    }
    let len = layout.required_len::<f32>()?;
    if std::ptr::eq(in_pixels, out_pixels) {
        let pixels = std::slice::from_raw_parts_mut(out_pixels, len);
        balancer.balance_in_place(pixels, layout)
    } else {
        let src = std::slice::from_raw_parts(in_pixels, len);
        let dst = std::slice::from_raw_parts_mut(out_pixels, len);
        balancer.balance(src, dst, layout)
    }
}

unsafe fn write_message(buffer: *mut c_char, message: &str) {
    if buffer.is_null() {
        return;
    }
    let message = bounded(message.to_string());
    let bytes = message.as_bytes();
    std::ptr::copy_nonoverlapping(bytes.as_ptr().cast::<c_char>(), buffer, bytes.len());
    *buffer.add(bytes.len()) = 0;
}
