/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
mod transfer;

use anyhow::{Context, Result};
use clap::Parser;
use image::{DynamicImage, ImageFormat, Rgb32FImage};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transfer::Transfer;
use whitebalance_rs::{
    white_balance_in_place, ChannelOrder, ImageLayout, WhiteBalanceOptions, STRENGTH_SENTINEL,
};

#[derive(Parser, Debug)]
#[command(name = "wb-app")]
#[command(author, version, about = "Perceptual white balancing of an image", long_about = None)]
struct Args {
    /// Input image path
    input: PathBuf,

    /// Output image path, format follows the extension. OpenEXR and Radiance outputs keep
    /// linear float values, other formats are encoded to 8 bits
    output: PathBuf,

    /// Fraction of the correction to apply, 0 to 1
    #[arg(short, long, default_value_t = STRENGTH_SENTINEL, allow_negative_numbers = true)]
    strength: f32,

    /// Linear RGB color of the scene light, estimated from the image when absent
    #[arg(short, long, num_args = 3, value_names = ["R", "G", "B"])]
    illuminant: Option<Vec<f32>>,

    /// Chromaticities of the red, green and blue primaries, sRGB when absent
    #[arg(long, num_args = 6, value_names = ["RX", "RY", "GX", "GY", "BX", "BY"])]
    primaries: Option<Vec<f32>>,

    /// Whitepoint chromaticity of the image color space, equal energy white when absent
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    white_point: Option<Vec<f32>>,

    /// Transfer curve of the encoded channels. Defaults to linear for float inputs and
    /// sRGB otherwise
    #[arg(long, value_enum)]
    transfer: Option<Transfer>,

    /// Hand pixels to the balancer in BGR order
    #[arg(long)]
    bgr: bool,
}

impl Args {
    fn options(&self) -> WhiteBalanceOptions {
        let mut options = WhiteBalanceOptions::default().with_strength(self.strength);
        if let Some(illuminant) = &self.illuminant {
            options = options.with_illuminant([illuminant[0], illuminant[1], illuminant[2]]);
        }
        if let Some(p) = &self.primaries {
            options = options.with_primaries([p[0], p[1], p[2], p[3], p[4], p[5]]);
        }
        if let Some(white_point) = &self.white_point {
            options = options.with_white_point([white_point[0], white_point[1]]);
        }
        options
    }

    fn source_transfer(&self, decoded: &DynamicImage) -> Transfer {
        self.transfer.unwrap_or(if holds_linear_floats(decoded) {
            Transfer::Linear
        } else {
            Transfer::Srgb
        })
    }

    fn channel_order(&self) -> ChannelOrder {
        if self.bgr {
            ChannelOrder::Bgr
        } else {
            ChannelOrder::Rgb
        }
    }
}

/// Float buffers come from OpenEXR and Radiance decoders, which store linear light
fn holds_linear_floats(decoded: &DynamicImage) -> bool {
    matches!(
        decoded,
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)
    )
}

fn is_float_target(path: &Path) -> bool {
    matches!(
        ImageFormat::from_path(path),
        Ok(ImageFormat::OpenExr | ImageFormat::Hdr)
    )
}

/// Linearizes `decoded`, white balances it and returns linear RGB
fn balance(
    decoded: &DynamicImage,
    transfer: Transfer,
    order: ChannelOrder,
    options: &WhiteBalanceOptions,
) -> Result<Rgb32FImage> {
    let mut pixels = decoded.to_rgb32f();
    let (width, height) = pixels.dimensions();
    let decode = transfer.decoder();

    for pixel in pixels.chunks_exact_mut(3) {
        for channel in pixel.iter_mut() {
            *channel = decode(*channel);
        }
        if order == ChannelOrder::Bgr {
            pixel.swap(0, 2);
        }
    }

    white_balance_in_place(
        &mut *pixels,
        &ImageLayout::packed(width, height, order),
        options,
    )?;

    if order == ChannelOrder::Bgr {
        for pixel in pixels.chunks_exact_mut(3) {
            pixel.swap(0, 2);
        }
    }
    Ok(pixels)
}

/// Writes linear `pixels`, as floats for HDR targets and through `transfer` otherwise
fn save(mut pixels: Rgb32FImage, path: &Path, transfer: Transfer) -> Result<()> {
    let encoded = if is_float_target(path) {
        DynamicImage::ImageRgb32F(pixels)
    } else {
        let encode = transfer.encoder();
        for channel in pixels.iter_mut() {
            *channel = encode(*channel);
        }
        DynamicImage::ImageRgb8(DynamicImage::ImageRgb32F(pixels).to_rgb8())
    };
    encoded
        .save(path)
        .with_context(|| format!("failed to save {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let options = args.options();

    let start_time = Instant::now();
    let decoded = image::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let transfer = args.source_transfer(&decoded);
    info!(
        width = decoded.width(),
        height = decoded.height(),
        color = ?decoded.color(),
        ?transfer,
        elapsed = ?start_time.elapsed(),
        "decoded"
    );

    let start_time = Instant::now();
    let pixels = balance(&decoded, transfer, args.channel_order(), &options)?;
    info!(elapsed = ?start_time.elapsed(), "white balanced");

    let start_time = Instant::now();
    let output_transfer = args.transfer.unwrap_or(Transfer::Srgb);
    save(pixels, &args.output, output_transfer)?;
    info!(output = %args.output.display(), elapsed = ?start_time.elapsed(), "saved");

    Ok(())
}
