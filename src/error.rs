/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use thiserror::Error;

/// Longest message, in bytes, reported across the C boundary
pub const MESSAGE_CAPACITY: usize = 127;

/// Failures of white balancing. Every one of them is raised before any output
/// pixel is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WhiteBalanceError {
    /// NaN or otherwise unusable value in a non-pixel parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    /// Primaries out of `[0, 1]` or linearly dependent
    #[error("invalid chromaticities given to color space conversion")]
    InvalidChromaticities,
    /// Whitepoint out of `(0, 1)`
    #[error("invalid whitepoint given to color space conversion")]
    InvalidWhitePoint,
    /// Derived RGB to XYZ matrix is singular
    #[error("invalid colorspace given to color space conversion")]
    InvalidColorSpace,
    /// Image size, pixel stride or buffer length doesn't describe a usable image
    #[error("invalid image: {0}")]
    InvalidImage(&'static str),
}

impl WhiteBalanceError {
    /// Display message cut to [MESSAGE_CAPACITY] bytes on a char boundary
    pub fn bounded_message(&self) -> String {
        bounded(self.to_string())
    }
}

pub(crate) fn bounded(mut message: String) -> String {
    if message.len() > MESSAGE_CAPACITY {
        let mut end = MESSAGE_CAPACITY;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            WhiteBalanceError::InvalidParameter("NaN in strength").to_string(),
            "invalid parameter: NaN in strength"
        );
        assert_eq!(
            WhiteBalanceError::InvalidImage("pixel stride too small").bounded_message(),
            "invalid image: pixel stride too small"
        );
    }

    #[test]
    fn test_bounded_cuts_on_char_boundary() {
        let long = "é".repeat(100);
        let cut = bounded(long);
        assert!(cut.len() <= MESSAGE_CAPACITY);
        assert_eq!(cut.len(), 126);
        assert!(cut.chars().all(|c| c == 'é'));
        assert_eq!(bounded("short".to_string()), "short");
    }
}
