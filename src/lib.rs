mod color_space;
mod cone;
mod error;
mod fast_log;
mod fast_pow;
mod ffi;
mod illuminant;
mod image;
mod matrix3;
mod opponent;
mod pixel_mapper;
mod utils;
mod vector3;
mod white_balancer;

pub use color_space::Chromaticity;
pub use color_space::ColorSpace;
pub use color_space::{D65_WHITE_POINT, FLAT_WHITE, FLAT_WHITE_TOLERANCE, SRGB_PRIMARIES};
pub use cone::{cone_constants, ConeConstants, CONE_TO_OPPONENT, XYZ_TO_CONE};
pub use error::{WhiteBalanceError, MESSAGE_CAPACITY};
pub use fast_log::{shared_fast_log, FastLog, LOG_PRECISION, LOG_PRECISION_MAX};
pub use fast_pow::{shared_fast_pow, FastPow, POW_PRECISION, POW_PRECISION_MAX};
pub use ffi::*;
pub use illuminant::{IlluminantEstimator, IlluminantSource};
pub use image::{ChannelOrder, ImageLayout, PixelChannel, ResolvedLayout};
pub use matrix3::{Affine3, Matrix3};
pub use opponent::{Opponent, OpponentTransform};
pub use pixel_mapper::{postcondition_pixel, precondition_pixel, PixelMapper};
pub use pixel_mapper::{PIXEL_LARGE, PIXEL_SMALL};
pub use vector3::Vector3;
pub use white_balancer::{white_balance, white_balance_in_place};
pub use white_balancer::{WhiteBalanceOptions, WhiteBalancer};
pub use white_balancer::{DEFAULT_STRENGTH, STRENGTH_SENTINEL};
