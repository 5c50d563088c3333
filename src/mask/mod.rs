//! mask generation algorithms

pub mod threshold;

use image::{GrayImage, RgbImage};

pub use threshold::ChannelThreshold;

pub const MASK_MIN: u8 = 0;
pub const MASK_MAX: u8 = u8::MAX;

/// a channel value must be strictly greater than this for the channel to count as bright.
pub const CHANNEL_THRESHOLD: u8 = 200;

pub trait MaskGenerator {
    /// produce a single-channel mask with the same dimensions as `image`, where every pixel is
    /// either [`MASK_MIN`] or [`MASK_MAX`].
    fn mask(&self, image: &RgbImage) -> crate::Result<GrayImage>;
}

/// number of pixels in the mask which are fully on.
pub fn count_on(mask: &GrayImage) -> u64 {
    mask.pixels().filter(|pixel| pixel[0] == MASK_MAX).count() as u64
}
