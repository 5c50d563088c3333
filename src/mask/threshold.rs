use image::{GrayImage, RgbImage};
use ndarray::{ArrayView3, Axis, ErrorKind, ShapeError};

use crate::mask::{CHANNEL_THRESHOLD, MASK_MAX, MASK_MIN, MaskGenerator};

const RGB_CHANNEL_COUNT: usize = 3;

/// constructs an image mask via the following method:
/// 1. view the interleaved RGB buffer as a `(height, width, channel)` matrix
/// 1. reduce the channel axis, keeping pixels where every channel exceeds the threshold
///
/// the rule does not care which channel is which, so the result is the same for RGB and BGR
/// buffers.
pub struct ChannelThreshold {
    threshold: u8,
}

impl Default for ChannelThreshold {
    fn default() -> Self {
        Self {
            threshold: CHANNEL_THRESHOLD,
        }
    }
}

impl MaskGenerator for ChannelThreshold {
    fn mask(&self, image: &RgbImage) -> crate::Result<GrayImage> {
        let (width, height) = image.dimensions();

        let pixels = ArrayView3::from_shape(
            (height as usize, width as usize, RGB_CHANNEL_COUNT),
            image.as_raw().as_slice(),
        )?;

        log::trace!("Thresholding {}x{} image at {}", width, height, self.threshold);

        let mask_mat = pixels.map_axis(Axis(2), |channels| {
            if channels.iter().all(|&value| value > self.threshold) {
                MASK_MAX
            } else {
                MASK_MIN
            }
        });

        // iteration over the matrix is in logical (row-major) order, which is the layout of a
        // GrayImage buffer.
        let raw: Vec<u8> = mask_mat.iter().copied().collect();

        GrayImage::from_raw(width, height, raw)
            .ok_or_else(|| ShapeError::from_kind(ErrorKind::IncompatibleShape).into())
    }
}
