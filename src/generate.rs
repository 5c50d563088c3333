//! per-image mask generation: load, threshold, write, count.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{DynamicImage, ImageFormat};

use crate::{
    MaskError, Result,
    mask::{ChannelThreshold, MaskGenerator, count_on},
};

/// appended to the source file stem to name the written mask.
pub const MASK_SUFFIX: &str = "_mask";

/// a mask which was generated and written successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedImage {
    pub source: PathBuf,
    pub output: PathBuf,
    pub on_count: u64,
}

/// where the mask for `image_path` is written: `<output_dir>/<stem>_mask.png`.
pub fn mask_path(image_path: &Path, output_dir: &Path) -> PathBuf {
    let mut file_name = image_path.file_stem().unwrap_or_default().to_os_string();
    file_name.push(MASK_SUFFIX);
    file_name.push(".png");
    output_dir.join(file_name)
}

/// generates, writes and counts the highlight mask of a single image.
///
/// failures are logged here and handed back as a value. an unreadable image is a warning, any
/// later failure is an error; neither should stop the other images of a batch.
pub fn generate_mask(image_path: &Path, output_dir: &Path) -> Result<MaskedImage> {
    let result = try_generate_mask(image_path, output_dir);

    match &result {
        Ok(masked) => log::info!(
            "Image: {:?}, mask pixels fully on: {}",
            image_path,
            masked.on_count
        ),
        Err(e) if e.is_unreadable() => log::warn!("Failed to read image {:?}: {}", image_path, e),
        Err(e) => log::error!("Error processing image {:?}: {}", image_path, e),
    }

    result
}

fn try_generate_mask(image_path: &Path, output_dir: &Path) -> Result<MaskedImage> {
    log::debug!("Processing image: {:?}", image_path);

    let image = image::open(image_path).map_err(|source| MaskError::Decode {
        path: image_path.to_path_buf(),
        source,
    })?;
    let image = ensure_pixels(image, image_path)?;

    // channels are always handed to the generator in R, G, B order; alpha is dropped.
    let mask = ChannelThreshold::default().mask(&image.into_rgb8())?;

    fs::create_dir_all(output_dir).map_err(|source| MaskError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let output = mask_path(image_path, output_dir);
    mask.save_with_format(&output, ImageFormat::Png)
        .map_err(|source| MaskError::Save {
            path: output.clone(),
            source,
        })?;

    Ok(MaskedImage {
        source: image_path.to_path_buf(),
        output,
        on_count: count_on(&mask),
    })
}

/// a decoder may hand back an image without any pixels, which is treated like an unreadable file.
fn ensure_pixels(image: DynamicImage, image_path: &Path) -> Result<DynamicImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(MaskError::EmptyImage {
            path: image_path.to_path_buf(),
        });
    }
    Ok(image)
}
