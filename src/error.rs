use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MaskError>;

#[derive(Debug, Error)]
pub enum MaskError {
    #[error("failed to read image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image {path:?} has no pixel data")]
    EmptyImage { path: PathBuf },

    #[error("pixel buffer does not match image dimensions: {0}")]
    Layout(#[from] ndarray::ShapeError),

    #[error("failed to create output directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to save mask to {path:?}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("mask {output:?} is already claimed by another image with the same name")]
    DuplicateOutput { path: PathBuf, output: PathBuf },

    #[error("processing of {path:?} panicked")]
    Panicked { path: PathBuf },

    #[error("failed to read directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl MaskError {
    /// whether the source image itself could not be read, as opposed to a failure while masking
    /// or writing the result.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::EmptyImage { .. })
    }
}
