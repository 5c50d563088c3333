//! input discovery

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{MaskError, Result};

/// which directory entries are treated as input images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFilter {
    /// extension is `jpg`, `jpeg` or `png`, in any case
    #[default]
    Extension,
    /// file name ends in `g` or `G`. this also admits names such as `notes.svg` or `debug.log`
    TrailingG,
}

impl InputFilter {
    pub fn accepts(self, path: &Path) -> bool {
        match self {
            Self::Extension => path
                .extension()
                .and_then(|extension| extension.to_str())
                .is_some_and(|extension| {
                    matches!(
                        extension.to_ascii_lowercase().as_str(),
                        "jpg" | "jpeg" | "png"
                    )
                }),
            Self::TrailingG => path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.chars().last())
                .is_some_and(|last| last.eq_ignore_ascii_case(&'g')),
        }
    }
}

/// lists the files in `image_dir` accepted by `filter`. the result is sorted so that runs log
/// in a stable order.
pub fn find_images(image_dir: &Path, filter: InputFilter) -> Result<Vec<PathBuf>> {
    let read_dir_error = |source| MaskError::ReadDir {
        path: image_dir.to_path_buf(),
        source,
    };

    let mut image_files = Vec::new();
    for entry in fs::read_dir(image_dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let path = entry.path();
        if path.is_file() && filter.accepts(&path) {
            image_files.push(path);
        }
    }
    image_files.sort();

    log::info!("Found {} image files in {:?}", image_files.len(), image_dir);

    Ok(image_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_extension_filter() {
        let filter = InputFilter::Extension;

        assert!(filter.accepts(Path::new("a.jpg")));
        assert!(filter.accepts(Path::new("dir/B.JPEG")));
        assert!(filter.accepts(Path::new("c.Png")));
        assert!(!filter.accepts(Path::new("notes.svg")));
        assert!(!filter.accepts(Path::new("README")));
        assert!(!filter.accepts(Path::new("photo.jpg.txt")));
    }

    #[test]
    fn test_trailing_g_filter() {
        let filter = InputFilter::TrailingG;

        assert!(filter.accepts(Path::new("a.jpg")));
        assert!(filter.accepts(Path::new("B.JPEG")));
        assert!(filter.accepts(Path::new("notes.svg")));
        assert!(filter.accepts(Path::new("debug.LOG")));
        assert!(!filter.accepts(Path::new("photo.tif")));
    }

    #[test]
    fn test_find_images_skips_directories_and_other_files() {
        let dir = tempdir().unwrap();
        for name in ["b.png", "a.JPG", "notes.txt", "vector.svg"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let found = find_images(dir.path(), InputFilter::Extension).unwrap();

        assert_eq!(
            found,
            vec![dir.path().join("a.JPG"), dir.path().join("b.png")]
        );
    }

    #[test]
    fn test_find_images_missing_directory() {
        let dir = tempdir().unwrap();

        let result = find_images(&dir.path().join("nope"), InputFilter::Extension);

        assert!(matches!(result, Err(MaskError::ReadDir { .. })));
    }
}
