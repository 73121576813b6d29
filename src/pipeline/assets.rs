//! Asset resolution: turn an entry's `file` reference into a decoded photo.
//!
//! ## Why so strict about paths?
//!
//! `file` comes straight from the request body. Joining it onto the assets
//! root without checks would let `../../etc/passwd` or `/etc/passwd` read
//! anything the process can. Only relative paths made of normal components
//! are accepted; a single leading `/` is ignored because browsers submit
//! upload URLs like `/uploads/abuela.jpg`.
//!
//! ## Why downscale?
//!
//! Phone photos are routinely 4000 × 3000 px. The image region of an entry
//! page is under 450 pt wide, so the extra pixels only inflate the PDF.
//! `max_image_pixels` caps the longest edge before embedding.

use crate::error::AssetError;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Resolve `file` against `root`, rejecting anything that could escape it.
pub fn resolve_asset_path(root: &Path, file: &str) -> Result<PathBuf, AssetError> {
    let invalid = || AssetError::InvalidPath {
        file: file.to_string(),
    };

    let relative = file.strip_prefix('/').unwrap_or(file);
    if relative.is_empty() {
        return Err(invalid());
    }

    let relative = Path::new(relative);
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid());
            }
        }
    }
    if resolved == root {
        return Err(invalid());
    }
    Ok(resolved)
}

/// Resolve, read, decode and (if needed) downscale one photo.
///
/// Blocking; called from the render thread.
pub fn load_image(root: &Path, file: &str, max_pixels: u32) -> Result<DynamicImage, AssetError> {
    let path = resolve_asset_path(root, file)?;

    let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AssetError::NotFound {
            file: file.to_string(),
        },
        _ if path.is_dir() => AssetError::NotFound {
            file: file.to_string(),
        },
        _ => AssetError::Unreadable {
            file: file.to_string(),
            detail: e.to_string(),
        },
    })?;

    let image = image::load_from_memory(&bytes).map_err(|e| AssetError::Undecodable {
        file: file.to_string(),
        detail: e.to_string(),
    })?;

    if image.width() == 0 || image.height() == 0 {
        return Err(AssetError::Undecodable {
            file: file.to_string(),
            detail: "image has no pixels".into(),
        });
    }

    Ok(downscale(image, max_pixels))
}

/// Shrink so the longest edge is at most `max_pixels`, preserving aspect.
pub fn downscale(image: DynamicImage, max_pixels: u32) -> DynamicImage {
    let (w, h) = (image.width(), image.height());
    if w.max(h) <= max_pixels {
        return image;
    }
    debug!("Downscaling {}x{} photo to fit {} px", w, h, max_pixels);
    image.resize(max_pixels, max_pixels, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn leading_slash_is_relative_to_root() {
        let root = Path::new("/srv/public");
        assert_eq!(
            resolve_asset_path(root, "/uploads/abuela.jpg").unwrap(),
            PathBuf::from("/srv/public/uploads/abuela.jpg")
        );
        assert_eq!(
            resolve_asset_path(root, "uploads/./abuela.jpg").unwrap(),
            PathBuf::from("/srv/public/uploads/abuela.jpg")
        );
    }

    #[test]
    fn traversal_and_absolute_paths_are_rejected() {
        let root = Path::new("public");
        for bad in ["../secret.png", "/uploads/../../etc/passwd", "//etc/passwd", "", "/", "."] {
            assert!(
                matches!(resolve_asset_path(root, bad), Err(AssetError::InvalidPath { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = std::env::temp_dir();
        let err = load_image(&dir, "definitely-not-here-7f3a.png", 2000).unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }

    #[test]
    fn downscale_caps_longest_edge() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(400, 100, Rgb([1, 2, 3])));
        let small = downscale(img, 200);
        assert_eq!((small.width(), small.height()), (200, 50));

        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 10, Rgb([1, 2, 3])));
        let same = downscale(img, 200);
        assert_eq!((same.width(), same.height()), (40, 10));
    }
}
