//! Image loading helpers.

use crate::core::ClassifierResult;
use image::RgbImage;
use rayon::prelude::*;
use std::path::Path;

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Errors
///
/// Returns [`ClassifierError::ImageLoad`](crate::core::ClassifierError::ImageLoad)
/// if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> ClassifierResult<RgbImage> {
    let img = image::open(path)?;
    Ok(img.to_rgb8())
}

/// Loads several images in parallel, keeping one result per input path in
/// input order.
pub fn load_images<P: AsRef<Path> + Sync>(paths: &[P]) -> Vec<ClassifierResult<RgbImage>> {
    paths
        .par_iter()
        .map(|path| load_image(path.as_ref()))
        .collect()
}
