// ABOUTME: Aspect-preserving downscale decisions against fixed pixel maxima
// ABOUTME: Applies the shared min-ratio rule with floored, never-rounded-up dimensions

use image::{imageops::FilterType, DynamicImage};
use log::debug;

/// Target dimensions for an image that must fit within `max_width` x
/// `max_height`. Returns None when the image already fits. Both dimensions
/// shrink by the same ratio, floored to whole pixels with a floor of 1.
pub fn target_dimensions(
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
) -> Option<(u32, u32)> {
    if width <= max_width && height <= max_height {
        return None;
    }

    let width_ratio = max_width as f64 / width as f64;
    let height_ratio = max_height as f64 / height as f64;

    // The smaller ratio keeps both axes within bounds
    let scale_ratio = width_ratio.min(height_ratio);

    let target_width = ((width as f64 * scale_ratio) as u32).max(1);
    let target_height = ((height as f64 * scale_ratio) as u32).max(1);

    Some((target_width, target_height))
}

/// Downscale `img` to fit the maxima, or hand it back untouched when it
/// already fits.
pub fn shrink_to_bounds(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    match target_dimensions(img.width(), img.height(), max_width, max_height) {
        Some((target_width, target_height)) => {
            debug!(
                "Downscaling {}x{} to {}x{}",
                img.width(),
                img.height(),
                target_width,
                target_height
            );
            // Bilinear scaling; the quality loop owns the size budget
            img.resize_exact(target_width, target_height, FilterType::Triangle)
        }
        None => img,
    }
}
