//! Projection-profile boundary detection.

use image::{DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold_mut, ThresholdType};
use rayon::prelude::*;

use crate::geometry::Boundary;

/// Locates the rectangular extent of a high-contrast foreground object.
///
/// The image is binarized with an automatically selected Otsu level, then
/// projected onto both axes. On each axis the object is taken to span from the
/// first to the last index whose projection sum is strictly above the mean of
/// that projection.
///
/// # Arguments
///
/// * `image` - Grayscale input. It is never modified; thresholding happens on
///   an owned working copy.
///
/// # Returns
///
/// A corner-form [`Boundary`] whose coordinates are column/row indices of the
/// image, so `0 <= x1 <= x2 <= width - 1` and `0 <= y1 <= y2 <= height - 1`.
///
/// # Degenerate input
///
/// The detector never fails. A uniform image (or an empty one) has no profile
/// entry above its mean and collapses to the zero boundary `(0, 0)-(0, 0)`.
/// Textured backgrounds and lighting gradients leak into the projections and
/// can widen the result; that is a property of the method, not a bug.
///
/// # Algorithm Pipeline
///
/// 1. Otsu threshold selection and binarization (foreground 255, background 0)
/// 2. Column-sum and row-sum projection profiles (computed in parallel)
/// 3. Strict above-mean mask per profile
/// 4. First true index from the start, last true index from the end
///
/// # Examples
///
/// ```rust,no_run
/// use image::open;
/// use doc_bound::detect_boundary;
///
/// let image = open("page.jpg").unwrap().to_luma8();
/// let boundary = detect_boundary(&image);
/// println!("({}, {}) - ({}, {})", boundary.x1, boundary.y1, boundary.x2, boundary.y2);
/// ```
pub fn detect_boundary(image: &GrayImage) -> Boundary {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        debug!("empty {width}x{height} image, returning zero boundary");
        return Boundary::default();
    }

    let binary = binarize(image);

    let columns = above_mean_mask(&column_profile(&binary));
    let rows = above_mean_mask(&row_profile(&binary));

    let sx = first_true(&columns).unwrap_or(0);
    let sy = first_true(&rows).unwrap_or(0);
    let sx2 = last_true(&columns).unwrap_or(0);
    let sy2 = last_true(&rows).unwrap_or(0);

    debug!("boundary ({sx}, {sy}) - ({sx2}, {sy2}) in {width}x{height} image");

    Boundary::new(sx as i32, sy as i32, sx2 as i32, sy2 as i32)
}

/// Converts color input to grayscale and runs [`detect_boundary`].
pub fn detect_boundary_dynamic(image: &DynamicImage) -> Boundary {
    detect_boundary(&image.to_luma8())
}

/// Returns a two-valued copy of `image`: 255 where a pixel is above the Otsu
/// level, 0 elsewhere.
pub fn binarize(image: &GrayImage) -> GrayImage {
    let level = otsu_level(image);
    debug!("otsu level: {level}");

    let mut binary = image.clone();
    threshold_mut(&mut binary, level, ThresholdType::Binary);
    binary
}

/// Sum of pixel values down each column (length = image width).
pub fn column_profile(image: &GrayImage) -> Vec<u64> {
    let (width, height) = image.dimensions();
    let (width, height) = (width as usize, height as usize);
    let pixels = image.as_raw();

    (0..width)
        .into_par_iter()
        .map(|x| {
            (0..height)
                .map(|y| u64::from(pixels[y * width + x]))
                .sum()
        })
        .collect()
}

/// Sum of pixel values across each row (length = image height).
pub fn row_profile(image: &GrayImage) -> Vec<u64> {
    let (width, height) = image.dimensions();
    if width == 0 {
        return vec![0; height as usize];
    }

    image
        .as_raw()
        .par_chunks(width as usize)
        .map(|row| row.iter().map(|&p| u64::from(p)).sum())
        .collect()
}

/// Marks the entries strictly greater than the arithmetic mean of `profile`.
pub fn above_mean_mask(profile: &[u64]) -> Vec<bool> {
    if profile.is_empty() {
        return Vec::new();
    }
    let mean = profile.iter().map(|&v| v as f64).sum::<f64>() / profile.len() as f64;
    profile.iter().map(|&v| v as f64 > mean).collect()
}

/// Index of the first `true` entry, scanning from the start.
pub fn first_true(mask: &[bool]) -> Option<usize> {
    mask.iter().position(|&set| set)
}

/// Index of the last `true` entry, scanning from the end.
pub fn last_true(mask: &[bool]) -> Option<usize> {
    mask.iter().rposition(|&set| set)
}
