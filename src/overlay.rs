//! Presentation helpers for a detected boundary: drawing it over the frame and
//! cropping the frame down to it.

use image::{
    imageops::{self, FilterType},
    DynamicImage, Rgb, RgbImage,
};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::geometry::{Boundary, Region};

/// Display settings for rendering a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    /// Stroke width of the drawn boundary, in source pixels.
    pub line_thickness: u32,
    /// Output is downscaled by this integer factor; 0 and 1 keep the size.
    pub scale_factor: u32,
    pub color: Rgb<u8>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            line_thickness: 10,
            scale_factor: 4,
            color: Rgb([0, 255, 0]),
        }
    }
}

impl OverlayConfig {
    pub fn with_line_thickness(mut self, line_thickness: u32) -> Self {
        self.line_thickness = line_thickness;
        self
    }

    pub fn with_scale_factor(mut self, scale_factor: u32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_color(mut self, color: Rgb<u8>) -> Self {
        self.color = color;
        self
    }
}

/// Draws `boundary` over a copy of `image` and downsizes the result.
///
/// The stroke is centered on the boundary edges and clipped to the image, so
/// boundaries touching the border are drawn partially rather than panicking.
///
/// # Examples
///
/// ```rust,no_run
/// use image::open;
/// use doc_bound::{detect_boundary_dynamic, render_overlay, OverlayConfig};
///
/// let frame = open("page.jpg").unwrap();
/// let boundary = detect_boundary_dynamic(&frame);
/// let preview = render_overlay(&frame, boundary, &OverlayConfig::default());
/// preview.save("page_boundary.png").unwrap();
/// ```
pub fn render_overlay(image: &DynamicImage, boundary: Boundary, config: &OverlayConfig) -> RgbImage {
    let mut canvas = image.to_rgb8();
    draw_boundary_mut(&mut canvas, boundary, config.line_thickness, config.color);

    if config.scale_factor > 1 {
        let width = canvas.width() / config.scale_factor;
        let height = canvas.height() / config.scale_factor;
        if width > 0 && height > 0 {
            canvas = imageops::resize(&canvas, width, height, FilterType::Triangle);
        }
    }

    canvas
}

/// Draws the boundary outline in place with a stroke `thickness` pixels wide.
pub fn draw_boundary_mut(canvas: &mut RgbImage, boundary: Boundary, thickness: u32, color: Rgb<u8>) {
    let thickness = thickness.max(1) as i32;
    let width = boundary.width() + 1;
    let height = boundary.height() + 1;

    // Nested one-pixel outlines, from `thickness / 2` inside to the rest outside.
    for step in 0..thickness {
        let grow = step - thickness / 2;
        let w = width + 2 * grow;
        let h = height + 2 * grow;
        if w <= 0 || h <= 0 {
            continue;
        }
        let rect = Rect::at(boundary.x1 - grow, boundary.y1 - grow).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

/// Crops `image` to the size-form equivalent of `boundary`, clipped to the
/// image. Returns `None` when nothing of the boundary lies inside the image or
/// the boundary has zero area.
pub fn crop_to_boundary(image: &DynamicImage, boundary: Boundary) -> Option<DynamicImage> {
    let frame = Region::new(0, 0, image.width() as i32, image.height() as i32);
    let area = frame.intersection(&boundary.to_region());
    if area.is_empty() {
        return None;
    }

    Some(image.crop_imm(
        area.x as u32,
        area.y as u32,
        area.width as u32,
        area.height as u32,
    ))
}
