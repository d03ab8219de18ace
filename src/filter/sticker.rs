use tracing::debug;

use super::geometry::Size;
use crate::color::Color;
use crate::raster::{RasterImage, filled};
use crate::text::{TextRenderer, TextRequest};

/// Largest sticker raster we allocate, in pixels (8192 x 8192).
const MAX_STICKER_PIXELS: f64 = (1u64 << 26) as f64;

/// Whole-pixel sticker dimensions; `None` for empty, non-finite, or
/// oversized measurements.
pub(crate) fn pixel_size(size: Size) -> Option<(u32, u32)> {
    if size.is_empty() || !size.width.is_finite() || !size.height.is_finite() {
        return None;
    }
    let width = size.width.ceil() as f64;
    let height = size.height.ceil() as f64;
    if width * height > MAX_STICKER_PIXELS {
        debug!("sticker: {}x{} exceeds the raster limit", width, height);
        return None;
    }
    Some((width as u32, height as u32))
}

/// Renders the text into a transparent raster sized to its own bounding box.
/// A zero-size raster means no sticker could be produced.
pub(crate) fn build_sticker<R: TextRenderer + ?Sized>(
    renderer: &R,
    request: &TextRequest<'_>,
    color: Color,
) -> RasterImage {
    let measured = renderer.measure(request);
    let Some((width, height)) = pixel_size(measured) else {
        debug!("sticker: nothing to draw for {:?}", request.font_name);
        return RasterImage::new(0, 0);
    };
    let mut canvas = filled(width, height, Color::TRANSPARENT_WHITE);
    if !renderer.rasterize(request, color, &mut canvas) {
        debug!("sticker: rasterizer failed for {:?}", request.font_name);
        return RasterImage::new(0, 0);
    }
    canvas
}
