mod font;
mod render;

pub use font::{FontSource, LoadedFont};
pub use render::SystemTextRenderer;

use crate::color::Color;
use crate::filter::geometry::Size;
use crate::raster::RasterImage;

/// One line of text to measure or draw. Lines are clipped, never wrapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRequest<'a> {
    pub text: &'a str,
    pub font_name: &'a str,
    /// Font size in pixels.
    pub font_size: f32,
}

/// Text measurement and rasterization by font family name.
pub trait TextRenderer {
    /// Pixel bounding box of the rendered text; zero when the font cannot be
    /// resolved.
    fn measure(&self, request: &TextRequest<'_>) -> Size;

    /// Draws the text left-aligned with its line box anchored at the canvas
    /// origin. Returns `false` when the font cannot be resolved.
    fn rasterize(&self, request: &TextRequest<'_>, color: Color, canvas: &mut RasterImage) -> bool;
}
