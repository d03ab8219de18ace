mod composite;
pub mod geometry;
mod sticker;

use tracing::{debug, error};

use crate::color::Color;
use crate::raster::{ImageCompositor, RasterImage};
use crate::text::{TextRenderer, TextRequest};
use geometry::{Affine, Placement, Point, Rect, Size};

/// Renders a text sticker over an image.
///
/// Placement fields are normalized against the uncropped original image;
/// `crop_rect` says which part of that original `input_image` holds.
/// `Clone` yields a fully independent copy.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlayFilter {
    pub input_image: Option<RasterImage>,
    /// Empty text makes the filter a passthrough.
    pub text: String,
    pub font_name: String,
    /// Font size as a fraction of the original image height.
    pub initial_font_size: f32,
    pub color: Color,
    pub crop_rect: Rect,
    /// Sticker center, normalized to the original image.
    pub center: Point,
    /// Sticker width as a fraction of the original image's shorter side.
    pub scale: f32,
    /// Applied around the sticker center after it is moved into place.
    pub transform: Affine,
}

impl Default for TextOverlayFilter {
    fn default() -> Self {
        Self {
            input_image: None,
            text: String::new(),
            font_name: "sans-serif".to_string(),
            initial_font_size: 1.0,
            color: Color::WHITE,
            crop_rect: Rect::UNIT,
            center: Point::ZERO,
            scale: 1.0,
            transform: Affine::IDENTITY,
        }
    }
}

impl TextOverlayFilter {
    pub fn new(input_image: RasterImage) -> Self {
        Self {
            input_image: Some(input_image),
            ..Self::default()
        }
    }

    pub fn original_size(&self) -> Option<Size> {
        let image = self.input_image.as_ref()?;
        let image_size = Size::from_pixels(image.width(), image.height());
        Some(geometry::original_size(image_size, &self.crop_rect))
    }

    pub fn font_pixel_size(&self) -> Option<f32> {
        Some(self.initial_font_size * self.original_size()?.height)
    }

    fn text_request(&self) -> Option<TextRequest<'_>> {
        Some(TextRequest {
            text: &self.text,
            font_name: &self.font_name,
            font_size: self.font_pixel_size()?,
        })
    }

    /// Pixel size of the rendered text; zero without an input image or when
    /// the font cannot be resolved.
    pub fn text_image_size<R: TextRenderer + ?Sized>(&self, renderer: &R) -> Size {
        match self.text_request() {
            Some(request) => renderer.measure(&request),
            None => Size::ZERO,
        }
    }

    /// The text rasterized onto a transparent canvas of `text_image_size`.
    /// Zero-sized when nothing could be rendered.
    pub fn sticker<R: TextRenderer + ?Sized>(&self, renderer: &R) -> RasterImage {
        match self.text_request() {
            Some(request) => sticker::build_sticker(renderer, &request, self.color),
            None => RasterImage::new(0, 0),
        }
    }

    pub fn absolute_sticker_size(&self, original_size: Size, sticker_size: Size) -> Size {
        geometry::absolute_sticker_size(original_size, self.scale, sticker_size)
    }

    /// Absolute placement for a sticker raster of `sticker_size` pixels.
    pub fn placement(&self, sticker_size: Size) -> Option<Placement> {
        let image = self.input_image.as_ref()?;
        Some(geometry::resolve_placement(
            Size::from_pixels(image.width(), image.height()),
            &self.crop_rect,
            self.center,
            self.scale,
            sticker_size,
        ))
    }

    /// Runs measure, build, resolve and composite.
    ///
    /// `None` without an input image or with a degenerate `crop_rect`.
    /// Empty text, an unresolvable font, or a failing compositor return the
    /// input unchanged.
    pub fn output_image<R, C>(&self, renderer: &R, compositor: &C) -> Option<RasterImage>
    where
        R: TextRenderer + ?Sized,
        C: ImageCompositor + ?Sized,
    {
        let input = self.input_image.as_ref()?;
        if self.text.is_empty() {
            return Some(input.clone());
        }
        if !self.crop_rect.is_valid_crop() {
            error!("filter: degenerate crop rect {:?}", self.crop_rect);
            return None;
        }

        let sticker = self.sticker(renderer);
        if sticker.width() == 0 || sticker.height() == 0 {
            debug!("filter: no sticker for font {:?}; passing input through", self.font_name);
            return Some(input.clone());
        }

        let sticker_size = Size::from_pixels(sticker.width(), sticker.height());
        let placement = self.placement(sticker_size)?;
        debug!(
            "filter: sticker {}x{} placed at {:?} size {:?}",
            sticker.width(),
            sticker.height(),
            placement.center,
            placement.size
        );
        Some(composite::composite(
            compositor,
            input,
            &sticker,
            &placement,
            &self.transform,
        ))
    }
}
