use std::collections::HashMap;
use std::sync::Mutex;

use tiny_skia::{FillRule, Paint, PathBuilder, Transform};
use tracing::{debug, trace};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use super::font::{FontSource, LoadedFont};
use super::{TextRenderer, TextRequest};
use crate::color::Color;
use crate::filter::geometry::Size;
use crate::raster::{RasterImage, image_to_pixmap, pixmap_into_image};

/// `TextRenderer` over fontdb-resolved faces: ttf-parser for metrics and
/// outlines, tiny-skia for coverage.
///
/// Resolved faces (and misses) are cached per family name, so measuring and
/// drawing the same request reads the font data once.
pub struct SystemTextRenderer {
    fonts: FontSource,
    resolved: Mutex<HashMap<String, Option<LoadedFont>>>,
}

impl SystemTextRenderer {
    pub fn new(fonts: FontSource) -> Self {
        Self {
            fonts,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    fn resolve(&self, request: &TextRequest<'_>) -> Option<LoadedFont> {
        if !(request.font_size.is_finite() && request.font_size > 0.0) {
            debug!("text: unusable font size {}", request.font_size);
            return None;
        }
        if let Ok(cache) = self.resolved.lock() {
            if let Some(cached) = cache.get(request.font_name) {
                return cached.clone();
            }
        }
        let font = self.fonts.resolve(request.font_name);
        if font.is_none() {
            debug!("text: font not found: {}", request.font_name);
        }
        if let Ok(mut cache) = self.resolved.lock() {
            cache.insert(request.font_name.to_string(), font.clone());
        }
        font
    }

    #[cfg(test)]
    fn cached_families(&self) -> usize {
        self.resolved.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl Default for SystemTextRenderer {
    fn default() -> Self {
        Self::new(FontSource::system())
    }
}

impl TextRenderer for SystemTextRenderer {
    fn measure(&self, request: &TextRequest<'_>) -> Size {
        let Some(font) = self.resolve(request) else {
            return Size::ZERO;
        };
        let Some(face) = font.face() else {
            return Size::ZERO;
        };
        let scale = font.scale(request.font_size);
        let width = advance_units(&face, request.text) as f32 * scale;
        let height = font.line_height_units().max(0) as f32 * scale;
        let size = Size::new(width.ceil(), height.ceil());
        trace!("text: measured {:?} as {:?}", request.text, size);
        size
    }

    fn rasterize(&self, request: &TextRequest<'_>, color: Color, canvas: &mut RasterImage) -> bool {
        let Some(font) = self.resolve(request) else {
            return false;
        };
        let Some(face) = font.face() else {
            return false;
        };
        let Some(mut pixmap) = image_to_pixmap(canvas) else {
            return false;
        };

        let scale = font.scale(request.font_size);
        let mut builder = GlyphPathBuilder {
            builder: PathBuilder::new(),
            origin_x: 0.0,
            baseline: font.ascender() as f32 * scale,
            scale,
        };
        let mut cursor = 0u32;
        for ch in request.text.chars() {
            if ch == '\n' {
                continue;
            }
            let glyph = face.glyph_index(ch).unwrap_or(GlyphId(0));
            builder.origin_x = cursor as f32 * scale;
            face.outline_glyph(glyph, &mut builder);
            cursor = cursor.saturating_add(glyph_advance(&face, glyph) as u32);
        }

        let Some(path) = builder.builder.finish() else {
            // whitespace-only text: nothing to fill
            return true;
        };
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        pixmap_into_image(&pixmap, canvas);
        true
    }
}

fn glyph_advance(face: &Face<'_>, glyph: GlyphId) -> u16 {
    face.glyph_hor_advance(glyph)
        .unwrap_or_else(|| face.units_per_em() / 2)
}

fn advance_units(face: &Face<'_>, text: &str) -> u32 {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(|ch| {
            let glyph = face.glyph_index(ch).unwrap_or(GlyphId(0));
            glyph_advance(face, glyph) as u32
        })
        .fold(0u32, u32::saturating_add)
}

/// Feeds font-unit outlines into a y-down pixel path.
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    baseline: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
