use crate::color::Color;
use crate::filter::geometry::Size;
use crate::raster::RasterImage;
use crate::text::{TextRenderer, TextRequest};

pub(crate) fn with_temp_home<F, R>(func: F) -> R
where
    F: FnOnce(&std::path::Path) -> R,
{
    static HOME_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let _guard = HOME_MUTEX.lock().unwrap_or_else(|err| err.into_inner());
    let dir = tempfile::tempdir().expect("tempdir");
    let old_home = std::env::var("HOME").ok();
    // SAFETY: HOME is only touched by tests holding HOME_MUTEX.
    unsafe { std::env::set_var("HOME", dir.path()) };
    let result = func(dir.path());
    match old_home {
        Some(old) => unsafe { std::env::set_var("HOME", old) },
        None => unsafe { std::env::remove_var("HOME") },
    }
    result
}

/// Renders every glyph as a solid block half an em wide and one em tall.
/// The font named `"missing"` never resolves.
pub(crate) struct BlockTextRenderer;

impl TextRenderer for BlockTextRenderer {
    fn measure(&self, request: &TextRequest<'_>) -> Size {
        if request.font_name == "missing" {
            return Size::ZERO;
        }
        let glyphs = request.text.chars().filter(|ch| *ch != '\n').count() as f32;
        Size::new(glyphs * request.font_size * 0.5, request.font_size)
    }

    fn rasterize(&self, request: &TextRequest<'_>, color: Color, canvas: &mut RasterImage) -> bool {
        if request.font_name == "missing" {
            return false;
        }
        for pixel in canvas.pixels_mut() {
            *pixel = color.to_rgba();
        }
        true
    }
}
