use anyhow::{Context, Result, anyhow};
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod color;
pub mod filter;
pub mod logging;
pub mod raster;
pub mod settings;
pub mod text;

#[cfg(test)]
mod test_util;

pub use color::Color;
pub use filter::TextOverlayFilter;
pub use filter::geometry::{Affine, Placement, Point, Rect, Size};
pub use raster::{ImageCompositor, RasterImage, SkiaCompositor};
pub use text::{FontSource, SystemTextRenderer, TextRenderer, TextRequest};

/// One command-line invocation. `None` fields fall back to settings.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub text: String,
    pub font: Option<String>,
    pub font_path: Option<String>,
    pub font_size: Option<f32>,
    pub color: Option<Color>,
    pub center: Option<Point>,
    pub scale: Option<f32>,
    /// Clockwise rotation around the sticker center, in degrees.
    pub rotation: f32,
    pub crop: Option<Rect>,
    pub settings_path: Option<String>,
}

pub fn run(config: Config) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;

    let input = image::open(&config.input)
        .with_context(|| format!("failed to decode image: {}", config.input.display()))?
        .to_rgba8();
    let (width, height) = input.dimensions();
    info!("input: {} ({}x{})", config.input.display(), width, height);

    let mut fonts = FontSource::system();
    let mut loaded_family = None;
    if let Some(path) = config.font_path.as_ref().or(settings.font_path.as_ref()) {
        let family = fonts.load_font_file(Path::new(path))?;
        info!("font: {} ({})", path, family);
        loaded_family = Some(family);
    }
    let renderer = SystemTextRenderer::new(fonts);

    let filter = build_filter(&config, &settings, loaded_family.as_deref(), input);
    let output = filter
        .output_image(&renderer, &SkiaCompositor)
        .ok_or_else(|| anyhow!("text overlay produced no image (check --crop)"))?;
    if !filter.text.is_empty() && filter.input_image.as_ref() == Some(&output) {
        warn!(
            "text overlay left the image unchanged (font '{}' unavailable or text too large)",
            filter.font_name
        );
    }

    save_image(output, &config.output)?;
    Ok(format!(
        "wrote {} ({}x{})",
        config.output.display(),
        width,
        height
    ))
}

/// `--font` wins, then the family of a registered font file, then settings.
fn build_filter(
    config: &Config,
    settings: &settings::Settings,
    loaded_family: Option<&str>,
    input: RasterImage,
) -> TextOverlayFilter {
    let font_name = config
        .font
        .clone()
        .or_else(|| loaded_family.map(str::to_string))
        .unwrap_or_else(|| settings.font_family.clone());
    TextOverlayFilter {
        input_image: Some(input),
        text: config.text.clone(),
        font_name,
        initial_font_size: config.font_size.unwrap_or(settings.font_size),
        color: config.color.unwrap_or(settings.color),
        crop_rect: config.crop.unwrap_or(Rect::UNIT),
        center: config.center.unwrap_or(settings.center),
        scale: config.scale.unwrap_or(settings.scale),
        transform: Affine::rotate(config.rotation.to_radians()),
    }
}

fn save_image(image: RasterImage, path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("unsupported output image format: {}", path.display()))?;
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image).to_rgb8()),
        _ => DynamicImage::ImageRgba8(image),
    };
    image
        .save_with_format(path, format)
        .with_context(|| format!("failed to write image: {}", path.display()))
}
