use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use text_overlay_rust::{Color, Config, Point, Rect};

#[derive(Parser, Debug)]
#[command(
    name = "text-overlay-rust",
    version,
    about = "Render a text sticker onto an image"
)]
struct Cli {
    /// Source image
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output image (format inferred from the extension)
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Text to render; empty text copies the input unchanged
    #[arg(short = 't', long = "text", default_value = "")]
    text: String,

    /// Font family name (e.g. "DejaVu Sans", sans-serif)
    #[arg(short = 'f', long = "font")]
    font: Option<String>,

    /// Register a font file and use its family unless --font is given
    #[arg(long = "font-path")]
    font_path: Option<String>,

    /// Font size as a fraction of the uncropped image height
    #[arg(long = "font-size")]
    font_size: Option<f32>,

    /// Text color (#rgb, #rgba, #rrggbb, #rrggbbaa)
    #[arg(short = 'c', long = "color")]
    color: Option<Color>,

    /// Normalized sticker center on the uncropped image, as x,y
    #[arg(long = "center", allow_hyphen_values = true)]
    center: Option<Point>,

    /// Sticker width as a fraction of the image's shorter side
    #[arg(short = 's', long = "scale")]
    scale: Option<f32>,

    /// Clockwise rotation around the sticker center, in degrees
    #[arg(long = "rotation", default_value_t = 0.0, allow_hyphen_values = true)]
    rotation: f32,

    /// Normalized region of the original image the input holds, as x,y,w,h
    #[arg(long = "crop")]
    crop: Option<Rect>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    text_overlay_rust::logging::init(cli.verbose)?;

    let config = Config {
        input: cli.input,
        output: cli.output,
        text: cli.text,
        font: cli.font,
        font_path: cli.font_path,
        font_size: cli.font_size,
        color: cli.color,
        center: cli.center,
        scale: cli.scale,
        rotation: cli.rotation,
        crop: cli.crop,
        settings_path: cli.read_settings,
    };
    let message = text_overlay_rust::run(config)?;
    println!("{}", message);
    Ok(())
}
