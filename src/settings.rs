use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::color::Color;
use crate::filter::geometry::Point;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");
const BASE_DIR_ENV: &str = "TEXT_OVERLAY_RUST_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub font_family: String,
    pub font_path: Option<String>,
    pub font_size: f32,
    pub color: Color,
    pub scale: f32,
    pub center: Point,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_path: None,
            font_size: 0.1,
            color: Color::WHITE,
            scale: 0.2,
            center: Point::new(0.5, 0.5),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    text: Option<TextSettings>,
    placement: Option<PlacementSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct TextSettings {
    font_family: Option<String>,
    font_path: Option<String>,
    font_size: Option<f32>,
    color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PlacementSettings {
    scale: Option<f32>,
    center: Option<[f32; 2]>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings
                .merge(parsed)
                .with_context(|| format!("invalid settings: {}", path.display()))?;
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) -> Result<()> {
        if let Some(text) = incoming.text {
            if let Some(family) = text.font_family {
                if !family.trim().is_empty() {
                    self.font_family = family;
                }
            }
            if let Some(path) = text.font_path {
                if !path.trim().is_empty() {
                    self.font_path = Some(path);
                }
            }
            if let Some(size) = text.font_size {
                if size > 0.0 {
                    self.font_size = size;
                }
            }
            if let Some(color) = text.color {
                if !color.trim().is_empty() {
                    self.color = Color::parse(&color)?;
                }
            }
        }
        if let Some(placement) = incoming.placement {
            if let Some(scale) = placement.scale {
                if scale > 0.0 {
                    self.scale = scale;
                }
            }
            if let Some([x, y]) = placement.center {
                self.center = Point::new(x, y);
            }
        }
        Ok(())
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(BASE_DIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".text-overlay-rust"))
        }
    })
}
