use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::sync::Arc;
use ttf_parser::Face;
use usvg::fontdb;

/// Parsed face data plus the vertical metrics the renderer needs.
#[derive(Clone)]
pub struct LoadedFont {
    data: Arc<Vec<u8>>,
    face_index: u32,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    line_gap: i16,
}

impl LoadedFont {
    pub fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.face_index).ok()
    }

    /// Pixels per font unit at `font_size`.
    pub fn scale(&self, font_size: f32) -> f32 {
        font_size / self.units_per_em.max(1) as f32
    }

    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    /// Height of one line in font units.
    pub fn line_height_units(&self) -> i32 {
        self.ascender as i32 - self.descender as i32 + self.line_gap as i32
    }

    fn from_face(data: Arc<Vec<u8>>, face_index: u32) -> Option<LoadedFont> {
        let face = Face::parse(&data, face_index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let (ascender, descender, line_gap) = (face.ascender(), face.descender(), face.line_gap());
        Some(LoadedFont {
            data,
            face_index,
            units_per_em,
            ascender,
            descender,
            line_gap,
        })
    }
}

/// Font lookup by family name over system fonts plus any loaded files.
pub struct FontSource {
    db: fontdb::Database,
}

impl FontSource {
    /// A source with no fonts at all; every lookup fails.
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
        }
    }

    /// Installed system fonts, with the generic families pointed at the
    /// first installed platform candidate.
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let mut source = Self { db };
        source.configure_generic_families();
        source
    }

    /// Registers a font file and returns the family name of its first face,
    /// as the database will match it in `resolve`.
    pub fn load_font_file(&mut self, path: &Path) -> Result<String> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read font: {}", path.display()))?;
        let before = self.db.len();
        self.db.load_font_data(data);
        self.db
            .faces()
            .skip(before)
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
            .ok_or_else(|| anyhow!("failed to parse font: {}", path.display()))
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    fn has_family(&self, name: &str) -> bool {
        let families = [fontdb::Family::Name(name)];
        let query = fontdb::Query {
            families: &families,
            ..Default::default()
        };
        self.db.query(&query).is_some()
    }

    fn first_installed(&self, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .find(|name| self.has_family(name))
            .map(|name| name.to_string())
    }

    fn configure_generic_families(&mut self) {
        if let Some(name) = self.first_installed(sans_serif_candidates()) {
            self.db.set_sans_serif_family(name);
        }
        if let Some(name) = self.first_installed(serif_candidates()) {
            self.db.set_serif_family(name);
        }
        if let Some(name) = self.first_installed(monospace_candidates()) {
            self.db.set_monospace_family(name);
        }
    }

    /// Resolves a family name; generic CSS families map to fontdb generics.
    pub fn resolve(&self, family: &str) -> Option<LoadedFont> {
        let name = family.trim();
        if name.is_empty() {
            return None;
        }
        let families = [generic_family(name).unwrap_or(fontdb::Family::Name(name))];
        let query = fontdb::Query {
            families: &families,
            ..Default::default()
        };
        let id = self.db.query(&query)?;
        let (data, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))?;
        LoadedFont::from_face(Arc::new(data), index)
    }
}

impl Default for FontSource {
    fn default() -> Self {
        Self::system()
    }
}

fn generic_family(name: &str) -> Option<fontdb::Family<'static>> {
    if name.eq_ignore_ascii_case("sans-serif") {
        Some(fontdb::Family::SansSerif)
    } else if name.eq_ignore_ascii_case("serif") {
        Some(fontdb::Family::Serif)
    } else if name.eq_ignore_ascii_case("monospace") {
        Some(fontdb::Family::Monospace)
    } else {
        None
    }
}

#[cfg(target_os = "macos")]
fn sans_serif_candidates() -> &'static [&'static str] {
    &["Helvetica Neue", "Helvetica", "Arial"]
}

#[cfg(target_os = "windows")]
fn sans_serif_candidates() -> &'static [&'static str] {
    &["Arial", "Segoe UI"]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn sans_serif_candidates() -> &'static [&'static str] {
    &["DejaVu Sans", "Liberation Sans", "Noto Sans", "Arial"]
}

fn serif_candidates() -> &'static [&'static str] {
    &["Times New Roman", "Times", "DejaVu Serif", "Liberation Serif", "Noto Serif"]
}

fn monospace_candidates() -> &'static [&'static str] {
    &["Menlo", "Consolas", "DejaVu Sans Mono", "Liberation Mono", "Noto Sans Mono", "Courier New"]
}
