use crate::error::{Error, Result};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use ttf_parser::Face;

/// Measures the rendered width of a single line of text.
pub trait TextMeasure {
    /// Advance width of `text` at `font_size` user units, in user units.
    fn measure_width(&self, text: &str, font_family: &str, font_size: f32) -> Result<f32>;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure_width(&self, text: &str, font_family: &str, font_size: f32) -> Result<f32> {
        (**self).measure_width(text, font_family, font_size)
    }
}

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Fonts installed on the host, looked up by CSS family list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFonts;

impl TextMeasure for SystemFonts {
    fn measure_width(&self, text: &str, font_family: &str, font_size: f32) -> Result<f32> {
        if text.is_empty() || font_size <= 0.0 {
            return Ok(0.0);
        }
        let unresolved = || Error::FontResolution {
            family: font_family.to_string(),
        };
        let mut guard = TEXT_MEASURER.lock().map_err(|_| unresolved())?;
        guard
            .measure(text, font_size, font_family)
            .ok_or_else(unresolved)
    }
}

/// A single font file, used for every family name.
#[derive(Debug, Clone)]
pub struct FontFile {
    name: String,
    face: FontFace,
}

impl FontFile {
    pub fn open(path: &Path) -> Result<Self> {
        let name = path.display().to_string();
        let bytes = std::fs::read(path)?;
        Self::from_bytes(name, bytes, 0)
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>, index: u32) -> Result<Self> {
        let name = name.into();
        let face = FontFace::new(bytes, index).ok_or_else(|| Error::FontResolution {
            family: name.clone(),
        })?;
        Ok(Self { name, face })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TextMeasure for FontFile {
    fn measure_width(&self, text: &str, _font_family: &str, font_size: f32) -> Result<f32> {
        if text.is_empty() || font_size <= 0.0 {
            return Ok(0.0);
        }
        Ok(self.face.measure_width(text, font_size))
    }
}

/// Font-free estimate: every glyph advances `em_factor` times the font size,
/// with narrow punctuation and spaces at roughly half that.
#[derive(Debug, Clone, Copy)]
pub struct FallbackMetrics {
    pub em_factor: f32,
}

impl Default for FallbackMetrics {
    fn default() -> Self {
        Self { em_factor: 0.56 }
    }
}

impl TextMeasure for FallbackMetrics {
    fn measure_width(&self, text: &str, _font_family: &str, font_size: f32) -> Result<f32> {
        let width = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| match ch {
                ' ' | '.' | ',' | ':' | ';' | '|' | '!' | 'i' | 'l' | 'I' => 0.5,
                'M' | 'W' | 'm' | 'w' => 1.5,
                _ => 1.0,
            })
            .sum::<f32>();
        Ok(width * self.em_factor * font_size.max(0.0))
    }
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let family_key = normalize_family_key(font_family);
        if !self.cache.contains_key(&family_key) {
            let face = self.load_face(font_family);
            if face.is_none() {
                tracing::debug!(family = %family_key, "no installed font matches");
            }
            self.cache.insert(family_key.clone(), face);
        }
        let face = self.cache.get(&family_key)?.as_ref()?;
        Some(face.measure_width(text, font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let mut names: Vec<String> = Vec::new();
        let mut generics: Vec<Option<Family<'static>>> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => generics.push(Some(Family::Serif)),
                "sans-serif" | "system-ui" => generics.push(Some(Family::SansSerif)),
                "monospace" => generics.push(Some(Family::Monospace)),
                _ => {
                    names.push(raw.to_string());
                    generics.push(None);
                }
            }
        }
        if generics.is_empty() {
            generics.push(Some(Family::SansSerif));
        }

        let mut named = names.iter();
        let families: Vec<Family<'_>> = generics
            .iter()
            .filter_map(|generic| match generic {
                Some(family) => Some(*family),
                None => named.next().map(|name| Family::Name(name.as_str())),
            })
            .collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::new(data.to_vec(), index))
            .flatten()
    }
}

/// Parsed font bytes plus a per-glyph advance cache for ASCII.
#[derive(Clone)]
struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes", &self.data.len())
            .field("index", &self.index)
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
        })
    }

    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;

        if text.is_ascii() {
            let width: f32 = text
                .bytes()
                .filter(|byte| *byte != b'\n')
                .map(|byte| match self.ascii_advances[byte as usize] {
                    0 => fallback,
                    advance => advance as f32 * scale,
                })
                .sum();
            return width.max(0.0);
        }

        let Ok(face) = Face::parse(&self.data, self.index) else {
            return text.chars().count() as f32 * fallback;
        };
        let width: f32 = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(|advance| advance as f32 * scale)
                    .unwrap_or(fallback)
            })
            .sum();
        width.max(0.0)
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_width_scales_with_font_size() {
        let metrics = FallbackMetrics::default();
        let w4 = metrics.measure_width("Grid 1", "Arial", 4.0).unwrap();
        let w8 = metrics.measure_width("Grid 1", "Arial", 8.0).unwrap();
        assert!(w4 > 0.0);
        assert!((w8 - w4 * 2.0).abs() < 1e-4);
    }

    #[test]
    fn fallback_width_of_empty_text_is_zero() {
        let metrics = FallbackMetrics::default();
        assert_eq!(metrics.measure_width("", "Arial", 4.0).unwrap(), 0.0);
    }

    #[test]
    fn narrow_glyphs_measure_narrower() {
        let metrics = FallbackMetrics::default();
        let narrow = metrics.measure_width("iii", "Arial", 4.0).unwrap();
        let wide = metrics.measure_width("MMM", "Arial", 4.0).unwrap();
        assert!(narrow < wide);
    }

    #[test]
    fn garbage_font_bytes_fail_to_resolve() {
        let err = FontFile::from_bytes("broken.ttf", vec![0, 1, 2, 3], 0).unwrap_err();
        assert!(matches!(err, Error::FontResolution { ref family } if family == "broken.ttf"));
    }

    #[test]
    fn missing_font_file_is_an_io_error() {
        let err = FontFile::open(Path::new("/definitely/not/here.ttf")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn family_key_defaults_to_sans_serif() {
        assert_eq!(normalize_family_key("  "), "sans-serif");
        assert_eq!(normalize_family_key(" Arial "), "Arial");
    }
}
