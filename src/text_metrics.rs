use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

const FALLBACK_ADVANCE: f32 = 0.56;
const FALLBACK_LINE_HEIGHT: f32 = 1.2;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TextMetrics {
    pub width: f32,
    pub height: f32,
}

/// Font metric queries needed to place text.
pub trait TextMeasure {
    fn measure_text(&self, text: &str, font_size: f32) -> TextMetrics;
}

/// Measures with the first installed font matching a CSS-like family list.
/// Falls back to [`EstimatedMetrics`] when no font can be loaded.
#[derive(Debug, Clone)]
pub struct SystemFontMetrics {
    font_family: String,
}

impl SystemFontMetrics {
    pub fn new(font_family: impl Into<String>) -> Self {
        Self {
            font_family: font_family.into(),
        }
    }
}

impl TextMeasure for SystemFontMetrics {
    fn measure_text(&self, text: &str, font_size: f32) -> TextMetrics {
        if text.is_empty() || font_size <= 0.0 {
            return TextMetrics {
                width: 0.0,
                height: 0.0,
            };
        }
        let measured = TEXT_MEASURER
            .lock()
            .ok()
            .and_then(|mut guard| guard.measure(text, font_size, &self.font_family));
        measured.unwrap_or_else(|| EstimatedMetrics.measure_text(text, font_size))
    }
}

/// Font-independent estimate: a fixed advance per character.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMetrics;

impl TextMeasure for EstimatedMetrics {
    fn measure_text(&self, text: &str, font_size: f32) -> TextMetrics {
        let chars = text.chars().filter(|ch| *ch != '\n').count() as f32;
        TextMetrics {
            width: chars * font_size * FALLBACK_ADVANCE,
            height: font_size * FALLBACK_LINE_HEIGHT,
        }
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

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<TextMetrics> {
        let family_key = normalize_family_key(font_family);
        if !self.cache.contains_key(&family_key) {
            let face = self.load_face(font_family);
            self.cache.insert(family_key.clone(), face);
        }
        let face = self.cache.get(&family_key)?.as_ref()?;
        let normalized = text.replace('\t', "    ");
        Some(face.measure(&normalized, font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let mut names: Vec<String> = Vec::new();
        let mut generics: Vec<(usize, Family<'static>)> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            let generic = match raw.to_ascii_lowercase().as_str() {
                "serif" => Some(Family::Serif),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Some(Family::SansSerif)
                }
                "monospace" | "ui-monospace" => Some(Family::Monospace),
                _ => None,
            };
            match generic {
                Some(family) => generics.push((names.len() + generics.len(), family)),
                None => names.push(raw.to_string()),
            }
        }

        let mut families: Vec<Family<'_>> =
            names.iter().map(|name| Family::Name(name.as_str())).collect();
        for (position, family) in generics {
            families.insert(position.min(families.len()), family);
        }
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

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
            .with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
            .flatten()
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    line_height: f32,
    ascii_advances: [u16; 128],
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = f32::from(face.units_per_em().max(1));
        let line_height = f32::from(face.ascender()) - f32::from(face.descender());
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            line_height,
            ascii_advances,
        })
    }

    fn measure(&self, text: &str, font_size: f32) -> TextMetrics {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * FALLBACK_ADVANCE;
        let height = if self.line_height > 0.0 {
            self.line_height * scale
        } else {
            font_size * FALLBACK_LINE_HEIGHT
        };

        let advance_units = |advance: u16| {
            if advance == 0 {
                fallback
            } else {
                f32::from(advance) * scale
            }
        };

        let width: f32 = if text.is_ascii() {
            text.bytes()
                .filter(|byte| *byte != b'\n')
                .map(|byte| advance_units(self.ascii_advances[byte as usize]))
                .sum()
        } else {
            let face = Face::parse(&self.data, self.index).ok();
            text.chars()
                .filter(|ch| *ch != '\n')
                .map(|ch| {
                    face.as_ref()
                        .and_then(|face| face.glyph_index(ch))
                        .and_then(|glyph| face.as_ref()?.glyph_hor_advance(glyph))
                        .map_or(fallback, |advance| advance_units(advance))
                })
                .sum()
        };

        TextMetrics {
            width: f32::max(width, 0.0),
            height,
        }
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
