//! Font-backed text measurement.
//!
//! Faces are resolved once per font-family string through the system font
//! database and kept for the life of the process.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::default()));

pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = MEASURER.lock().ok()?;
    let face = guard.face(font_family)?;
    face.width(text, font_size)
}

pub fn average_char_width(font_family: &str, font_size: f32) -> Option<f32> {
    if font_size <= 0.0 {
        return None;
    }
    let sample = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let width = measure_text_width(sample, font_size, font_family)?;
    Some(per_char(width, sample))
}

fn per_char(width: f32, sample: &str) -> f32 {
    width / sample.chars().count().max(1) as f32
}

#[derive(Default)]
struct TextMeasurer {
    db: Option<Database>,
    faces: HashMap<String, Option<FaceData>>,
}

impl TextMeasurer {
    fn face(&mut self, font_family: &str) -> Option<&FaceData> {
        let key = font_family.trim().to_string();
        if !self.faces.contains_key(&key) {
            let loaded = self.load(&key);
            if loaded.is_none() {
                log::debug!("no font face for {key:?}; using estimated widths");
            }
            self.faces.insert(key.clone(), loaded);
        }
        self.faces.get(&key).and_then(Option::as_ref)
    }

    fn load(&mut self, font_family: &str) -> Option<FaceData> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names.iter().map(|name| family_for(name)).collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        let db = self.db.get_or_insert_with(|| {
            let mut db = Database::new();
            db.load_system_fonts();
            db
        });
        let id = db.query(&Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        })?;
        db.with_face_data(id, |data, index| FaceData::parse(data.to_vec(), index))
            .flatten()
    }
}

fn family_for(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => Family::SansSerif,
        "monospace" | "ui-monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

struct FaceData {
    bytes: Vec<u8>,
    index: u32,
    units_per_em: f32,
    ascii_advances: [u16; 128],
}

impl FaceData {
    fn parse(bytes: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&bytes, index).ok()?;
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..128 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        let units_per_em = f32::from(face.units_per_em().max(1));
        Some(Self {
            bytes,
            index,
            units_per_em,
            ascii_advances,
        })
    }

    fn width(&self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em;
        let missing = font_size * 0.56;
        let advance = |units: u16| {
            if units == 0 {
                missing
            } else {
                f32::from(units) * scale
            }
        };

        if text.is_ascii() {
            let width = text
                .bytes()
                .filter(|b| *b != b'\n')
                .map(|b| advance(self.ascii_advances[b as usize]))
                .sum::<f32>();
            return Some(width);
        }

        let face = Face::parse(&self.bytes, self.index).ok()?;
        let width = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map_or(missing, |units| advance(units))
            })
            .sum::<f32>();
        Some(width)
    }
}
