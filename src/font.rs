//! Glyph sources for the character row.
//!
//! Text is turned into SVG path data here rather than left to the
//! rasterizer, so the ink box used for centering and the drawn outlines come
//! from the same face.

use crate::config::FontConfig;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use std::fmt::Write as _;
use tracing::{debug, warn};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// Ink extent of a run of text, relative to its anchor point at the left
/// edge of the ascender line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBox {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

pub enum LabelFont {
    Outline(OutlineFont),
    Bitmap,
}

impl LabelFont {
    /// Resolves the configured face. Never fails: anything that cannot be
    /// loaded falls back to the built-in bitmap font.
    pub fn load(config: &FontConfig) -> Self {
        match OutlineFont::load(config) {
            Some(font) => LabelFont::Outline(font),
            None => {
                warn!(family = %config.family, "bold face not available, using built-in bitmap font");
                LabelFont::Bitmap
            }
        }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, LabelFont::Bitmap)
    }

    pub fn measure(&self, text: &str, size: u32) -> TextBox {
        match self {
            LabelFont::Outline(font) => font.measure(text, size as f32),
            LabelFont::Bitmap => bitmap::measure(text, size),
        }
    }

    /// Path data for `text` with its anchor at `(x, y)`.
    pub fn path_data(&self, text: &str, size: u32, x: i32, y: i32) -> String {
        match self {
            LabelFont::Outline(font) => font.path_data(text, size as f32, x as f32, y as f32),
            LabelFont::Bitmap => bitmap::path_data(text, size, x, y),
        }
    }
}

pub struct OutlineFont {
    data: Vec<u8>,
    index: u32,
}

impl OutlineFont {
    fn load(config: &FontConfig) -> Option<Self> {
        let mut db = Database::new();

        if let Some(path) = &config.file {
            match db.load_font_file(path) {
                Ok(()) => {
                    if let Some(font) = db.faces().next().and_then(|face| Self::from_db(&db, face.id)) {
                        debug!(path = %path.display(), "loaded label font file");
                        return Some(font);
                    }
                    warn!(path = %path.display(), "font file holds no usable face");
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to read font file");
                }
            }
        }

        db.load_system_fonts();
        let id = Self::find_bold(&db, &config.family)?;
        let font = Self::from_db(&db, id)?;
        debug!(family = %config.family, "loaded label font from system fonts");
        Some(font)
    }

    /// The query answers with the nearest weight, so a family with only a
    /// regular face is treated as missing.
    fn find_bold(db: &Database, family: &str) -> Option<fontdb::ID> {
        let families = [Family::Name(family)];
        let query = Query {
            families: &families,
            weight: Weight::BOLD,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = db.query(&query)?;
        let weight = db.face(id)?.weight;
        if weight < Weight::SEMIBOLD {
            debug!(family, weight = weight.0, "closest face is not bold");
            return None;
        }
        Some(id)
    }

    fn from_db(db: &Database, id: fontdb::ID) -> Option<Self> {
        let font = db.with_face_data(id, |data, index| Self {
            data: data.to_vec(),
            index,
        })?;
        if font.face().is_some() {
            Some(font)
        } else {
            None
        }
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.index).ok()
    }

    /// Glyph ids and pen positions in font units, no kerning.
    fn glyphs(face: &Face<'_>, text: &str) -> Vec<(GlyphId, f32)> {
        let mut pen = 0.0f32;
        let mut glyphs = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let glyph = face.glyph_index(ch).unwrap_or(GlyphId(0));
            glyphs.push((glyph, pen));
            pen += face.glyph_hor_advance(glyph).unwrap_or(0) as f32;
        }
        glyphs
    }

    fn measure(&self, text: &str, size: f32) -> TextBox {
        let Some(face) = self.face() else {
            return TextBox::default();
        };
        let scale = size / face.units_per_em().max(1) as f32;
        let ascender = face.ascender() as f32;

        let mut ink: Option<(f32, f32, f32, f32)> = None;
        for (glyph, pen) in Self::glyphs(&face, text) {
            let Some(rect) = face.glyph_bounding_box(glyph) else {
                continue;
            };
            let left = pen + rect.x_min as f32;
            let right = pen + rect.x_max as f32;
            let top = ascender - rect.y_max as f32;
            let bottom = ascender - rect.y_min as f32;
            ink = Some(match ink {
                None => (left, top, right, bottom),
                Some((l, t, r, b)) => (l.min(left), t.min(top), r.max(right), b.max(bottom)),
            });
        }

        let Some((left, top, right, bottom)) = ink else {
            return TextBox::default();
        };
        TextBox {
            left: (left * scale).floor() as i32,
            top: (top * scale).floor() as i32,
            right: (right * scale).ceil() as i32,
            bottom: (bottom * scale).ceil() as i32,
        }
    }

    fn path_data(&self, text: &str, size: f32, x: f32, y: f32) -> String {
        let Some(face) = self.face() else {
            return String::new();
        };
        let scale = size / face.units_per_em().max(1) as f32;
        let mut builder = SvgPathBuilder {
            d: String::new(),
            origin_x: x,
            baseline: y + face.ascender() as f32 * scale,
            pen: 0.0,
            scale,
        };
        for (glyph, pen) in Self::glyphs(&face, text) {
            builder.pen = pen;
            face.outline_glyph(glyph, &mut builder);
        }
        builder.d
    }
}

struct SvgPathBuilder {
    d: String,
    origin_x: f32,
    baseline: f32,
    pen: f32,
    scale: f32,
}

impl SvgPathBuilder {
    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.origin_x + (self.pen + x) * self.scale,
            self.baseline - y * self.scale,
        )
    }
}

impl OutlineBuilder for SvgPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        let _ = write!(self.d, "M{x:.2} {y:.2}");
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        let _ = write!(self.d, "L{x:.2} {y:.2}");
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        let _ = write!(self.d, "Q{x1:.2} {y1:.2} {x:.2} {y:.2}");
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        let _ = write!(self.d, "C{x1:.2} {y1:.2} {x2:.2} {y2:.2} {x:.2} {y:.2}");
    }

    fn close(&mut self) {
        self.d.push('Z');
    }
}

/// 5x7 dot-matrix digits and capitals. Lowercase input is drawn with the
/// capital glyphs.
mod bitmap {
    use super::TextBox;
    use std::fmt::Write as _;

    const GLYPH_WIDTH: i32 = 5;
    const ADVANCE: i32 = 6;
    /// Rows of the em box: one blank row above the glyph, seven glyph rows,
    /// two descender rows.
    const EM_ROWS: u32 = 10;
    const TOP_ROW: i32 = 1;
    const GLYPH_ROWS: i32 = 7;

    const GLYPHS: [(char, [u8; 7]); 36] = [
        ('0', [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E]),
        ('1', [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E]),
        ('2', [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F]),
        ('3', [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E]),
        ('4', [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02]),
        ('5', [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E]),
        ('6', [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E]),
        ('7', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
        ('8', [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E]),
        ('9', [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C]),
        ('A', [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11]),
        ('B', [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E]),
        ('C', [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E]),
        ('D', [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C]),
        ('E', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F]),
        ('F', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10]),
        ('G', [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F]),
        ('H', [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
        ('I', [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E]),
        ('J', [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C]),
        ('K', [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11]),
        ('L', [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F]),
        ('M', [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11]),
        ('N', [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11]),
        ('O', [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
        ('P', [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10]),
        ('Q', [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D]),
        ('R', [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11]),
        ('S', [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E]),
        ('T', [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
        ('U', [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
        ('V', [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04]),
        ('W', [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A]),
        ('X', [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11]),
        ('Y', [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04]),
        ('Z', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F]),
    ];

    fn glyph(ch: char) -> Option<&'static [u8; 7]> {
        let ch = ch.to_ascii_uppercase();
        GLYPHS.iter().find(|(key, _)| *key == ch).map(|(_, rows)| rows)
    }

    /// Size of one dot in pixels for a font of `size` pixels.
    pub(super) fn dot(size: u32) -> i32 {
        (size / EM_ROWS).max(1) as i32
    }

    pub(super) fn measure(text: &str, size: u32) -> TextBox {
        let count = text.chars().count() as i32;
        if count == 0 {
            return TextBox::default();
        }
        let dot = dot(size);
        TextBox {
            left: 0,
            top: TOP_ROW * dot,
            right: ((count - 1) * ADVANCE + GLYPH_WIDTH) * dot,
            bottom: (TOP_ROW + GLYPH_ROWS) * dot,
        }
    }

    /// One rectangle per horizontal run of dots.
    pub(super) fn path_data(text: &str, size: u32, x: i32, y: i32) -> String {
        let dot = dot(size);
        let mut d = String::new();
        for (idx, ch) in text.chars().enumerate() {
            let Some(rows) = glyph(ch) else {
                continue;
            };
            let glyph_x = x + idx as i32 * ADVANCE * dot;
            for (row, bits) in rows.iter().enumerate() {
                let top = y + (TOP_ROW + row as i32) * dot;
                let mut col = 0;
                while col < GLYPH_WIDTH {
                    if bits & (0x10 >> col) == 0 {
                        col += 1;
                        continue;
                    }
                    let start = col;
                    while col < GLYPH_WIDTH && bits & (0x10 >> col) != 0 {
                        col += 1;
                    }
                    let left = glyph_x + start * dot;
                    let run = (col - start) * dot;
                    let _ = write!(d, "M{left} {top}h{run}v{dot}h-{run}Z");
                }
            }
        }
        d
    }
}
