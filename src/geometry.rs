//! Pixel layout of a label.
//!
//! Every physical length goes through [`mm_to_px`], which shrinks it by 5 %.

use crate::code::Code;
use crate::config::LabelConfig;
use crate::error::{LabelError, Result};
use crate::palette::{Palette, Rgb};

const MM_PER_INCH: f64 = 25.4;
const PRINT_SCALE: f64 = 0.95;

const TEXT_BAND_RATIO: f64 = 0.3;
const MAIN_FONT_RATIO: f64 = 0.9;
const SMALL_FONT_RATIO: f64 = 0.7;
const MAIN_TEXT_LIFT: i32 = 6;
const SMALL_TEXT_LIFT: i32 = 5;

/// Largest canvas side in pixels. A row of RGBA bytes must stay within
/// `i32`, which also keeps every drawing coordinate in range.
pub const MAX_SIDE_PX: u32 = i32::MAX as u32 / 4;

/// Millimeters to pixels at `dpi`, scaled by 0.95 and rounded half to even.
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    let px = (mm / MM_PER_INCH * dpi as f64 * PRINT_SCALE).round_ties_even();
    px.max(0.0) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelGeometry {
    pub width: u32,
    pub height: u32,
    /// Left and right margin around the cell row and the barcode.
    pub margin: u32,
    pub core_width: u32,
    pub corner_radius: u32,
    pub border: u32,
    pub text_band_height: u32,
    pub barcode_band_height: u32,
    pub cell_count: usize,
    pub cell_width: u32,
}

/// One box of the character row.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub x: u32,
    pub width: u32,
    pub text: String,
    pub fill: Rgb,
    pub font_size: u32,
    /// Upward nudge applied after vertical centering.
    pub lift: i32,
}

impl LabelGeometry {
    pub fn compute(code: &Code, config: &LabelConfig) -> Result<Self> {
        config.validate()?;
        let dpi = config.dpi;
        let width = mm_to_px(config.width_mm, dpi);
        let height = mm_to_px(config.height_mm, dpi);
        if width > MAX_SIDE_PX || height > MAX_SIDE_PX {
            return Err(LabelError::Geometry(format!(
                "{}x{} mm at {dpi} DPI exceeds the {MAX_SIDE_PX}px canvas limit",
                config.width_mm, config.height_mm
            )));
        }
        let margin = mm_to_px(config.margin_mm, dpi);
        let core_width = width
            .checked_sub(margin.saturating_mul(2))
            .filter(|w| *w > 0)
            .ok_or_else(|| {
                LabelError::Geometry(format!(
                    "margins of {margin}px leave no room on a {width}px wide label"
                ))
            })?;
        let corner_radius = mm_to_px(config.corner_radius_mm, dpi);
        let border = mm_to_px(config.border_mm, dpi).max(1);

        let text_band_height = (height as f64 * TEXT_BAND_RATIO) as u32;
        if text_band_height == 0 {
            return Err(LabelError::Geometry(format!(
                "a {height}px tall label has no room for the character row"
            )));
        }
        let barcode_band_height = height - text_band_height;

        let cell_count = code.len() - 1;
        let cell_width = core_width / cell_count as u32;
        if cell_width == 0 {
            return Err(LabelError::Geometry(format!(
                "{core_width}px cannot hold {cell_count} cells"
            )));
        }

        Ok(Self {
            width,
            height,
            margin,
            core_width,
            corner_radius,
            border,
            text_band_height,
            barcode_band_height,
            cell_count,
            cell_width,
        })
    }

    pub fn main_font_size(&self) -> u32 {
        (self.text_band_height as f64 * MAIN_FONT_RATIO) as u32
    }

    pub fn small_font_size(&self) -> u32 {
        (self.text_band_height as f64 * SMALL_FONT_RATIO) as u32
    }

    pub fn cell_x(&self, idx: usize) -> u32 {
        self.margin + idx as u32 * self.cell_width
    }

    /// Top-left corner of the stretched barcode, one pixel below the
    /// character row.
    pub fn barcode_origin(&self) -> (u32, u32) {
        (self.margin, self.text_band_height + 1)
    }

    /// The character row: one cell per leading character, then a shared
    /// cell for the last two characters on the default background.
    pub fn cells(&self, code: &Code, palette: &Palette) -> Vec<Cell> {
        let mut cells: Vec<Cell> = code
            .leading()
            .chars()
            .enumerate()
            .map(|(idx, ch)| Cell {
                x: self.cell_x(idx),
                width: self.cell_width,
                text: ch.to_string(),
                fill: palette.color_for(ch),
                font_size: self.main_font_size(),
                lift: MAIN_TEXT_LIFT,
            })
            .collect();
        cells.push(Cell {
            x: self.cell_x(self.cell_count - 1),
            width: self.cell_width,
            text: code.trailing().to_string(),
            fill: palette.default_background,
            font_size: self.small_font_size(),
            lift: SMALL_TEXT_LIFT,
        });
        cells
    }
}
