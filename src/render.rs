use crate::barcode::Code39;
use crate::code::Code;
use crate::config::LabelConfig;
use crate::error::Result;
use crate::font::LabelFont;
use crate::geometry::{Cell, LabelGeometry};
use crate::palette::Rgb;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

const INK: Rgb = Rgb::BLACK;

/// A composed label, ready to rasterize.
#[derive(Debug, Clone)]
pub struct LabelDrawing {
    pub code: Code,
    pub geometry: LabelGeometry,
    pub cells: Vec<Cell>,
    pub svg: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLabel {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
}

/// Validates `code`, lays the label out and composes its drawing.
pub fn build_label(code: &str, config: &LabelConfig) -> Result<LabelDrawing> {
    let code = Code::parse(code)?;
    let geometry = LabelGeometry::compute(&code, config)?;
    debug!(
        code = %code,
        width = geometry.width,
        height = geometry.height,
        cell_width = geometry.cell_width,
        text_band = geometry.text_band_height,
        "computed label geometry"
    );
    let cells = geometry.cells(&code, &config.palette);
    let font = LabelFont::load(&config.font);
    debug!(bitmap = font.is_bitmap(), "resolved label font");
    let svg = render_svg(&code, &geometry, &cells, &font)?;
    Ok(LabelDrawing {
        code,
        geometry,
        cells,
        svg,
    })
}

pub fn render_svg(
    code: &Code,
    geometry: &LabelGeometry,
    cells: &[Cell],
    font: &LabelFont,
) -> Result<String> {
    let width = geometry.width;
    let height = geometry.height;
    let mut svg = String::new();

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        Rgb::WHITE
    );

    // Outline stroke sits inside the canvas, so its outer edge keeps the
    // full corner radius.
    let stroke = geometry.border as f32;
    let half = stroke / 2.0;
    let radius = (geometry.corner_radius as f32 - half).max(0.0);
    let _ = write!(
        svg,
        "<rect x=\"{half:.2}\" y=\"{half:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\" fill=\"none\" stroke=\"{INK}\" stroke-width=\"{stroke:.2}\"/>",
        width as f32 - stroke,
        height as f32 - stroke,
    );

    for cell in cells {
        svg.push_str(&cell_svg(cell, geometry, font));
    }

    svg.push_str(&barcode_svg(code, geometry)?);
    svg.push_str("</svg>");
    Ok(svg)
}

fn cell_svg(cell: &Cell, geometry: &LabelGeometry, font: &LabelFont) -> String {
    let band = geometry.text_band_height;
    let mut out = String::new();

    // Fill and outline both span x..=x+width and 0..=band, so neighbours
    // share their border column.
    let _ = write!(
        out,
        "<rect x=\"{}\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\" shape-rendering=\"crispEdges\"/>",
        cell.x,
        cell.width + 1,
        band + 1,
        cell.fill
    );
    let _ = write!(
        out,
        "<rect x=\"{}.5\" y=\"0.5\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{INK}\" stroke-width=\"1\" shape-rendering=\"crispEdges\"/>",
        cell.x, cell.width, band
    );

    let text_box = font.measure(&cell.text, cell.font_size);
    let x = cell.x as i32 + (cell.width as i32 - text_box.width()).div_euclid(2);
    let y = (band as i32 - text_box.height()).div_euclid(2) - cell.lift;
    let d = font.path_data(&cell.text, cell.font_size, x, y);
    if !d.is_empty() {
        let _ = write!(out, "<path d=\"{d}\" fill=\"{INK}\"/>");
    }
    out
}

/// The symbol is drawn in its own millimeter space and stretched to fill
/// the barcode band, covering whatever lies beneath.
fn barcode_svg(code: &Code, geometry: &LabelGeometry) -> Result<String> {
    let symbol = Code39::encode(code.as_str())?;
    let layout = symbol.layout(geometry.barcode_band_height as f64);
    let (origin_x, origin_y) = geometry.barcode_origin();
    let scale_x = geometry.core_width as f64 / layout.width;
    let scale_y = geometry.barcode_band_height as f64 / layout.height;

    let mut out = String::new();
    let _ = write!(
        out,
        "<g transform=\"translate({origin_x} {origin_y}) scale({scale_x:.6} {scale_y:.6})\" shape-rendering=\"crispEdges\">",
    );
    let _ = write!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{:.4}\" height=\"{:.4}\" fill=\"{}\"/>",
        layout.width,
        layout.height,
        Rgb::WHITE
    );
    for bar in &layout.bars {
        let _ = write!(
            out,
            "<rect x=\"{:.4}\" y=\"{:.4}\" width=\"{:.4}\" height=\"{:.4}\" fill=\"{INK}\"/>",
            bar.x, layout.bar_top, bar.width, layout.bar_height
        );
    }
    out.push_str("</g>");
    Ok(out)
}

pub fn write_output_svg(svg: &str, output: &Path) -> Result<()> {
    std::fs::write(output, svg)?;
    Ok(())
}

#[cfg(feature = "png")]
pub use self::raster::{encode_png, rasterize, render_label, render_png, write_output_png};

#[cfg(feature = "png")]
mod raster {
    use super::*;
    use crate::error::LabelError;
    use resvg::tiny_skia::{Pixmap, Transform};

    const METERS_PER_INCH: f64 = 0.0254;

    pub fn rasterize(svg: &str, geometry: &LabelGeometry) -> Result<Pixmap> {
        let opt = usvg::Options::default();
        let tree = usvg::Tree::from_str(svg, &opt)?;
        let mut pixmap =
            Pixmap::new(geometry.width, geometry.height).ok_or(LabelError::Canvas {
                width: geometry.width,
                height: geometry.height,
            })?;
        pixmap.fill(resvg::tiny_skia::Color::WHITE);
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
        Ok(pixmap)
    }

    /// RGB PNG with a pHYs chunk carrying `dpi`.
    pub fn encode_png(pixmap: &Pixmap, dpi: u32) -> Result<Vec<u8>> {
        // The canvas is opaque, so premultiplied RGBA is plain RGBA.
        let rgb: Vec<u8> = pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        let pixels_per_meter = (dpi as f64 / METERS_PER_INCH).round() as u32;

        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, pixmap.width(), pixmap.height());
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: pixels_per_meter,
                yppu: pixels_per_meter,
                unit: png::Unit::Meter,
            }));
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&rgb)?;
            writer.finish()?;
        }
        Ok(buf)
    }

    /// Composes and rasterizes a label into PNG bytes.
    pub fn render_png(code: &str, config: &LabelConfig) -> Result<(LabelDrawing, Vec<u8>)> {
        let drawing = build_label(code, config)?;
        let pixmap = rasterize(&drawing.svg, &drawing.geometry)?;
        let bytes = encode_png(&pixmap, config.dpi)?;
        Ok((drawing, bytes))
    }

    pub fn write_output_png(bytes: &[u8], output: &Path) -> Result<()> {
        std::fs::write(output, bytes)?;
        Ok(())
    }

    /// Renders `code` into a PNG at `output`, replacing any existing file.
    /// Nothing is written unless every earlier step succeeded.
    pub fn render_label(code: &str, output: &Path, config: &LabelConfig) -> Result<RenderedLabel> {
        let (drawing, bytes) = render_png(code, config)?;
        write_output_png(&bytes, output)?;
        debug!(path = %output.display(), bytes = bytes.len(), "wrote label");
        Ok(RenderedLabel {
            path: output.to_path_buf(),
            width: drawing.geometry.width,
            height: drawing.geometry.height,
            dpi: config.dpi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FontConfig;
    use crate::error::LabelError;

    fn bitmap_config() -> LabelConfig {
        LabelConfig {
            font: FontConfig {
                family: "No Such Face 7f3a".to_string(),
                file: None,
            },
            ..LabelConfig::default()
        }
    }

    #[test]
    fn render_svg_basic() {
        let drawing = build_label("CA0001L6", &bitmap_config()).unwrap();
        let svg = &drawing.svg;
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"875\" height=\"180\""));
        // red cells for the zeros, yellow for the one
        assert_eq!(svg.matches("fill=\"#c80000\"").count(), 3);
        assert_eq!(svg.matches("fill=\"#ffdc32\"").count(), 1);
        assert_eq!(drawing.cells.len(), 7);
    }

    #[test]
    fn barcode_is_drawn_after_cells() {
        let drawing = build_label("CA0001L6", &bitmap_config()).unwrap();
        let last_cell = drawing.svg.rfind("shape-rendering=\"crispEdges\"/>").unwrap();
        let barcode = drawing.svg.find("<g transform=\"translate(39 55)").unwrap();
        assert!(barcode > last_cell);
        // 50 bars plus the white backing
        let group = &drawing.svg[barcode..];
        assert_eq!(group.matches("<rect").count(), 51);
    }

    #[test]
    fn invalid_codes_fail_before_drawing() {
        assert!(matches!(
            build_label("CA-001L6", &bitmap_config()),
            Err(LabelError::InvalidFormat(_))
        ));
        assert!(matches!(
            build_label("CA01", &bitmap_config()),
            Err(LabelError::InvalidLength { len: 4 })
        ));
    }

    #[test]
    fn huge_label_is_a_geometry_error() {
        for width_mm in [3e8, 1e9] {
            let config = LabelConfig {
                width_mm,
                ..bitmap_config()
            };
            assert!(matches!(
                build_label("CA0001L6", &config),
                Err(LabelError::Geometry(_))
            ));
        }
    }

    #[cfg(feature = "png")]
    #[test]
    fn rasterized_cells_carry_palette_colors() {
        let config = bitmap_config();
        let drawing = build_label("CA0001L6", &config).unwrap();
        let pixmap = rasterize(&drawing.svg, &drawing.geometry).unwrap();
        let pixel = |x: u32, y: u32| {
            let px = pixmap.pixel(x, y).unwrap();
            [px.red(), px.green(), px.blue()]
        };
        // inside the first zero cell, clear of outline and glyph
        let zero = &drawing.cells[2];
        assert_eq!(pixel(zero.x + 3, 3), [200, 0, 0]);
        // cell outline
        assert_eq!(pixel(zero.x, 20), [0, 0, 0]);
        // letters use the default background
        let letter = &drawing.cells[0];
        assert_eq!(pixel(letter.x + 3, 3), [255, 255, 255]);
    }
}
