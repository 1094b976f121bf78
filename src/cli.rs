use crate::config::{LabelConfig, load_config};
use crate::logging;
use crate::render::{build_label, render_label, write_output_svg};
use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ltolabel", version, about = "LTO tape cartridge label renderer")]
pub struct Args {
    /// Cartridge barcode, 6-8 letters and digits (e.g. CA0001L6)
    pub code: String,

    /// Output file. Defaults to <CODE>_label.png (or .svg)
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "png")]
    pub format: OutputFormat,

    /// Config JSON file (dimensions, font, digit colors)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Print resolution
    #[arg(long)]
    pub dpi: Option<u32>,

    /// Label width in millimeters
    #[arg(long)]
    pub width_mm: Option<f64>,

    /// Label height in millimeters
    #[arg(long)]
    pub height_mm: Option<f64>,

    #[arg(long)]
    pub corner_radius_mm: Option<f64>,

    #[arg(long)]
    pub border_mm: Option<f64>,

    /// Left and right margin in millimeters
    #[arg(long)]
    pub margin_mm: Option<f64>,

    /// Bold font family looked up among system fonts
    #[arg(long)]
    pub font_family: Option<String>,

    /// TrueType/OpenType file used instead of the system fonts
    #[arg(long)]
    pub font_file: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

pub fn run() -> Result<()> {
    let args = parse_args();
    logging::init(args.verbose);

    let mut config = match args.config.as_deref() {
        Some(path) => load_config(Some(path))
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LabelConfig::default(),
    };
    apply_overrides(&mut config, &args);

    let code = args.code.trim();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(code, args.format));

    match args.format {
        OutputFormat::Png => {
            let rendered = render_label(code, &output, &config)?;
            println!(
                "Generated {} ({}x{}px, {} DPI)",
                rendered.path.display(),
                rendered.width,
                rendered.height,
                rendered.dpi
            );
        }
        OutputFormat::Svg => {
            let drawing = build_label(code, &config)?;
            write_output_svg(&drawing.svg, &output)?;
            println!(
                "Generated {} ({}x{}px, SVG)",
                output.display(),
                drawing.geometry.width,
                drawing.geometry.height
            );
        }
    }

    Ok(())
}

/// Usage errors exit with status 1; help and version keep clap's handling.
fn parse_args() -> Args {
    Args::try_parse().unwrap_or_else(|err| {
        if matches!(
            err.kind(),
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
        ) {
            err.exit();
        }
        let _ = err.print();
        std::process::exit(1);
    })
}

fn apply_overrides(config: &mut LabelConfig, args: &Args) {
    if let Some(v) = args.dpi {
        config.dpi = v;
    }
    if let Some(v) = args.width_mm {
        config.width_mm = v;
    }
    if let Some(v) = args.height_mm {
        config.height_mm = v;
    }
    if let Some(v) = args.corner_radius_mm {
        config.corner_radius_mm = v;
    }
    if let Some(v) = args.border_mm {
        config.border_mm = v;
    }
    if let Some(v) = args.margin_mm {
        config.margin_mm = v;
    }
    if let Some(v) = &args.font_family {
        config.font.family = v.clone();
    }
    if let Some(v) = &args.font_file {
        config.font.file = Some(v.clone());
    }
}

fn default_output(code: &str, format: OutputFormat) -> PathBuf {
    PathBuf::from(format!("{code}_label.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_follows_code_and_format() {
        assert_eq!(
            default_output("CA0001L6", OutputFormat::Png),
            PathBuf::from("CA0001L6_label.png")
        );
        assert_eq!(
            default_output("CA0001L6", OutputFormat::Svg),
            PathBuf::from("CA0001L6_label.svg")
        );
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "ltolabel",
            "CA0001L6",
            "out.png",
            "--dpi",
            "600",
            "--margin-mm",
            "2.5",
            "--font-family",
            "DejaVu Sans",
        ])
        .unwrap();
        let mut config = LabelConfig::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.dpi, 600);
        assert_eq!(config.margin_mm, 2.5);
        assert_eq!(config.font.family, "DejaVu Sans");
        assert_eq!(config.width_mm, 78.0);
        assert_eq!(args.output, Some(PathBuf::from("out.png")));
    }

    #[test]
    fn code_is_required() {
        let err = Args::try_parse_from(["ltolabel"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
