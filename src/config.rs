use crate::error::{LabelError, Result};
use crate::palette::{Palette, Rgb};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct FontConfig {
    /// Bold face looked up among the system fonts.
    pub family: String,
    /// Explicit font file, tried before the system fonts.
    pub file: Option<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            file: None,
        }
    }
}

/// Physical label description. All lengths are millimeters.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelConfig {
    pub dpi: u32,
    pub width_mm: f64,
    pub height_mm: f64,
    pub corner_radius_mm: f64,
    pub border_mm: f64,
    pub margin_mm: f64,
    pub palette: Palette,
    pub font: FontConfig,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            width_mm: 78.0,
            height_mm: 16.0,
            corner_radius_mm: 1.5,
            border_mm: 0.1,
            margin_mm: 3.5,
            palette: Palette::lto(),
            font: FontConfig::default(),
        }
    }
}

impl LabelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(LabelError::Config("dpi must be positive".to_string()));
        }
        let lengths = [
            ("width", self.width_mm),
            ("height", self.height_mm),
            ("corner radius", self.corner_radius_mm),
            ("border", self.border_mm),
            ("margin", self.margin_mm),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(LabelError::Config(format!(
                    "{name} must be a non-negative number of millimeters, got {value}"
                )));
            }
        }
        if self.width_mm == 0.0 || self.height_mm == 0.0 {
            return Err(LabelError::Config(
                "label width and height must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    dpi: Option<u32>,
    width_mm: Option<f64>,
    height_mm: Option<f64>,
    corner_radius_mm: Option<f64>,
    border_mm: Option<f64>,
    margin_mm: Option<f64>,
    font_family: Option<String>,
    font_file: Option<PathBuf>,
    digit_colors: Option<BTreeMap<String, Rgb>>,
    default_background: Option<Rgb>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LabelConfig> {
    let mut config = LabelConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    apply_config_file(&mut config, parsed)?;
    Ok(config)
}

fn apply_config_file(config: &mut LabelConfig, parsed: ConfigFile) -> Result<()> {
    if let Some(v) = parsed.dpi {
        config.dpi = v;
    }
    if let Some(v) = parsed.width_mm {
        config.width_mm = v;
    }
    if let Some(v) = parsed.height_mm {
        config.height_mm = v;
    }
    if let Some(v) = parsed.corner_radius_mm {
        config.corner_radius_mm = v;
    }
    if let Some(v) = parsed.border_mm {
        config.border_mm = v;
    }
    if let Some(v) = parsed.margin_mm {
        config.margin_mm = v;
    }
    if let Some(v) = parsed.font_family {
        config.font.family = v;
    }
    if let Some(v) = parsed.font_file {
        config.font.file = Some(v);
    }
    if let Some(colors) = parsed.digit_colors {
        let mut map = BTreeMap::new();
        for (key, color) in colors {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                return Err(LabelError::Config(format!(
                    "color map keys must be single characters, got {key:?}"
                )));
            };
            map.insert(ch, color);
        }
        config.palette.colors = map;
    }
    if let Some(v) = parsed.default_background {
        config.palette.default_background = v;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<LabelConfig> {
        let parsed: ConfigFile = serde_json::from_str(json).unwrap();
        let mut config = LabelConfig::default();
        apply_config_file(&mut config, parsed)?;
        Ok(config)
    }

    #[test]
    fn defaults_match_standard_lto_label() {
        let config = LabelConfig::default();
        assert_eq!(config.dpi, 300);
        assert_eq!(config.width_mm, 78.0);
        assert_eq!(config.height_mm, 16.0);
        assert_eq!(config.margin_mm, 3.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_overrides_only_given_keys() {
        let config = parse(r#"{"dpi": 600, "marginMm": 2}"#).unwrap();
        assert_eq!(config.dpi, 600);
        assert_eq!(config.margin_mm, 2.0);
        assert_eq!(config.width_mm, 78.0);
        assert_eq!(config.palette, Palette::lto());
    }

    #[test]
    fn digit_colors_replace_builtin_table() {
        let config = parse(
            r##"{"digitColors": {"0": "#010203", "A": [9, 9, 9]}, "defaultBackground": "#EEEEEE"}"##,
        )
        .unwrap();
        assert_eq!(config.palette.colors.len(), 2);
        assert_eq!(config.palette.color_for('A'), Rgb::new(9, 9, 9));
        assert_eq!(config.palette.color_for('1'), Rgb::new(0xEE, 0xEE, 0xEE));
    }

    #[test]
    fn multi_character_color_key_is_rejected() {
        let err = parse(r##"{"digitColors": {"01": "#010203"}}"##).unwrap_err();
        assert!(matches!(err, LabelError::Config(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<ConfigFile>(r#"{"dpii": 300}"#).is_err());
    }

    #[test]
    fn validation_rejects_degenerate_sizes() {
        let mut config = LabelConfig::default();
        config.dpi = 0;
        assert!(config.validate().is_err());

        let mut config = LabelConfig::default();
        config.height_mm = 0.0;
        assert!(config.validate().is_err());

        let mut config = LabelConfig::default();
        config.margin_mm = f64::NAN;
        assert!(config.validate().is_err());
    }
}
