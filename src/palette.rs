use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ColorValue")]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
        Some(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

/// Lowercase `#rrggbb`, usable directly as an SVG paint.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Hex(String),
    Triple([u8; 3]),
}

impl TryFrom<ColorValue> for Rgb {
    type Error = String;

    fn try_from(value: ColorValue) -> Result<Self, Self::Error> {
        match value {
            ColorValue::Triple(rgb) => Ok(Rgb(rgb)),
            ColorValue::Hex(hex) => {
                Rgb::parse_hex(&hex).ok_or_else(|| format!("expected #RRGGBB color, got {hex:?}"))
            }
        }
    }
}

/// Cell background colors keyed by character.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub colors: BTreeMap<char, Rgb>,
    pub default_background: Rgb,
}

impl Palette {
    /// The LTO digit color convention: 0 red, 1 yellow, 2 light green,
    /// 3 light blue, 4 light gray, 5 orange, 6 pink, 7 green, 8 brownish,
    /// 9 purplish gray.
    pub fn lto() -> Self {
        let colors = [
            ('0', Rgb::new(200, 0, 0)),
            ('1', Rgb::new(255, 220, 50)),
            ('2', Rgb::new(144, 238, 144)),
            ('3', Rgb::new(173, 216, 230)),
            ('4', Rgb::new(211, 211, 211)),
            ('5', Rgb::new(255, 165, 0)),
            ('6', Rgb::new(255, 192, 203)),
            ('7', Rgb::new(0, 200, 0)),
            ('8', Rgb::new(204, 153, 0)),
            ('9', Rgb::new(160, 130, 160)),
        ];
        Self {
            colors: colors.into_iter().collect(),
            default_background: Rgb::WHITE,
        }
    }

    pub fn color_for(&self, ch: char) -> Rgb {
        self.colors
            .get(&ch)
            .copied()
            .unwrap_or(self.default_background)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::lto()
    }
}
