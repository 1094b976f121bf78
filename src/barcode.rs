//! Code39 symbol layout.
//!
//! The module row comes from `barcoders` (2:1 wide to narrow, one narrow
//! gap between characters, `*` start/stop, no check character). This module
//! turns it into bar runs and a millimeter layout with quiet zones.

use crate::error::{LabelError, Result};
use barcoders::sym::code39::Code39 as Code39Encoder;

pub const MODULE_WIDTH_MM: f64 = 0.2;
pub const QUIET_ZONE_MM: f64 = 1.0;
/// Blank band above and below the bars.
pub const VERTICAL_MARGIN_MM: f64 = 1.0;

const START_STOP: char = '*';

/// An encoded symbol as a row of modules, `true` for bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code39 {
    modules: Vec<bool>,
}

impl Code39 {
    /// Lowercase letters are folded to uppercase; `*` is reserved for the
    /// start/stop frame.
    pub fn encode(data: &str) -> Result<Self> {
        if data.contains(START_STOP) {
            return Err(LabelError::InvalidFormat(data.to_string()));
        }
        let encoder = Code39Encoder::new(data.to_ascii_uppercase())
            .map_err(|_| LabelError::InvalidFormat(data.to_string()))?;
        let mut modules: Vec<bool> = encoder.encode().into_iter().map(|m| m == 1).collect();
        // The symbol ends on the last bar of the stop character.
        while modules.last() == Some(&false) {
            modules.pop();
        }
        Ok(Self { modules })
    }

    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    /// Runs of adjacent bar modules as `(first_module, module_count)`.
    pub fn bars(&self) -> Vec<(usize, usize)> {
        let mut bars = Vec::new();
        let mut start = None;
        for (idx, dark) in self.modules.iter().enumerate() {
            match (start, dark) {
                (None, true) => start = Some(idx),
                (Some(first), false) => {
                    bars.push((first, idx - first));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(first) = start {
            bars.push((first, self.modules.len() - first));
        }
        bars
    }

    /// Lays the symbol out in millimeters with quiet zones and vertical
    /// margins. `bar_height_mm` is the height of the bars alone.
    pub fn layout(&self, bar_height_mm: f64) -> SymbolLayout {
        let bars = self
            .bars()
            .into_iter()
            .map(|(first, count)| BarRect {
                x: QUIET_ZONE_MM + first as f64 * MODULE_WIDTH_MM,
                width: count as f64 * MODULE_WIDTH_MM,
            })
            .collect();
        SymbolLayout {
            width: 2.0 * QUIET_ZONE_MM + self.modules.len() as f64 * MODULE_WIDTH_MM,
            height: 2.0 * VERTICAL_MARGIN_MM + bar_height_mm,
            bar_top: VERTICAL_MARGIN_MM,
            bar_height: bar_height_mm,
            bars,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub x: f64,
    pub width: f64,
}

/// A symbol in its own millimeter space, origin at the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolLayout {
    pub width: f64,
    pub height: f64,
    pub bar_top: f64,
    pub bar_height: f64,
    pub bars: Vec<BarRect>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_framed_by_start_stop() {
        let symbol = Code39::encode("A").unwrap();
        // 3 characters of 12 modules plus 2 gaps
        assert_eq!(symbol.modules().len(), 38);
        let star: Vec<bool> = "100101101101".chars().map(|c| c == '1').collect();
        assert_eq!(&symbol.modules()[..12], star.as_slice());
        assert_eq!(&symbol.modules()[26..], star.as_slice());
        assert!(!symbol.modules()[12]);
        let a: Vec<bool> = "110101001011".chars().map(|c| c == '1').collect();
        assert_eq!(&symbol.modules()[13..25], a.as_slice());
    }

    #[test]
    fn lowercase_is_folded() {
        assert_eq!(
            Code39::encode("ca0001l6").unwrap(),
            Code39::encode("CA0001L6").unwrap()
        );
    }

    #[test]
    fn rejects_unencodable_characters() {
        assert!(Code39::encode("AB*C").is_err());
        assert!(Code39::encode("AB_C").is_err());
    }

    #[test]
    fn every_character_contributes_five_bars() {
        let symbol = Code39::encode("CA0001L6").unwrap();
        assert_eq!(symbol.bars().len(), 10 * 5);
        let modules: usize = symbol.bars().iter().map(|(_, n)| n).sum();
        assert_eq!(modules, symbol.modules().iter().filter(|m| **m).count());
    }

    #[test]
    fn layout_adds_quiet_zones() {
        let symbol = Code39::encode("CA0001L6").unwrap();
        let layout = symbol.layout(126.0);
        // 10 characters * 12 modules + 9 gaps = 129 modules
        assert!((layout.width - (2.0 + 129.0 * 0.2)).abs() < 1e-9);
        assert!((layout.height - 128.0).abs() < 1e-9);
        let first = layout.bars[0];
        assert!((first.x - QUIET_ZONE_MM).abs() < 1e-9);
        let last = layout.bars.last().unwrap();
        assert!((last.x + last.width - (layout.width - QUIET_ZONE_MM)).abs() < 1e-9);
    }
}
