pub mod barcode;
#[cfg(feature = "cli")]
pub mod cli;
pub mod code;
pub mod config;
pub mod error;
pub mod font;
pub mod geometry;
#[cfg(feature = "cli")]
pub mod logging;
pub mod palette;
pub mod render;

#[cfg(feature = "cli")]
pub use cli::run;
pub use code::Code;
pub use config::{FontConfig, LabelConfig, load_config};
pub use error::LabelError;
pub use geometry::{LabelGeometry, mm_to_px};
pub use palette::{Palette, Rgb};
pub use render::{LabelDrawing, RenderedLabel, build_label, render_svg};
#[cfg(feature = "png")]
pub use render::{render_label, render_png};
