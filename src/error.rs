use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("barcode may only contain letters and digits, got {0:?}")]
    InvalidFormat(String),

    #[error("barcode length must be 6-8 characters (e.g. CA0001L6), got {len}")]
    InvalidLength { len: usize },

    #[error("invalid label geometry: {0}")]
    Geometry(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[cfg(feature = "png")]
    #[error("failed to build label drawing: {0}")]
    Svg(#[from] usvg::Error),

    #[error("failed to allocate {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },

    #[cfg(feature = "png")]
    #[error("failed to encode png: {0}")]
    Encode(#[from] png::EncodingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = LabelError> = std::result::Result<T, E>;
