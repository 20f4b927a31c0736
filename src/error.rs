use thiserror::Error;

/// A failure to load or save a value table.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed table: {0}")]
    Format(#[from] serde_json::Error),
    #[error("table has shape {found:?}, expected {expected:?}")]
    Shape {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("no table named {0:?}")]
    Missing(String),
}

/// A request to draw outside of the configured display regions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoundsError {
    #[error("display index {index} exceeds capacity {capacity}")]
    Index { index: usize, capacity: usize },
    #[error("frame of {width}x{height} px does not fit a {region_width}x{region_height} px region")]
    FrameTooLarge {
        width: u32,
        height: u32,
        region_width: u32,
        region_height: u32,
    },
}

/// An invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed configuration: {0}")]
    Format(#[from] serde_json::Error),
}

/// A failure to load an image resource.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("unknown image {0:?}")]
    Unknown(String),
}

/// Any error raised while setting up or running simulations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Bounds(#[from] BoundsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}
