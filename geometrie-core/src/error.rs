/// Error type shared by the core library and its front-ends
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A render surface must be at least one pixel in each direction
    #[error("render surface has invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("no render surface matches `{0}`")]
    MissingSurface(String),

    #[error("invalid color `{0}`")]
    InvalidColor(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
