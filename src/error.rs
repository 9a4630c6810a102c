//! Error types for raster compilation

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while compiling a raster image into a toolpath program
#[derive(Debug, Error)]
pub enum EngraveError {
    /// Unreadable, corrupt or zero-sized input image, or unusable DPI
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Option out of range (non-positive power, feed rates or resolution)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Preview thumbnail could not be encoded. Never fatal to compilation.
    #[error("Thumbnail encoding failed: {0}")]
    ThumbnailEncoding(String),

    /// Program or preview bitmap could not be written
    #[error("Failed to write '{}': {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EngraveError>;
