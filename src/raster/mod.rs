//! Raster loading and scaling
//!
//! This module turns an encoded image into the grayscale raster the
//! toolpath compiler works on:
//! 1. Decode the image and convert it to 8-bit luma
//! 2. Read the DPI from the container metadata (default 300)
//! 3. Derive the physical canvas size in millimeters
//! 4. Resample to `lines_per_mm` pixels per millimeter

mod dpi;
mod scale;

use crate::error::{EngraveError, Result};
use image::{GrayImage, ImageReader};
use std::io::Cursor;
use std::path::Path;

pub use dpi::probe_dpi;
pub use scale::{MAX_TARGET_PIXELS, MM_PER_INCH, PhysicalCanvas, TargetRaster, resample};

/// Resolution assumed when the image carries no density metadata
pub const DEFAULT_DPI: f64 = 300.0;

/// Image resolution in dots per inch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dpi {
    pub x: f64,
    pub y: f64,
}

impl Default for Dpi {
    fn default() -> Self {
        Self {
            x: DEFAULT_DPI,
            y: DEFAULT_DPI,
        }
    }
}

/// Decoded grayscale image (0 = black, 255 = white) with its resolution
#[derive(Debug, Clone)]
pub struct SourceRaster {
    pub image: GrayImage,
    pub dpi: Dpi,
}

impl SourceRaster {
    pub fn new(image: GrayImage, dpi: Dpi) -> Self {
        Self { image, dpi }
    }

    /// Decode an encoded image (PNG, JPEG, BMP)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let img = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| EngraveError::InvalidImage(format!("failed to guess format: {}", e)))?
            .decode()
            .map_err(|e| EngraveError::InvalidImage(format!("failed to decode: {}", e)))?;

        let image = img.to_luma8();
        if image.width() == 0 || image.height() == 0 {
            return Err(EngraveError::InvalidImage(format!(
                "image has zero dimension ({}x{})",
                image.width(),
                image.height()
            )));
        }

        let dpi = match probe_dpi(bytes) {
            Some(dpi) => dpi,
            None => {
                log::debug!("No DPI metadata, assuming {}", DEFAULT_DPI);
                Dpi::default()
            }
        };

        Ok(Self { image, dpi })
    }

    /// Read and decode an image file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            EngraveError::InvalidImage(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma};

    fn encode_png(image: &GrayImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_defaults_to_300_dpi() {
        let image = GrayImage::from_pixel(4, 3, Luma([128]));
        let raster = SourceRaster::from_bytes(&encode_png(&image)).unwrap();

        assert_eq!(raster.image.dimensions(), (4, 3));
        assert_eq!(raster.dpi, Dpi::default());
        assert_eq!(raster.image.get_pixel(0, 0).0[0], 128);
    }

    #[test]
    fn test_decode_garbage() {
        let result = SourceRaster::from_bytes(b"definitely not an image");
        assert!(matches!(result, Err(EngraveError::InvalidImage(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let result = SourceRaster::open("/nonexistent/input.png");
        assert!(matches!(result, Err(EngraveError::InvalidImage(_))));
    }
}
