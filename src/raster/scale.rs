//! Physical scaling and resampling
//!
//! Converts pixel dimensions into millimeters using the image DPI, then
//! resamples the raster so that one pixel equals one engraved line.

use super::{Dpi, SourceRaster};
use crate::error::{EngraveError, Result};
use image::GrayImage;
use image::imageops::{self, FilterType};

pub const MM_PER_INCH: f64 = 25.4;

/// Largest resampled raster accepted, in pixels (256 MiB of 8-bit samples)
pub const MAX_TARGET_PIXELS: f64 = (1u64 << 28) as f64;

/// Physical size of the engraving in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalCanvas {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PhysicalCanvas {
    /// Derive the physical size of a `width` x `height` pixel raster.
    ///
    /// Only the horizontal DPI is used, for both axes. Images with
    /// anisotropic density are therefore scaled as if square-pixeled.
    pub fn from_pixels(width: u32, height: u32, dpi: Dpi) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EngraveError::InvalidImage(format!(
                "image has zero dimension ({}x{})",
                width, height
            )));
        }
        if !dpi.x.is_finite() || dpi.x <= 0.0 {
            return Err(EngraveError::InvalidImage(format!(
                "DPI must be positive, got {}",
                dpi.x
            )));
        }

        Ok(Self {
            width_mm: width as f64 / dpi.x * MM_PER_INCH,
            height_mm: height as f64 / dpi.x * MM_PER_INCH,
        })
    }

    /// Number of raster columns and rows at `lines_per_mm`.
    ///
    /// Truncates rather than rounds, so the last column never lands past the
    /// physical edge. Never less than 1x1.
    ///
    /// Fails with `InvalidConfiguration` when the raster would exceed
    /// [`MAX_TARGET_PIXELS`].
    pub fn target_dimensions(&self, lines_per_mm: f64) -> Result<(u32, u32)> {
        let width = (self.width_mm * lines_per_mm).floor().max(1.0);
        let height = (self.height_mm * lines_per_mm).floor().max(1.0);

        if width * height > MAX_TARGET_PIXELS {
            return Err(EngraveError::InvalidConfiguration(format!(
                "{} lines per mm gives a {}x{} raster, more than {} pixels",
                lines_per_mm, width, height, MAX_TARGET_PIXELS
            )));
        }

        Ok((width as u32, height as u32))
    }
}

/// Source raster resampled to the engraving resolution
#[derive(Debug, Clone)]
pub struct TargetRaster {
    pub canvas: PhysicalCanvas,
    pub image: GrayImage,
}

impl TargetRaster {
    pub fn from_source(source: &SourceRaster, lines_per_mm: f64) -> Result<Self> {
        let (width, height) = source.image.dimensions();
        let canvas = PhysicalCanvas::from_pixels(width, height, source.dpi)?;
        let (new_width, new_height) = canvas.target_dimensions(lines_per_mm)?;

        Ok(Self {
            canvas,
            image: resample(&source.image, new_width, new_height),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Resize with a Lanczos3 kernel
pub fn resample(image: &GrayImage, width: u32, height: u32) -> GrayImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Lanczos3)
}
