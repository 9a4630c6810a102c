//! Compilation options

use crate::error::{EngraveError, Result};

/// Options controlling how a raster is turned into a toolpath
#[derive(Debug, Clone, PartialEq)]
pub struct EngraveOptions {
    /// Spindle value emitted for pure black (default: 255)
    pub laser_max_power: u32,
    /// Engraving feed rate in mm/min (default: 1500)
    pub feed_rate: u32,
    /// Feed rate of the return move to column 0 in mm/min (default: 3000)
    pub fast_return_rate: u32,
    /// Engraved lines (and columns) per millimeter (default: 10)
    pub lines_per_mm: f64,
    /// Embed a base64 preview block ahead of the program (default: true)
    pub thumbnail: bool,
}

impl Default for EngraveOptions {
    fn default() -> Self {
        Self {
            laser_max_power: 255,
            feed_rate: 1500,
            fast_return_rate: 3000,
            lines_per_mm: 10.0,
            thumbnail: true,
        }
    }
}

impl EngraveOptions {
    /// Reject options that would produce a meaningless program
    pub fn validate(&self) -> Result<()> {
        if self.laser_max_power == 0 {
            return Err(invalid("laser max power must be positive"));
        }
        if self.feed_rate == 0 {
            return Err(invalid("feed rate must be positive"));
        }
        if self.fast_return_rate == 0 {
            return Err(invalid("fast return rate must be positive"));
        }
        if !self.lines_per_mm.is_finite() || self.lines_per_mm <= 0.0 {
            return Err(EngraveError::InvalidConfiguration(format!(
                "lines per mm must be a positive number, got {}",
                self.lines_per_mm
            )));
        }
        Ok(())
    }

    /// Physical size of one target pixel in millimeters
    pub fn pixel_size_mm(&self) -> f64 {
        1.0 / self.lines_per_mm
    }
}

fn invalid(msg: &str) -> EngraveError {
    EngraveError::InvalidConfiguration(msg.to_string())
}
