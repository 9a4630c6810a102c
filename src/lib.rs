//! # raster-engrave
//!
//! A Rust library that compiles grayscale raster images into G-code for
//! laser engraving.
//!
//! ## Features
//!
//! - **DPI-aware scaling**: physical size comes from the image DPI, and the
//!   raster is resampled to a configurable number of lines per millimeter
//! - **Run-length toolpaths**: consecutive pixels of equal power become a
//!   single move, and pure white rows are skipped entirely
//! - **Embedded preview**: a base64 PNG thumbnail block for the controller
//!   display, plus a BMP preview next to the program
//!
//! ## Example
//!
//! ```rust,ignore
//! use raster_engrave::{EngraveOptions, compile_image_file, write_program};
//!
//! let compiled = compile_image_file("input.png", &EngraveOptions::default()).unwrap();
//! write_program(&compiled, "output.gcode").unwrap();
//! ```

pub mod config;
pub mod error;
pub mod gcode;
pub mod raster;

// Re-export commonly used items
pub use config::EngraveOptions;
pub use error::{EngraveError, Result};
pub use gcode::{
    CompileReport, CompiledProgram, PngThumbnail, ThumbnailEncoder, ToolpathProgram,
    compile_image, compile_image_file, compile_raster, engrave_file, write_program,
};
pub use raster::{Dpi, SourceRaster};
