//! Raster to G-code compilation
//!
//! The compilation pass:
//! 1. Validate options and scale the raster to `lines_per_mm`
//! 2. Segment every row into constant-power runs, skipping white rows
//! 3. Emit the thumbnail block, preamble, one block per engraved row and
//!    the footer
//! 4. Write the program and a BMP preview of the resampled raster

mod emit;
mod quantize;
mod segment;
mod thumbnail;

use crate::config::EngraveOptions;
use crate::error::{EngraveError, Result};
use crate::raster::{Dpi, PhysicalCanvas, SourceRaster, TargetRaster};
use image::{GrayImage, ImageError, ImageFormat};
use log::{debug, info, warn};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use emit::{ToolpathProgram, mm, push_footer, push_preamble, push_row};
pub use quantize::{WHITE, quantize_power};
pub use segment::{Row, RowAddressing, Segment, row_samples, segment_row, segment_rows};
pub use thumbnail::{PngThumbnail, Thumbnail, ThumbnailEncoder};

/// Summary of one compilation
#[derive(Debug, Clone, PartialEq)]
pub struct CompileReport {
    pub dpi: Dpi,
    pub canvas: PhysicalCanvas,
    /// Resampled raster size in pixels (= engraved columns x rows)
    pub width: u32,
    pub height: u32,
    pub engraved_rows: usize,
    pub skipped_rows: usize,
    /// Total number of lines in the program, thumbnail included
    pub instruction_count: usize,
    pub thumbnail_embedded: bool,
    /// Non-fatal problems, such as a failed thumbnail
    pub warnings: Vec<String>,
}

/// Program ready to be written, along with the raster it was built from
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub program: ToolpathProgram,
    pub preview: GrayImage,
    pub report: CompileReport,
}

/// Compile an already decoded raster
pub fn compile_raster(
    source: &SourceRaster,
    options: &EngraveOptions,
    encoder: &dyn ThumbnailEncoder,
) -> Result<CompiledProgram> {
    options.validate()?;
    info!("Input image DPI: {}", source.dpi.x);

    let target = TargetRaster::from_source(source, options.lines_per_mm)?;
    debug!(
        "Resampled {}x{} -> {}x{}",
        source.image.width(),
        source.image.height(),
        target.width(),
        target.height()
    );

    let rows = segment_rows(&target.image, options.laser_max_power);

    let mut program = ToolpathProgram::new();
    let mut warnings = Vec::new();
    let mut thumbnail_embedded = false;

    if options.thumbnail {
        match Thumbnail::encode(&target.image, encoder) {
            Ok(thumb) => {
                program.extend(thumb.to_block());
                thumbnail_embedded = true;
            }
            Err(e) => {
                warn!("{}; emitting program without preview", e);
                warnings.push(e.to_string());
            }
        }
    }

    push_preamble(&mut program, options);

    let mut engraved_rows = 0;
    for (y, row) in rows.iter().enumerate() {
        if push_row(&mut program, y as u32, row, options) > 0 {
            engraved_rows += 1;
        }
    }

    push_footer(&mut program);

    let report = CompileReport {
        dpi: source.dpi,
        canvas: target.canvas,
        width: target.width(),
        height: target.height(),
        engraved_rows,
        skipped_rows: rows.len() - engraved_rows,
        instruction_count: program.len(),
        thumbnail_embedded,
        warnings,
    };

    info!(
        "Image dimensions: {:.2} mm x {:.2} mm",
        report.canvas.width_mm, report.canvas.height_mm
    );
    info!(
        "Engraved {} rows, skipped {} blank rows",
        report.engraved_rows, report.skipped_rows
    );
    info!("Total G-code lines: {}", report.instruction_count);

    Ok(CompiledProgram {
        program,
        preview: target.image,
        report,
    })
}

/// Compile an encoded image (PNG, JPEG, BMP)
pub fn compile_image(bytes: &[u8], options: &EngraveOptions) -> Result<CompiledProgram> {
    options.validate()?;
    let source = SourceRaster::from_bytes(bytes)?;
    compile_raster(&source, options, &PngThumbnail)
}

/// Compile an image file
pub fn compile_image_file(
    path: impl AsRef<Path>,
    options: &EngraveOptions,
) -> Result<CompiledProgram> {
    options.validate()?;
    let source = SourceRaster::open(path)?;
    compile_raster(&source, options, &PngThumbnail)
}

/// Path of the BMP preview written next to `output`
pub fn preview_path(output: &Path) -> PathBuf {
    let preview = output.with_extension("bmp");
    if preview == output {
        output.with_extension("preview.bmp")
    } else {
        preview
    }
}

fn write_error(path: &Path, source: io::Error) -> EngraveError {
    EngraveError::OutputWrite {
        path: path.to_path_buf(),
        source,
    }
}

fn image_io_error(e: ImageError) -> io::Error {
    match e {
        ImageError::IoError(e) => e,
        other => io::Error::other(other),
    }
}

/// Write the program to `output` and its preview bitmap alongside.
///
/// The program goes through a `.part` file that is renamed into place. If
/// anything fails, nothing is left at `output`.
pub fn write_program(compiled: &CompiledProgram, output: impl AsRef<Path>) -> Result<PathBuf> {
    let output = output.as_ref();
    let file_name = output.file_name().ok_or_else(|| {
        write_error(
            output,
            io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"),
        )
    })?;

    let mut part_name = OsString::from(file_name);
    part_name.push(".part");
    let part = output.with_file_name(part_name);

    let staged = fs::write(&part, compiled.program.to_gcode())
        .and_then(|_| fs::rename(&part, output));
    if let Err(e) = staged {
        let _ = fs::remove_file(&part);
        return Err(write_error(output, e));
    }

    let preview = preview_path(output);
    if let Err(e) = compiled.preview.save_with_format(&preview, ImageFormat::Bmp) {
        let _ = fs::remove_file(output);
        let _ = fs::remove_file(&preview);
        return Err(write_error(&preview, image_io_error(e)));
    }

    info!("G-code saved to {}", output.display());
    info!("Preview saved to {}", preview.display());
    Ok(preview)
}

/// Compile `input` and write the program to `output`
pub fn engrave_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &EngraveOptions,
) -> Result<CompileReport> {
    let compiled = compile_image_file(input, options)?;
    write_program(&compiled, output)?;
    Ok(compiled.report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    struct FailingEncoder;

    impl ThumbnailEncoder for FailingEncoder {
        fn encode(&self, _image: &GrayImage) -> Result<Vec<u8>> {
            Err(EngraveError::ThumbnailEncoding("unsupported".to_string()))
        }
    }

    // At 253 DPI and 10 lines/mm, n pixels truncate to n lines (n < 253), so
    // no resampling happens
    fn raster(width: u32, height: u32, value: u8) -> SourceRaster {
        SourceRaster::new(
            GrayImage::from_pixel(width, height, Luma([value])),
            Dpi { x: 253.0, y: 253.0 },
        )
    }

    #[test]
    fn test_preview_path() {
        assert_eq!(preview_path(Path::new("out/job.gcode")), Path::new("out/job.bmp"));
        assert_eq!(preview_path(Path::new("job")), Path::new("job.bmp"));
        assert_eq!(preview_path(Path::new("job.bmp")), Path::new("job.preview.bmp"));
    }

    #[test]
    fn test_report_counts_rows() {
        let mut source = raster(4, 5, 255);
        source.image.put_pixel(1, 0, Luma([0]));
        source.image.put_pixel(2, 4, Luma([0]));

        let compiled = compile_raster(&source, &EngraveOptions::default(), &PngThumbnail).unwrap();
        let report = &compiled.report;

        assert_eq!((report.width, report.height), (4, 5));
        assert_eq!(report.engraved_rows, 2);
        assert_eq!(report.skipped_rows, 3);
        assert_eq!(report.instruction_count, compiled.program.len());
        assert!(report.thumbnail_embedded);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_thumbnail_failure_is_a_warning() {
        let compiled =
            compile_raster(&raster(3, 3, 0), &EngraveOptions::default(), &FailingEncoder).unwrap();

        assert!(!compiled.report.thumbnail_embedded);
        assert_eq!(compiled.report.warnings.len(), 1);
        assert_eq!(compiled.program.lines()[0], "G21 ; Set units to mm");
        assert_eq!(compiled.report.engraved_rows, 3);
    }

    #[test]
    fn test_thumbnail_disabled() {
        let options = EngraveOptions {
            thumbnail: false,
            ..Default::default()
        };
        let compiled = compile_raster(&raster(3, 3, 0), &options, &FailingEncoder).unwrap();

        assert!(!compiled.report.thumbnail_embedded);
        assert!(compiled.report.warnings.is_empty());
        assert_eq!(compiled.program.lines()[0], "G21 ; Set units to mm");
    }

    #[test]
    fn test_invalid_options_rejected_before_scaling() {
        let options = EngraveOptions {
            feed_rate: 0,
            ..Default::default()
        };
        let result = compile_raster(&raster(3, 3, 0), &options, &PngThumbnail);
        assert!(matches!(result, Err(EngraveError::InvalidConfiguration(_))));
    }
}
