//! Row segmentation
//!
//! Each raster row is collapsed into runs of constant laser power. Rows that
//! are entirely white produce no motion at all.

use super::quantize::{WHITE, quantize_power};
use image::GrayImage;
use rayon::prelude::*;

/// Maps engraving rows to raster rows.
///
/// Engraving row 0 sits on the machine origin (Y = 0) and Y grows upward,
/// while raster row 0 is the top of the image. Row `y` of the engraving
/// therefore reads raster row `height - 1 - y`.
///
/// Negative indexing (`-y`, wrapping modulo the height) is off by one: it
/// reads the top row first and then continues from the bottom. This mapping
/// deliberately starts at the bottom row instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAddressing {
    height: u32,
}

impl RowAddressing {
    pub fn new(height: u32) -> Self {
        Self { height }
    }

    pub fn source_row(&self, y: u32) -> u32 {
        debug_assert!(y < self.height);
        self.height - 1 - y
    }
}

/// Maximal run of constant power ending at `end_column`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub row: u32,
    pub end_column: u32,
    pub power: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Every sample is white; nothing is emitted
    Blank,
    /// Column-ordered runs covering the whole row
    Engraved(Vec<Segment>),
}

impl Row {
    pub fn is_blank(&self) -> bool {
        matches!(self, Row::Blank)
    }

    pub fn segments(&self) -> &[Segment] {
        match self {
            Row::Blank => &[],
            Row::Engraved(segments) => segments,
        }
    }
}

/// Samples of engraving row `y`, left to right
pub fn row_samples(image: &GrayImage, addressing: RowAddressing, y: u32) -> &[u8] {
    let width = image.width() as usize;
    let start = addressing.source_row(y) as usize * width;
    &image.as_raw()[start..start + width]
}

/// Run-length merge one row of samples
pub fn segment_row(samples: &[u8], row: u32, max_power: u32) -> Row {
    if samples.iter().all(|&s| s == WHITE) {
        return Row::Blank;
    }

    let mut segments = Vec::new();
    let mut current = quantize_power(samples[0], max_power);

    for (x, &sample) in samples.iter().enumerate().skip(1) {
        let power = quantize_power(sample, max_power);
        if power != current {
            segments.push(Segment {
                row,
                end_column: x as u32 - 1,
                power: current,
            });
            current = power;
        }
    }

    segments.push(Segment {
        row,
        end_column: samples.len() as u32 - 1,
        power: current,
    });

    Row::Engraved(segments)
}

/// Segment every row of the raster in engraving order.
///
/// Rows are independent, so they are processed in parallel; the result is
/// still indexed by row.
pub fn segment_rows(image: &GrayImage, max_power: u32) -> Vec<Row> {
    let addressing = RowAddressing::new(image.height());

    (0..image.height())
        .into_par_iter()
        .map(|y| segment_row(row_samples(image, addressing, y), y, max_power))
        .collect()
}
