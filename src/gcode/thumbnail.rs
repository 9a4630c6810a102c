//! Embedded preview for the controller display
//!
//! The firmware's preview parser looks for a comment block of the form
//!
//! ```text
//! ; thumbnail begin <width>, <height>
//! ; <base64 image data, wrapped>
//! ; thumbnail end
//! ```
//!
//! at the top of the file. The compiler never reads it back.

use crate::error::{EngraveError, Result};
use base64::{Engine as _, engine::general_purpose};
use image::{GrayImage, ImageFormat};
use std::io::Cursor;

/// Base64 characters per comment line
const LINE_WIDTH: usize = 76;

/// Encodes the preview raster into an image byte stream
pub trait ThumbnailEncoder {
    fn encode(&self, image: &GrayImage) -> Result<Vec<u8>>;
}

/// PNG thumbnails, the format the firmware decodes
#[derive(Debug, Clone, Copy, Default)]
pub struct PngThumbnail;

impl ThumbnailEncoder for PngThumbnail {
    fn encode(&self, image: &GrayImage) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| EngraveError::ThumbnailEncoding(e.to_string()))?;
        Ok(bytes)
    }
}

/// Base64 preview payload with its pixel dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub data: String,
}

impl Thumbnail {
    pub fn encode(image: &GrayImage, encoder: &dyn ThumbnailEncoder) -> Result<Self> {
        let bytes = encoder.encode(image)?;
        if bytes.is_empty() {
            return Err(EngraveError::ThumbnailEncoding(
                "encoder produced no data".to_string(),
            ));
        }

        Ok(Self {
            width: image.width(),
            height: image.height(),
            data: general_purpose::STANDARD.encode(bytes),
        })
    }

    /// Comment lines to place ahead of the program
    pub fn to_block(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(2 + self.data.len().div_ceil(LINE_WIDTH));
        lines.push(format!("; thumbnail begin {}, {}", self.width, self.height));
        // base64 output is ASCII, so byte chunks are valid str slices
        for chunk in self.data.as_bytes().chunks(LINE_WIDTH) {
            lines.push(format!("; {}", String::from_utf8_lossy(chunk)));
        }
        lines.push("; thumbnail end".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    struct FixedBytes(Vec<u8>);

    impl ThumbnailEncoder for FixedBytes {
        fn encode(&self, _image: &GrayImage) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_png_thumbnail_round_trips_through_image() {
        let image = GrayImage::from_pixel(3, 2, Luma([90]));
        let thumb = Thumbnail::encode(&image, &PngThumbnail).unwrap();

        let bytes = general_purpose::STANDARD.decode(&thumb.data).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_luma8();
        assert_eq!(decoded, image);
        assert_eq!((thumb.width, thumb.height), (3, 2));
    }

    #[test]
    fn test_block_layout() {
        let image = GrayImage::new(7, 5);
        let thumb = Thumbnail::encode(&image, &FixedBytes(b"hello".to_vec())).unwrap();

        assert_eq!(
            thumb.to_block(),
            vec!["; thumbnail begin 7, 5", "; aGVsbG8=", "; thumbnail end"]
        );
    }

    #[test]
    fn test_block_wraps_payload() {
        let image = GrayImage::new(1, 1);
        // 120 bytes -> 160 base64 chars -> 76 + 76 + 8
        let thumb = Thumbnail::encode(&image, &FixedBytes(vec![0xAB; 120])).unwrap();
        let block = thumb.to_block();

        assert_eq!(block.len(), 5);
        assert_eq!(block[1].len(), 2 + LINE_WIDTH);
        assert_eq!(block[2].len(), 2 + LINE_WIDTH);
        assert_eq!(block[3].len(), 2 + 8);
        let joined: String = block[1..4].iter().map(|l| &l[2..]).collect();
        assert_eq!(joined, thumb.data);
    }

    #[test]
    fn test_empty_payload_is_an_error() {
        let image = GrayImage::new(1, 1);
        let result = Thumbnail::encode(&image, &FixedBytes(Vec::new()));
        assert!(matches!(result, Err(EngraveError::ThumbnailEncoding(_))));
    }
}
