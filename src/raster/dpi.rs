//! Resolution metadata probing
//!
//! The `image` crate decodes pixels but drops physical resolution, so the
//! density is read straight from the container: the `pHYs` chunk of a PNG,
//! the JFIF APP0 header of a JPEG or the info header of a BMP. Anything
//! else has no DPI.

use super::Dpi;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const INCHES_PER_METER: f64 = 0.0254;
const CM_PER_INCH: f64 = 2.54;

/// Read the DPI recorded in an encoded image, if any
pub fn probe_dpi(bytes: &[u8]) -> Option<Dpi> {
    if bytes.starts_with(&PNG_SIGNATURE) {
        png_dpi(&bytes[PNG_SIGNATURE.len()..])
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        jfif_dpi(&bytes[2..])
    } else if bytes.starts_with(b"BM") {
        bmp_dpi(bytes)
    } else {
        None
    }
}

fn be_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn le_i32(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Walk PNG chunks until `pHYs`; it must precede the first `IDAT`
fn png_dpi(mut chunks: &[u8]) -> Option<Dpi> {
    while chunks.len() >= 8 {
        let length = be_u32(chunks) as usize;
        let kind = &chunks[4..8];
        let body = chunks.get(8..8 + length)?;

        match kind {
            b"pHYs" if length == 9 => {
                // Unit 1 is pixels per metre; unit 0 only carries an aspect ratio
                if body[8] != 1 {
                    return None;
                }
                return Some(Dpi {
                    x: be_u32(&body[0..4]) as f64 * INCHES_PER_METER,
                    y: be_u32(&body[4..8]) as f64 * INCHES_PER_METER,
                });
            }
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }

        // length + type + data + crc
        chunks = chunks.get(12 + length..)?;
    }
    None
}

/// Pixels per metre from a BITMAPINFOHEADER (or any larger DIB header).
///
/// The old 12-byte core header has no resolution fields. Zero or negative
/// values mean unspecified.
fn bmp_dpi(bytes: &[u8]) -> Option<Dpi> {
    // 14-byte file header, then the DIB header
    let dib = bytes.get(14..)?;
    if dib.len() < 32 || le_u32(dib) < 40 {
        return None;
    }

    let x = le_i32(&dib[24..28]);
    let y = le_i32(&dib[28..32]);
    if x <= 0 || y <= 0 {
        return None;
    }

    Some(Dpi {
        x: x as f64 * INCHES_PER_METER,
        y: y as f64 * INCHES_PER_METER,
    })
}

/// Walk JPEG marker segments looking for a JFIF APP0 header
fn jfif_dpi(mut segments: &[u8]) -> Option<Dpi> {
    while segments.len() >= 4 {
        if segments[0] != 0xFF {
            return None;
        }
        let marker = segments[1];
        // Start of scan: no more header segments
        if marker == 0xDA {
            return None;
        }
        let length = be_u16(&segments[2..4]) as usize;
        let body = segments.get(4..2 + length)?;

        if marker == 0xE0 && body.len() >= 12 && body.starts_with(b"JFIF\0") {
            let units = body[7];
            let x = be_u16(&body[8..10]) as f64;
            let y = be_u16(&body[10..12]) as f64;
            return match units {
                1 => Some(Dpi { x, y }),
                2 => Some(Dpi {
                    x: x * CM_PER_INCH,
                    y: y * CM_PER_INCH,
                }),
                _ => None,
            };
        }

        segments = segments.get(2 + length..)?;
    }
    None
}
