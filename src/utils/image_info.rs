//! Image format and dimension sniffing.
//!
//! Reads only the container headers: the PNG `IHDR` chunk, the first JPEG
//! start-of-frame segment, and the WebP `VP8 `, `VP8L` or `VP8X` chunk. Pixel
//! data is never decoded.

use crate::domain::entities::ImageType;

/// Format and size of an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub image_type: ImageType,
    pub width: u32,
    pub height: u32,
}

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Detects the image type and dimensions of `data`.
///
/// Returns `None` for unsupported formats or truncated headers.
pub fn sniff(data: &[u8]) -> Option<ImageInfo> {
    if data.starts_with(PNG_SIGNATURE) {
        return sniff_png(data);
    }
    if data.starts_with(&[0xFF, 0xD8]) {
        return sniff_jpeg(data);
    }
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return sniff_webp(data);
    }
    None
}

fn be_u16(data: &[u8], at: usize) -> Option<u32> {
    let b = data.get(at..at + 2)?;
    Some(u32::from(u16::from_be_bytes([b[0], b[1]])))
}

fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    let b = data.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn le_u16(data: &[u8], at: usize) -> Option<u32> {
    let b = data.get(at..at + 2)?;
    Some(u32::from(u16::from_le_bytes([b[0], b[1]])))
}

fn le_u24(data: &[u8], at: usize) -> Option<u32> {
    let b = data.get(at..at + 3)?;
    Some(u32::from(b[0]) | u32::from(b[1]) << 8 | u32::from(b[2]) << 16)
}

fn sniff_png(data: &[u8]) -> Option<ImageInfo> {
    if data.get(12..16)? != b"IHDR" {
        return None;
    }
    let width = be_u32(data, 16)?;
    let height = be_u32(data, 20)?;
    if width == 0 || height == 0 {
        return None;
    }
    Some(ImageInfo {
        image_type: ImageType::Png,
        width,
        height,
    })
}

fn sniff_jpeg(data: &[u8]) -> Option<ImageInfo> {
    let mut pos = 2;

    loop {
        if *data.get(pos)? != 0xFF {
            return None;
        }
        while *data.get(pos)? == 0xFF {
            pos += 1;
        }
        let marker = *data.get(pos)?;
        pos += 1;

        match marker {
            // standalone markers carry no length
            0x01 | 0xD0..=0xD7 => continue,
            0xD9 | 0xDA => return None,
            0xC0..=0xCF if marker != 0xC4 && marker != 0xC8 && marker != 0xCC => {
                // length(2) precision(1) height(2) width(2)
                let height = be_u16(data, pos + 3)?;
                let width = be_u16(data, pos + 5)?;
                if width == 0 || height == 0 {
                    return None;
                }
                return Some(ImageInfo {
                    image_type: ImageType::Jpeg,
                    width,
                    height,
                });
            }
            _ => {
                let len = be_u16(data, pos)? as usize;
                if len < 2 {
                    return None;
                }
                pos += len;
            }
        }
    }
}

fn sniff_webp(data: &[u8]) -> Option<ImageInfo> {
    let (width, height) = match data.get(12..16)? {
        b"VP8 " => {
            if data.get(23..26)? != [0x9D, 0x01, 0x2A] {
                return None;
            }
            (le_u16(data, 26)? & 0x3FFF, le_u16(data, 28)? & 0x3FFF)
        }
        b"VP8L" => {
            if *data.get(20)? != 0x2F {
                return None;
            }
            let b = data.get(21..25)?;
            let (b0, b1, b2, b3) = (
                u32::from(b[0]),
                u32::from(b[1]),
                u32::from(b[2]),
                u32::from(b[3]),
            );
            let width = 1 + (b0 | (b1 & 0x3F) << 8);
            let height = 1 + (b1 >> 6 | b2 << 2 | (b3 & 0x0F) << 10);
            (width, height)
        }
        b"VP8X" => (1 + le_u24(data, 24)?, 1 + le_u24(data, 27)?),
        _ => return None,
    };

    if width == 0 || height == 0 {
        return None;
    }

    Some(ImageInfo {
        image_type: ImageType::Webp,
        width,
        height,
    })
}
