use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// Encoded output format for raster export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageFormat {
    #[default]
    Png,
    /// Quality in `1..=100`.
    Jpeg { quality: u8 },
}

impl ImageFormat {
    /// Resolves `png`, `jpeg` or `jpg` (case-insensitive).
    pub fn from_name(name: &str) -> SceneResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg { quality: 90 }),
            other => Err(SceneError::InvalidData(format!(
                "unsupported image format `{other}`"
            ))),
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Encodes straight-alpha RGBA8 pixels. JPEG drops alpha after flattening
/// onto white.
pub fn encode_rgba(
    pixels: &[u8],
    width: u32,
    height: u32,
    format: ImageFormat,
) -> SceneResult<Vec<u8>> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(SceneError::Encode(format!(
            "pixel buffer holds {} bytes, expected {expected}",
            pixels.len()
        )));
    }
    let mut out = Vec::new();
    match format {
        ImageFormat::Png => {
            PngEncoder::new(&mut out)
                .write_image(pixels, width, height, ExtendedColorType::Rgba8)
                .map_err(|err| SceneError::Encode(err.to_string()))?;
        }
        ImageFormat::Jpeg { quality } => {
            let rgb: Vec<u8> = pixels
                .chunks_exact(4)
                .flat_map(|pixel| {
                    let alpha = u16::from(pixel[3]);
                    let flatten =
                        |channel: u8| ((u16::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8;
                    [flatten(pixel[0]), flatten(pixel[1]), flatten(pixel[2])]
                })
                .collect();
            JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
                .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
                .map_err(|err| SceneError::Encode(err.to_string()))?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_has_signature() {
        let bytes = encode_rgba(&[255, 0, 0, 255], 1, 1, ImageFormat::Png).expect("png");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn jpeg_has_soi_marker() {
        let pixels = vec![0u8; 8 * 8 * 4];
        let bytes =
            encode_rgba(&pixels, 8, 8, ImageFormat::Jpeg { quality: 80 }).expect("jpeg");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn rejects_short_buffer_and_unknown_names() {
        assert!(encode_rgba(&[0; 3], 1, 1, ImageFormat::Png).is_err());
        assert!(ImageFormat::from_name("gif").is_err());
        assert_eq!(ImageFormat::from_name("JPG").expect("jpg").mime_type(), "image/jpeg");
    }
}
