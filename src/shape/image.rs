use crate::error::{SceneError, SceneResult};

/// Decoded bitmap in straight-alpha RGBA8, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> SceneResult<Self> {
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidData(
                "image size must be > 0".to_owned(),
            ));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(SceneError::InvalidData(format!(
                "image buffer holds {} bytes, expected {expected}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decodes an encoded image (PNG or JPEG).
    pub fn decode(bytes: &[u8]) -> SceneResult<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|err| SceneError::InvalidData(format!("failed to decode image: {err}")))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        Self::from_rgba8(width, height, decoded.into_raw())
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of one pixel; `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let slice = self.pixels.get(offset..offset + 4)?;
        Some([slice[0], slice[1], slice[2], slice[3]])
    }
}
