use crate::AssetError;

/// RGBA image in texture-space order.
///
/// Index 0 is the bottom-left pixel; each row runs left to right and rows
/// run bottom to top. Channels are normalized to [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<[f32; 4]>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize, pixels: Vec<[f32; 4]>) -> Result<Self, AssetError> {
        if pixels.len() != width * height {
            return Err(AssetError::DimensionMismatch(format!(
                "{width}x{height} image needs {} pixels, got {}",
                width * height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from 8-bit RGBA rows stored top row first (image file order).
    pub fn from_rgba8_top_down(width: usize, height: usize, raw: &[u8]) -> Result<Self, AssetError> {
        let expected = width * height * 4;
        if raw.len() < expected {
            return Err(AssetError::IncompleteData {
                expected,
                actual: raw.len(),
            });
        }
        let mut pixels = Vec::with_capacity(width * height);
        for row in (0..height).rev() {
            let start = row * width * 4;
            for px in raw[start..start + width * 4].chunks_exact(4) {
                pixels.push([
                    px[0] as f32 / 255.0,
                    px[1] as f32 / 255.0,
                    px[2] as f32 / 255.0,
                    px[3] as f32 / 255.0,
                ]);
            }
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixel(&self, index: usize) -> [f32; 4] {
        self.pixels[index]
    }

    pub fn channel(&self, index: usize, channel: usize) -> f32 {
        self.pixels[index][channel]
    }
}
