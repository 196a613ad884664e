//! Splatmap codec: RGBA image to per-channel blend weights.
//!
//! Each of the four channels carries the weight of one terrain layer. The
//! image is mirrored on x and transposed on the way in; authored splat
//! textures depend on this exact orientation.

use crate::{AssetError, PixelBuffer};

/// Number of blend layers a splatmap encodes.
pub const SPLAT_CHANNELS: usize = 4;

/// A `width x height x 4` volume of layer weights.
#[derive(Debug, Clone, PartialEq)]
pub struct SplatWeights {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl SplatWeights {
    /// All weights zero.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height * SPLAT_CHANNELS],
        }
    }

    /// A square volume fully weighted to layer 0.
    pub fn blank(width: usize) -> Self {
        let mut weights = Self::new(width, width);
        for cell in weights.data.chunks_exact_mut(SPLAT_CHANNELS) {
            cell[0] = 1.0;
        }
        weights
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[self.index(x, y, z)]
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, weight: f32) {
        let i = self.index(x, y, z);
        self.data[i] = weight;
    }

    /// Copy a sub-volume out, starting at `(x_offset, y_offset)`.
    ///
    /// The region is clipped to the volume; cells outside it read as zero.
    pub fn region(&self, x_offset: usize, y_offset: usize, width: usize, height: usize) -> Self {
        let mut out = Self::new(width, height);
        for x in 0..width.min(self.width.saturating_sub(x_offset)) {
            for y in 0..height.min(self.height.saturating_sub(y_offset)) {
                for z in 0..SPLAT_CHANNELS {
                    out.set(x, y, z, self.get(x_offset + x, y_offset + y, z));
                }
            }
        }
        out
    }

    /// Enlarge to at least `width x height`. Existing weights keep their
    /// `(x, y)`; new cells are zero.
    pub fn grow(&mut self, width: usize, height: usize) {
        let width = width.max(self.width);
        let height = height.max(self.height);
        if width == self.width && height == self.height {
            return;
        }
        let mut grown = Self::new(width, height);
        for x in 0..self.width {
            let src = self.index(x, 0, 0);
            let dst = grown.index(x, 0, 0);
            let len = self.height * SPLAT_CHANNELS;
            grown.data[dst..dst + len].copy_from_slice(&self.data[src..src + len]);
        }
        *self = grown;
    }

    /// Write `other` into this volume at `(x_offset, y_offset)`.
    pub fn merge(&mut self, x_offset: usize, y_offset: usize, other: &SplatWeights) -> Result<(), AssetError> {
        check_fits(self, x_offset, y_offset, other.width, other.height)?;
        for x in 0..other.width {
            for y in 0..other.height {
                for z in 0..SPLAT_CHANNELS {
                    self.set(x_offset + x, y_offset + y, z, other.get(x, y, z));
                }
            }
        }
        Ok(())
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < self.width && y < self.height && z < SPLAT_CHANNELS,
            "weight ({x}, {y}, {z}) out of range for {}x{}",
            self.width,
            self.height
        );
        (x * self.height + y) * SPLAT_CHANNELS + z
    }
}

/// Decode a square splat image into a fresh weight volume.
pub fn decode(pixels: &PixelBuffer) -> Result<SplatWeights, AssetError> {
    let mut weights = SplatWeights::new(pixels.width(), pixels.width());
    decode_into(pixels, &mut weights, (0, 0))?;
    Ok(weights)
}

/// Decode a square splat image into `target` at `offset`.
///
/// `target[ox + x][oy + y][z] = pixels[(width-1-x) * width + y][z]`.
/// Nothing is written unless the whole image fits.
pub fn decode_into(
    pixels: &PixelBuffer,
    target: &mut SplatWeights,
    offset: (usize, usize),
) -> Result<(), AssetError> {
    let width = pixels.width();
    if pixels.height() != width {
        return Err(AssetError::DimensionMismatch(format!(
            "splatmap must be square, got {}x{}",
            width,
            pixels.height()
        )));
    }
    if pixels.len() < width * width {
        return Err(AssetError::IncompleteData {
            expected: width * width,
            actual: pixels.len(),
        });
    }
    let (ox, oy) = offset;
    check_fits(target, ox, oy, width, width)?;

    for z in 0..SPLAT_CHANNELS {
        for y in 0..width {
            for x in 0..width {
                let source = (width - 1 - x) * width + y;
                target.set(ox + x, oy + y, z, pixels.channel(source, z));
            }
        }
    }
    Ok(())
}

fn check_fits(
    target: &SplatWeights,
    x_offset: usize,
    y_offset: usize,
    width: usize,
    height: usize,
) -> Result<(), AssetError> {
    if x_offset + width > target.width || y_offset + height > target.height {
        return Err(AssetError::DimensionMismatch(format!(
            "{width}x{height} at ({x_offset}, {y_offset}) exceeds {}x{} volume",
            target.width, target.height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> PixelBuffer {
        // p0..p3 in texture order, each channel tagged with pixel index and channel
        let px = |i: usize| {
            [
                i as f32 / 10.0,
                i as f32 / 10.0 + 0.01,
                i as f32 / 10.0 + 0.02,
                i as f32 / 10.0 + 0.03,
            ]
        };
        PixelBuffer::new(2, 2, (0..4).map(px).collect()).unwrap()
    }

    #[test]
    fn two_by_two_is_mirrored_and_transposed() {
        let w = decode(&two_by_two()).unwrap();
        // [x][y] reads pixel (1 - x) * 2 + y
        assert_eq!(w.get(0, 0, 0), 0.2);
        assert_eq!(w.get(0, 1, 0), 0.3);
        assert_eq!(w.get(1, 0, 0), 0.0);
        assert_eq!(w.get(1, 1, 0), 0.1);
        assert_eq!(w.get(0, 0, 3), 0.2 + 0.03);
        assert_eq!(w.get(1, 1, 2), 0.1 + 0.02);
    }

    #[test]
    fn non_square_is_rejected() {
        let pixels = PixelBuffer::new(2, 1, vec![[0.0; 4]; 2]).unwrap();
        assert!(matches!(
            decode(&pixels),
            Err(AssetError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn decode_into_honours_offset() {
        let mut target = SplatWeights::new(3, 3);
        decode_into(&two_by_two(), &mut target, (1, 1)).unwrap();
        assert_eq!(target.get(1, 1, 0), 0.2);
        assert_eq!(target.get(2, 2, 0), 0.1);
        assert_eq!(target.get(0, 0, 0), 0.0);
    }

    #[test]
    fn decode_into_out_of_range_writes_nothing() {
        let mut target = SplatWeights::blank(2);
        let before = target.clone();
        assert!(decode_into(&two_by_two(), &mut target, (1, 0)).is_err());
        assert_eq!(target, before);
    }

    #[test]
    fn blank_weights_select_first_layer() {
        let w = SplatWeights::blank(3);
        assert_eq!(w.get(2, 1, 0), 1.0);
        assert_eq!(w.get(2, 1, 1), 0.0);
    }

    #[test]
    fn region_and_merge() {
        let mut whole = SplatWeights::new(4, 4);
        let patch = SplatWeights::blank(2);
        whole.merge(2, 2, &patch).unwrap();
        assert_eq!(whole.get(3, 3, 0), 1.0);
        assert_eq!(whole.region(2, 2, 2, 2), patch);
        assert!(whole.merge(3, 3, &patch).is_err());
    }

    #[test]
    fn grow_keeps_weights_in_place() {
        let mut w = SplatWeights::new(2, 3);
        w.set(1, 2, 3, 0.25);
        w.grow(4, 2);
        assert_eq!((w.width(), w.height()), (4, 3));
        assert_eq!(w.get(1, 2, 3), 0.25);
        assert_eq!(w.get(3, 2, 3), 0.0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_weight_panics() {
        let w = SplatWeights::new(2, 2);
        // (0, 2) would alias (1, 0) without the check
        w.get(0, 2, 0);
    }
}
