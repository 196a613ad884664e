//! 16-bit raw heightmap codec.
//!
//! The file format is headerless: `resolution * resolution` little-endian
//! `u16` samples, outer index x, inner index y. The resolution is never
//! stored in the file and must be supplied by the caller.

use crate::AssetError;

/// Largest raw sample value; heights are normalized against it.
const MAX_SAMPLE: f32 = 65535.0;

/// Decoded elevation raster, normalized to [0, 1].
///
/// Stored row-major: `get(row, col)`. File order is mirrored on decode so
/// that file index x lands on row `resolution - 1 - x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    resolution: usize,
    samples: Vec<f32>,
}

impl Heightmap {
    /// A flat heightmap at elevation zero.
    pub fn blank(resolution: usize) -> Self {
        Self {
            resolution,
            samples: vec![0.0; resolution * resolution],
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.samples[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, height: f32) {
        let i = self.index(row, col);
        self.samples[i] = height;
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.resolution && col < self.resolution,
            "sample ({row}, {col}) out of range for resolution {}",
            self.resolution
        );
        row * self.resolution + col
    }

    /// Row-major samples.
    pub fn flat(&self) -> &[f32] {
        &self.samples
    }

    /// Lowest and highest sample. `None` for an empty map.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.samples.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), h| (lo.min(h), hi.max(h))))
    }

    pub fn mean(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }
}

/// Number of bytes a raw heightmap of the given resolution occupies.
pub fn byte_len(resolution: usize) -> usize {
    resolution * resolution * 2
}

/// Decode raw 16-bit samples into a normalized heightmap.
///
/// Trailing bytes past `byte_len(resolution)` are ignored. A short buffer
/// fails without producing partial output.
pub fn decode(bytes: &[u8], resolution: usize) -> Result<Heightmap, AssetError> {
    let expected = byte_len(resolution);
    if bytes.len() < expected {
        return Err(AssetError::IncompleteData {
            expected,
            actual: bytes.len(),
        });
    }

    let mut map = Heightmap::blank(resolution);
    for (i, pair) in bytes[..expected].chunks_exact(2).enumerate() {
        let x = i / resolution;
        let y = i % resolution;
        let raw = u16::from_le_bytes([pair[0], pair[1]]);
        map.set(resolution - 1 - x, y, raw as f32 / MAX_SAMPLE);
    }
    Ok(map)
}

/// Encode a heightmap back into the raw file layout.
///
/// Inverse of [`decode`] up to 16-bit quantization. Samples outside [0, 1]
/// are clamped.
pub fn encode(map: &Heightmap) -> Vec<u8> {
    let r = map.resolution();
    let mut out = Vec::with_capacity(byte_len(r));
    for x in 0..r {
        for y in 0..r {
            let h = map.get(r - 1 - x, y).clamp(0.0, 1.0);
            let raw = (h * MAX_SAMPLE).round() as u16;
            out.extend_from_slice(&raw.to_le_bytes());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bytes_decode_to_zero() {
        for r in [1, 2, 3, 17] {
            let map = decode(&vec![0u8; byte_len(r)], r).unwrap();
            assert!(map.flat().iter().all(|&h| h == 0.0));
            assert_eq!(map.flat().len(), r * r);
        }
    }

    #[test]
    fn saturated_bytes_decode_to_one() {
        for r in [1, 2, 5] {
            let map = decode(&vec![0xFFu8; byte_len(r)], r).unwrap();
            assert!(map.flat().iter().all(|&h| (h - 1.0).abs() <= 1.0 / 65535.0));
        }
    }

    #[test]
    fn short_buffer_is_incomplete() {
        let err = decode(&[0u8; 7], 2).unwrap_err();
        match err {
            AssetError::IncompleteData { expected, actual } => {
                assert_eq!(expected, 8);
                assert_eq!(actual, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut bytes = vec![0u8; byte_len(2)];
        bytes.extend_from_slice(&[0xFF; 10]);
        let map = decode(&bytes, 2).unwrap();
        assert_eq!(map.min_max(), Some((0.0, 0.0)));
    }

    #[test]
    fn samples_are_little_endian() {
        // single sample: low=0x01, high=0x02 -> 0x0201 = 513
        let map = decode(&[0x01, 0x02], 1).unwrap();
        assert!((map.get(0, 0) - 513.0 / 65535.0).abs() < 1e-9);
    }

    #[test]
    fn outer_index_is_mirrored_onto_rows() {
        // R = 2, file order: (x0,y0) (x0,y1) (x1,y0) (x1,y1)
        let raw: [u16; 4] = [100, 200, 300, 400];
        let bytes: Vec<u8> = raw.iter().flat_map(|v| v.to_le_bytes()).collect();
        let map = decode(&bytes, 2).unwrap();

        let h = |v: u16| v as f32 / 65535.0;
        // x = 0 lands on the last row
        assert_eq!(map.get(1, 0), h(100));
        assert_eq!(map.get(1, 1), h(200));
        assert_eq!(map.get(0, 0), h(300));
        assert_eq!(map.get(0, 1), h(400));
    }

    #[test]
    fn decode_is_deterministic() {
        let bytes: Vec<u8> = (0..byte_len(4)).map(|i| (i * 37 % 251) as u8).collect();
        assert_eq!(decode(&bytes, 4).unwrap(), decode(&bytes, 4).unwrap());
    }

    #[test]
    fn encode_restores_file_bytes() {
        let bytes: Vec<u8> = (0..byte_len(3)).map(|i| (i * 13 % 256) as u8).collect();
        let map = decode(&bytes, 3).unwrap();
        assert_eq!(encode(&map), bytes);
    }

    #[test]
    fn stats_over_samples() {
        let mut map = Heightmap::blank(2);
        map.set(0, 0, 0.25);
        map.set(1, 1, 0.75);
        assert_eq!(map.min_max(), Some((0.0, 0.75)));
        assert!((map.mean() - 0.25).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_sample_panics() {
        let mut map = Heightmap::blank(3);
        map.set(0, 3, 1.0);
    }
}
