use glam::{Vec2, Vec3};
use terrastream_assets::{Heightmap, SplatWeights};

/// Tile size every splat layer is registered with.
pub const SPLAT_TILE_SIZE: Vec2 = Vec2::new(24.0, 24.0);

/// Opaque handle to a layer texture owned by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub String);

/// One blend layer of a terrain surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SplatLayer {
    pub texture: TextureHandle,
    pub tile_size: Vec2,
}

/// Parameters for allocating a terrain surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceDesc {
    pub name: String,
    /// Extent in world units: `(cell, cell / 4, cell)`.
    pub size: Vec3,
    pub heightmap_resolution: usize,
    pub alphamap_resolution: usize,
    /// Initial world position.
    pub position: Vec3,
}

/// Engine-side terrain surface that decoded tile data is pushed into.
///
/// The streaming grid never renders; it only writes heights and weights and
/// moves surfaces around. Offsets are in samples.
pub trait TerrainSurface {
    fn create(desc: &SurfaceDesc) -> Self
    where
        Self: Sized;

    fn set_heights(&mut self, x_offset: usize, y_offset: usize, heights: &Heightmap);

    fn alpha_weights(&self, x_offset: usize, y_offset: usize, width: usize, height: usize) -> SplatWeights;

    fn set_alpha_weights(&mut self, x_offset: usize, y_offset: usize, weights: &SplatWeights);

    fn set_splat_layers(&mut self, layers: &[SplatLayer]);

    fn translate(&mut self, delta: Vec3);

    fn position(&self) -> Vec3;
}

/// In-memory terrain surface.
///
/// Keeps the last written data and counts writes so callers can observe
/// what the grid did without a renderer attached.
#[derive(Debug, Clone)]
pub struct Heightfield {
    name: String,
    size: Vec3,
    position: Vec3,
    heights: Heightmap,
    alpha: SplatWeights,
    layers: Vec<SplatLayer>,
    height_writes: usize,
    alpha_writes: usize,
}

impl Heightfield {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> Vec3 {
        self.size
    }

    pub fn heights(&self) -> &Heightmap {
        &self.heights
    }

    pub fn alpha(&self) -> &SplatWeights {
        &self.alpha
    }

    pub fn layers(&self) -> &[SplatLayer] {
        &self.layers
    }

    pub fn height_writes(&self) -> usize {
        self.height_writes
    }

    pub fn alpha_writes(&self) -> usize {
        self.alpha_writes
    }
}

impl TerrainSurface for Heightfield {
    fn create(desc: &SurfaceDesc) -> Self {
        Self {
            name: desc.name.clone(),
            size: desc.size,
            position: desc.position,
            heights: Heightmap::blank(desc.heightmap_resolution),
            alpha: SplatWeights::new(desc.alphamap_resolution, desc.alphamap_resolution),
            layers: Vec::new(),
            height_writes: 0,
            alpha_writes: 0,
        }
    }

    fn set_heights(&mut self, x_offset: usize, y_offset: usize, heights: &Heightmap) {
        let r = self.heights.resolution();
        for row in 0..heights.resolution() {
            for col in 0..heights.resolution() {
                let (dst_row, dst_col) = (y_offset + row, x_offset + col);
                if dst_row < r && dst_col < r {
                    self.heights.set(dst_row, dst_col, heights.get(row, col));
                }
            }
        }
        self.height_writes += 1;
    }

    fn alpha_weights(&self, x_offset: usize, y_offset: usize, width: usize, height: usize) -> SplatWeights {
        self.alpha.region(x_offset, y_offset, width, height)
    }

    fn set_alpha_weights(&mut self, x_offset: usize, y_offset: usize, weights: &SplatWeights) {
        self.alpha
            .grow(x_offset + weights.width(), y_offset + weights.height());
        if let Err(err) = self.alpha.merge(x_offset, y_offset, weights) {
            tracing::error!(%err, "alpha write rejected");
            return;
        }
        self.alpha_writes += 1;
    }

    fn set_splat_layers(&mut self, layers: &[SplatLayer]) {
        self.layers = layers.to_vec();
    }

    fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    fn position(&self) -> Vec3 {
        self.position
    }
}
