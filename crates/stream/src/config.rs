use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use terrastream_assets::{AssetError, SPLAT_CHANNELS};

/// Errors from loading or validating a [`GridConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What a cell does when its tile cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTilePolicy {
    /// Log and keep the previous height and splat content.
    #[default]
    Retain,
    /// Replace the content with a flat placeholder tile.
    Blank,
    /// Surface the error to the caller of `tick`.
    Fail,
}

/// Retry schedule for transient I/O failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total tries per request, including the first. Zero is treated as one.
    pub attempts: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            backoff_ms: 0,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based), saturating at
    /// [`Duration::MAX`].
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32
            .checked_shl(retry.saturating_sub(1))
            .unwrap_or(u32::MAX);
        Duration::from_millis(self.backoff_ms).saturating_mul(factor)
    }

    /// Run `op`, retrying while it fails with a transient error.
    pub fn run<T>(
        &self,
        what: &str,
        mut op: impl FnMut() -> Result<T, AssetError>,
    ) -> Result<T, AssetError> {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Err(e) if e.is_transient() && attempt < attempts => {
                    tracing::debug!(what, attempt, error = %e, "transient load failure, retrying");
                    let delay = self.backoff(attempt);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

/// Streaming grid configuration.
///
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Tile-set subdirectory under the source root.
    pub tile_set: String,
    /// Minimum edge length of the visible area. Rounded up to an odd cell count.
    pub min_visible_size: u32,
    /// Edge length of one cell in world units.
    pub cell_size: u32,
    /// Samples per heightmap edge. Must match the authored `.raw` files.
    pub heightmap_resolution: usize,
    /// Samples per alpha-map edge of a new surface.
    pub alphamap_resolution: usize,
    /// Splat layer textures, at most four.
    pub textures: Vec<String>,
    /// Height the viewer is placed at above the center cell.
    pub viewer_height: f32,
    /// Initial value of both tile index counters.
    pub start_index: i32,
    /// Upper clamp of the tile index counters.
    pub index_limit: i32,
    /// Number of authored rows; guards forward movement when set.
    pub authored_rows: Option<i32>,
    pub missing_tile: MissingTilePolicy,
    pub retry: RetryPolicy,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_set: "Desert4".into(),
            min_visible_size: 1536,
            cell_size: 512,
            heightmap_resolution: 513,
            alphamap_resolution: 512,
            textures: Vec::new(),
            viewer_height: 256.0,
            start_index: 1,
            index_limit: 99,
            authored_rows: None,
            missing_tile: MissingTilePolicy::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl GridConfig {
    /// Load from a YAML or JSON file (chosen by extension) and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&text)?,
            _ => serde_yaml::from_str(&text)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::Invalid("cell_size must be positive".into()));
        }
        if self.min_visible_size == 0 {
            return Err(ConfigError::Invalid(
                "min_visible_size must be positive".into(),
            ));
        }
        if self.heightmap_resolution < 2 {
            return Err(ConfigError::Invalid(format!(
                "heightmap_resolution must be at least 2, got {}",
                self.heightmap_resolution
            )));
        }
        if self.alphamap_resolution == 0 {
            return Err(ConfigError::Invalid(
                "alphamap_resolution must be positive".into(),
            ));
        }
        if self.textures.len() > SPLAT_CHANNELS {
            return Err(ConfigError::Invalid(format!(
                "at most {SPLAT_CHANNELS} textures, got {}",
                self.textures.len()
            )));
        }
        if self.index_limit < 0 {
            return Err(ConfigError::Invalid("index_limit must not be negative".into()));
        }
        Ok(())
    }

    /// Number of cells along one edge: the smallest odd count covering
    /// `min_visible_size`.
    pub fn cells_wide(&self) -> usize {
        cells_wide(self.min_visible_size, self.cell_size)
    }
}

/// Smallest odd `n` with `n * cell_size >= min_visible_size`.
pub fn cells_wide(min_visible_size: u32, cell_size: u32) -> usize {
    let n = min_visible_size.div_ceil(cell_size) as usize;
    if n % 2 == 0 { n + 1 } else { n }
}
