use crate::geometry::CellGeometry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Edge length of one cell in local (unzoomed) pixels.
    pub cell_size: f32,
    pub pixel_ratio: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Number of previous path stores kept for undo.
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cell_size: 48.0,
            pixel_ratio: 1.0,
            min_scale: 0.5,
            max_scale: 4.0,
            history_limit: 100,
        }
    }
}

impl EngineConfig {
    pub fn geometry(&self) -> CellGeometry {
        CellGeometry::new(self.cell_size, self.pixel_ratio)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !positive(self.cell_size) {
            anyhow::bail!("cell_size must be positive, got {}", self.cell_size);
        }
        if !positive(self.pixel_ratio) {
            anyhow::bail!("pixel_ratio must be positive, got {}", self.pixel_ratio);
        }
        if !positive(self.min_scale) || self.min_scale > self.max_scale {
            anyhow::bail!(
                "scale bounds must satisfy 0 < min_scale <= max_scale, got {}..{}",
                self.min_scale,
                self.max_scale
            );
        }
        Ok(())
    }
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}
