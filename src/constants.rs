pub(crate) type Float = f64;

/// Bits reserved per cell in the node-state arrays. Every model fits its
/// directions into one stride, so a cell occupies exactly one byte.
pub const STRIDE: usize = 8;

pub const SPATIAL_DIM: usize = 2;

pub(crate) const DENSITY_EPSILON: Float = 1e-6;

pub(crate) const DEFAULT_TILE_CELLS: usize = 4096;
