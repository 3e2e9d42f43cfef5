/// Tile number of the tile at UV coordinate (0, 0).
pub const FIRST_TILE_NUMBER: u32 = 1001;

/// Tiles per row in the tile numbering scheme.
pub const TILES_PER_ROW: u32 = 10;

/// Depth step between two adjacent regular layers.
pub const LAYER_DEPTH_STEP: f64 = 0.01;

/// Fixed depth of overlay layers, above the band used by regular layers.
pub const OVERLAY_DEPTH: f64 = 490.0;

/// Distance used to nudge test points and ray origins off the vertex being snapped.
pub const SNAP_NUDGE_OFFSET: f64 = 0.001;

/// Default length of the ray cast by directional edge snapping.
pub const DEFAULT_RAY_LENGTH: f64 = 1000.0;
