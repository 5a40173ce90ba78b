/// Determinant below which the quadric 3x3 system is treated as singular.
pub const QUADRIC_DET_EPSILON: f32 = 1e-8;

/// Welding grid used when importing triangle soups (1 / quantization step).
pub const WELD_QUANTIZATION: f32 = 1_000_000.0;

/// Minimum valence kept around a vertex by the orchestrators' collapses.
pub const MIN_COLLAPSE_VALENCE: usize = 3;

/// Target valence for interior vertices of a triangle mesh.
pub const REGULAR_VALENCE: usize = 6;
