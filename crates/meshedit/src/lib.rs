//! Halfedge mesh editing engine
//!
//! This crate provides the topology core of a polygon mesh editor:
//! - [`half_edge`] - Arena-backed halfedge mesh plus the local operators
//!   (split, flip, collapse, erase, bevel, inset, extrude)
//! - [`positions`] - Position updaters for bevel and extrude drags
//! - [`subdivision`] - Linear and Catmull-Clark global rebuild
//! - [`loop_subdivision`] - In-place Loop subdivision of triangle meshes
//! - [`simplify`] - Quadric error simplification
//! - [`remesh`] - Isotropic remeshing
//! - [`primitives`] - Closed and open test shapes

pub mod constants;
pub mod half_edge;
pub mod loop_subdivision;
pub mod positions;
pub mod primitives;
pub mod remesh;
pub mod simplify;
pub mod subdivision;

pub use half_edge::{
    CompactionStats, Denial, EditResult, Edge, EdgeId, Face, FaceId, HalfEdge, HalfEdgeError,
    HalfEdgeId, HalfEdgeMesh, ManifoldError, TriangleBuffers, ValidationError, Vertex, VertexId,
};
pub use meshedit_config as config;
pub use remesh::RemeshStats;
pub use simplify::SimplifyReport;
pub use subdivision::SubdivisionScheme;
