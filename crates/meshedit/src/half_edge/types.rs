//! Type definitions for the halfedge mesh data structure.

use glam::Vec3;

slotmap::new_key_type! {
    /// Generation-tagged vertex handle
    pub struct VertexId;
    /// Generation-tagged edge handle
    pub struct EdgeId;
    /// Generation-tagged half-edge handle
    pub struct HalfEdgeId;
    /// Generation-tagged face handle (interior faces and boundary loops)
    pub struct FaceId;
}

/// A vertex in the halfedge mesh
#[derive(Debug, Clone, Default)]
pub struct Vertex {
    pub position: Vec3,
    /// One half-edge originating at this vertex
    pub half_edge: HalfEdgeId,
    /// Set on vertices inserted by bisection (used by Loop subdivision)
    pub is_new: bool,
    /// Staging slot for global rebuild and subdivision passes
    pub new_position: Vec3,
}

/// An undirected edge, owning two half-edges
#[derive(Debug, Clone, Default)]
pub struct Edge {
    /// One of the two half-edges of this edge
    pub half_edge: HalfEdgeId,
    /// Set on edges inserted inside a face (split diagonals, triangulation)
    pub is_new: bool,
    /// Staging slot for the edge point in subdivision
    pub new_position: Vec3,
}

/// A half-edge in the mesh
///
/// Every half-edge has a twin. Edges on the mesh boundary are paired with a
/// half-edge that belongs to a boundary loop face.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfEdge {
    /// The oppositely directed half-edge of the same edge
    pub twin: HalfEdgeId,
    /// The next half-edge around the face (counter-clockwise)
    pub next: HalfEdgeId,
    /// The vertex this half-edge originates from
    pub vertex: VertexId,
    pub edge: EdgeId,
    pub face: FaceId,
}

/// A face (polygon) or a boundary loop
#[derive(Debug, Clone, Default)]
pub struct Face {
    /// One half-edge on the boundary of this face
    pub half_edge: HalfEdgeId,
    /// True for the loops that close off open mesh boundaries
    pub is_boundary: bool,
    /// Staging slot for the face point in subdivision
    pub new_position: Vec3,
}

/// Reason a local operator declined to modify the mesh.
///
/// A denial is an expected outcome. The mesh is left exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error("element lies on the mesh boundary")]
    OnBoundary,
    #[error("degree {degree} is below the required minimum of {minimum}")]
    DegreeTooLow { degree: usize, minimum: usize },
    #[error("an incident face is not a triangle")]
    NonTriangularFace,
    #[error("operation would produce degenerate topology")]
    DegenerateResult,
    #[error("handle refers to an erased or unknown element")]
    StaleHandle,
    #[error("expected {expected} start positions, got {actual}")]
    PositionCountMismatch { expected: usize, actual: usize },
    #[error("mesh is not a triangle mesh")]
    NotTriangleMesh,
}

/// Outcome of a local operator
pub type EditResult<T> = Result<T, Denial>;

/// Errors that can occur while building a halfedge mesh from polygons
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HalfEdgeError {
    #[error("Polygon {polygon} references vertex {index}, but only {count} positions exist")]
    InvalidIndex {
        polygon: usize,
        index: usize,
        count: usize,
    },
    #[error("Polygon {0} has fewer than three distinct corners")]
    DegenerateFace(usize),
    #[error("Directed edge {0} -> {1} is used by more than one polygon")]
    NonManifoldEdge(usize, usize),
    #[error("Vertex {0} does not have a single fan of faces")]
    NonManifoldVertex(usize),
    #[error("Vertex {0} is not used by any polygon")]
    IsolatedVertex(usize),
    #[error("Operation requires a mesh without boundary")]
    HasBoundary,
    #[cfg(feature = "bevy")]
    #[error("Mesh has no position attribute")]
    NoPositions,
    #[cfg(feature = "bevy")]
    #[error("Mesh has no indices")]
    NoIndices,
}

/// A broken invariant found by [`HalfEdgeMesh::validate`](super::HalfEdgeMesh::validate).
///
/// These indicate a bug in an operator, never a user error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{owner} references a {kind} that no longer exists")]
    MissingElement { owner: String, kind: &'static str },
    #[error("live {owner} references an erased {kind}")]
    DeadReference { owner: String, kind: &'static str },
    #[error("half-edge {0:?}: twin does not point back")]
    TwinMismatch(HalfEdgeId),
    #[error("half-edge {0:?}: twin belongs to a different edge")]
    EdgeMismatch(HalfEdgeId),
    #[error("half-edge {0:?}: twin does not start at this half-edge's destination")]
    DirectionMismatch(HalfEdgeId),
    #[error("vertex {0:?}: stored half-edge does not originate here")]
    VertexBackPointer(VertexId),
    #[error("edge {0:?}: stored half-edge belongs to another edge")]
    EdgeBackPointer(EdgeId),
    #[error("face {0:?}: stored half-edge belongs to another face")]
    FaceBackPointer(FaceId),
    #[error("face {0:?}: next cycle does not close")]
    BrokenCycle(FaceId),
    #[error("face {face:?} has degree {degree}")]
    FaceTooSmall { face: FaceId, degree: usize },
    #[error("{actual} of {expected} live half-edges lie on a face cycle")]
    UnreachableHalfEdges { expected: usize, actual: usize },
    #[error("vertex {0:?}: rotation does not visit every outgoing half-edge")]
    BrokenFan(VertexId),
}
