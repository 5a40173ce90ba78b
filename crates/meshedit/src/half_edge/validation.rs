//! Validation methods for HalfEdgeMesh.
//!
//! Provides mesh validation including:
//! - Reference checks against erased elements (dead-but-still-wired)
//! - Back-pointer and twin consistency
//! - Face cycle and vertex fan checks
//! - Stricter manifold checks for tests and importers

use std::collections::{HashMap, HashSet};

use super::types::{EdgeId, FaceId, HalfEdgeId, ValidationError, VertexId};
use super::HalfEdgeMesh;

impl HalfEdgeMesh {
    /// Validate every structural invariant of the mesh.
    ///
    /// A failure means an operator left the mesh corrupted; callers should
    /// treat it as fatal rather than try to continue editing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        // ===== References from live half-edges =====
        for (id, he) in self.half_edges.iter() {
            if self.dead_half_edges.contains(&id) {
                continue;
            }
            let owner = || format!("half-edge {id:?}");
            self.check_half_edge_ref(he.twin, &owner)?;
            self.check_half_edge_ref(he.next, &owner)?;
            self.check_ref(
                self.vertices.contains_key(he.vertex),
                self.dead_vertices.contains(&he.vertex),
                "vertex",
                &owner,
            )?;
            self.check_ref(
                self.edges.contains_key(he.edge),
                self.dead_edges.contains(&he.edge),
                "edge",
                &owner,
            )?;
            self.check_ref(
                self.faces.contains_key(he.face),
                self.dead_faces.contains(&he.face),
                "face",
                &owner,
            )?;
        }

        // ===== Twins =====
        for h in self.half_edge_ids() {
            let twin = self.twin(h);
            if self.twin(twin) != h || twin == h {
                return Err(ValidationError::TwinMismatch(h));
            }
            if self.edge_of(twin) != self.edge_of(h) {
                return Err(ValidationError::EdgeMismatch(h));
            }
            if self.origin(twin) != self.origin(self.next(h)) {
                return Err(ValidationError::DirectionMismatch(h));
            }
        }

        // ===== Back-pointers =====
        for v in self.vertex_ids() {
            let h = self.vertices[v].half_edge;
            self.check_half_edge_ref(h, &|| format!("vertex {v:?}"))?;
            if self.origin(h) != v {
                return Err(ValidationError::VertexBackPointer(v));
            }
        }

        let mut half_edges_per_edge: HashMap<EdgeId, usize> = HashMap::new();
        for h in self.half_edge_ids() {
            *half_edges_per_edge.entry(self.edge_of(h)).or_default() += 1;
        }
        for e in self.edge_ids() {
            let h = self.edges[e].half_edge;
            self.check_half_edge_ref(h, &|| format!("edge {e:?}"))?;
            if self.edge_of(h) != e || half_edges_per_edge.get(&e) != Some(&2) {
                return Err(ValidationError::EdgeBackPointer(e));
            }
        }

        // ===== Face cycles =====
        let limit = self.half_edges.len();
        let mut on_cycle = 0usize;
        for f in self.face_ids() {
            let start = self.faces[f].half_edge;
            self.check_half_edge_ref(start, &|| format!("face {f:?}"))?;
            if self.face_of(start) != f {
                return Err(ValidationError::FaceBackPointer(f));
            }

            let mut degree = 0usize;
            let mut current = start;
            loop {
                if self.face_of(current) != f || degree > limit {
                    return Err(ValidationError::BrokenCycle(f));
                }
                degree += 1;
                current = self.next(current);
                if current == start {
                    break;
                }
            }

            if !self.faces[f].is_boundary && degree < 3 {
                return Err(ValidationError::FaceTooSmall { face: f, degree });
            }
            on_cycle += degree;
        }

        let live = self.half_edge_count();
        if on_cycle != live {
            return Err(ValidationError::UnreachableHalfEdges {
                expected: live,
                actual: on_cycle,
            });
        }

        // ===== Vertex fans =====
        let mut outgoing: HashMap<VertexId, usize> = HashMap::new();
        for h in self.half_edge_ids() {
            *outgoing.entry(self.origin(h)).or_default() += 1;
        }
        for v in self.vertex_ids() {
            let expected = outgoing.get(&v).copied().unwrap_or(0);
            if expected == 0 || self.vertex_degree(v) != expected {
                return Err(ValidationError::BrokenFan(v));
            }
        }

        Ok(())
    }

    fn check_half_edge_ref(
        &self,
        h: HalfEdgeId,
        owner: &dyn Fn() -> String,
    ) -> Result<(), ValidationError> {
        self.check_ref(
            self.half_edges.contains_key(h),
            self.dead_half_edges.contains(&h),
            "half-edge",
            owner,
        )
    }

    fn check_ref(
        &self,
        exists: bool,
        dead: bool,
        kind: &'static str,
        owner: &dyn Fn() -> String,
    ) -> Result<(), ValidationError> {
        if !exists {
            return Err(ValidationError::MissingElement { owner: owner(), kind });
        }
        if dead {
            return Err(ValidationError::DeadReference { owner: owner(), kind });
        }
        Ok(())
    }

    /// Debug-only post-operator check. Logs instead of panicking so that
    /// orchestrator loops keep running while the corruption is reported.
    #[cfg(debug_assertions)]
    pub(crate) fn debug_validate(&self, operation: &str) {
        if let Err(e) = self.validate() {
            tracing::warn!("{}: left the mesh invalid: {}", operation, e);
        }
    }

    /// No-op in release builds.
    #[cfg(not(debug_assertions))]
    pub(crate) fn debug_validate(&self, _operation: &str) {}

    // =========================================================================
    // Manifold Validation
    // =========================================================================

    /// Check structural validity plus the stronger manifold conditions:
    /// 1. Every structural invariant from [`validate`](Self::validate)
    /// 2. No face visits the same vertex twice
    /// 3. No two edges join the same pair of vertices
    pub fn check_manifold(&self) -> Result<(), ManifoldError> {
        self.validate().map_err(ManifoldError::Structural)?;

        for f in self.interior_face_ids() {
            let verts = self.get_face_vertices(f);
            let unique: HashSet<VertexId> = verts.iter().copied().collect();
            if unique.len() != verts.len() {
                return Err(ManifoldError::DegenerateFace {
                    face_id: f,
                    degree: verts.len(),
                    distinct: unique.len(),
                });
            }
        }

        let mut seen: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();
        for e in self.edge_ids() {
            let h = self.edges[e].half_edge;
            let (a, b) = (self.origin(h), self.origin(self.twin(h)));
            let key = if a < b { (a, b) } else { (b, a) };
            if let Some(&first) = seen.get(&key) {
                return Err(ManifoldError::DuplicateEdge {
                    first,
                    second: e,
                });
            }
            seen.insert(key, e);
        }

        Ok(())
    }
}

/// Error types for manifold validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifoldError {
    /// A structural invariant is broken
    Structural(ValidationError),
    /// A face passes through the same vertex more than once
    DegenerateFace {
        face_id: FaceId,
        degree: usize,
        distinct: usize,
    },
    /// Two edges connect the same pair of vertices
    DuplicateEdge { first: EdgeId, second: EdgeId },
}

impl std::fmt::Display for ManifoldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structural(e) => write!(f, "Invalid structure: {}", e),
            Self::DegenerateFace {
                face_id,
                degree,
                distinct,
            } => {
                write!(
                    f,
                    "Degenerate face {:?}: {} corners but only {} distinct vertices",
                    face_id, degree, distinct
                )
            }
            Self::DuplicateEdge { first, second } => {
                write!(f, "Edges {:?} and {:?} join the same vertices", first, second)
            }
        }
    }
}

impl std::error::Error for ManifoldError {}
