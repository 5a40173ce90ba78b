//! Element allocation, soft deletion, accessors and compaction.

use glam::Vec3;

use super::types::{
    Denial, Edge, EdgeId, EditResult, Face, FaceId, HalfEdge, HalfEdgeId, ValidationError, Vertex,
    VertexId,
};
use super::HalfEdgeMesh;

/// Number of elements physically removed by [`HalfEdgeMesh::compact`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompactionStats {
    pub vertices: usize,
    pub edges: usize,
    pub half_edges: usize,
    pub faces: usize,
}

impl CompactionStats {
    pub fn total(&self) -> usize {
        self.vertices + self.edges + self.half_edges + self.faces
    }
}

impl HalfEdgeMesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Allocation =====
    // New elements start with null references; the caller wires them up.

    pub(crate) fn new_vertex(&mut self, position: Vec3) -> VertexId {
        self.vertices.insert(Vertex {
            position,
            new_position: position,
            ..Default::default()
        })
    }

    pub(crate) fn new_edge(&mut self) -> EdgeId {
        self.edges.insert(Edge::default())
    }

    pub(crate) fn new_half_edge(&mut self) -> HalfEdgeId {
        self.half_edges.insert(HalfEdge::default())
    }

    pub(crate) fn new_face(&mut self, is_boundary: bool) -> FaceId {
        self.faces.insert(Face {
            is_boundary,
            ..Default::default()
        })
    }

    // ===== Soft deletion =====
    // Erased elements keep their data and stay traversable until compaction.

    pub(crate) fn erase_vertex_element(&mut self, id: VertexId) {
        self.dead_vertices.insert(id);
    }

    pub(crate) fn erase_edge_element(&mut self, id: EdgeId) {
        self.dead_edges.insert(id);
    }

    pub(crate) fn erase_half_edge_element(&mut self, id: HalfEdgeId) {
        self.dead_half_edges.insert(id);
    }

    pub(crate) fn erase_face_element(&mut self, id: FaceId) {
        self.dead_faces.insert(id);
    }

    // ===== Liveness =====

    pub fn is_vertex_live(&self, id: VertexId) -> bool {
        self.vertices.contains_key(id) && !self.dead_vertices.contains(&id)
    }

    pub fn is_edge_live(&self, id: EdgeId) -> bool {
        self.edges.contains_key(id) && !self.dead_edges.contains(&id)
    }

    pub fn is_half_edge_live(&self, id: HalfEdgeId) -> bool {
        self.half_edges.contains_key(id) && !self.dead_half_edges.contains(&id)
    }

    pub fn is_face_live(&self, id: FaceId) -> bool {
        self.faces.contains_key(id) && !self.dead_faces.contains(&id)
    }

    /// Pending tombstones across all arenas
    pub fn pending_erasures(&self) -> usize {
        self.dead_vertices.len()
            + self.dead_edges.len()
            + self.dead_half_edges.len()
            + self.dead_faces.len()
    }

    // ===== Operator preconditions =====

    pub(crate) fn require_vertex(&self, id: VertexId) -> EditResult<()> {
        self.is_vertex_live(id).then_some(()).ok_or(Denial::StaleHandle)
    }

    pub(crate) fn require_edge(&self, id: EdgeId) -> EditResult<()> {
        self.is_edge_live(id).then_some(()).ok_or(Denial::StaleHandle)
    }

    pub(crate) fn require_face(&self, id: FaceId) -> EditResult<()> {
        self.is_face_live(id).then_some(()).ok_or(Denial::StaleHandle)
    }

    // ===== Public accessors (None for erased or unknown handles) =====

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.is_vertex_live(id).then(|| &self.vertices[id])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.is_edge_live(id).then(|| &self.edges[id])
    }

    pub fn half_edge(&self, id: HalfEdgeId) -> Option<&HalfEdge> {
        self.is_half_edge_live(id).then(|| &self.half_edges[id])
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.is_face_live(id).then(|| &self.faces[id])
    }

    /// Set the position of a vertex
    pub fn set_vertex_position(&mut self, id: VertexId, position: Vec3) -> bool {
        if !self.is_vertex_live(id) {
            return false;
        }
        self.vertices[id].position = position;
        true
    }

    // ===== Iteration (live elements, arena order) =====

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .keys()
            .filter(move |id| !self.dead_vertices.contains(id))
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys().filter(move |id| !self.dead_edges.contains(id))
    }

    pub fn half_edge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.half_edges
            .keys()
            .filter(move |id| !self.dead_half_edges.contains(id))
    }

    /// Live faces including boundary loops
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.keys().filter(move |id| !self.dead_faces.contains(id))
    }

    /// Live interior faces
    pub fn interior_face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.face_ids().filter(move |&id| !self.faces[id].is_boundary)
    }

    /// Live boundary loops
    pub fn boundary_loop_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.face_ids().filter(move |&id| self.faces[id].is_boundary)
    }

    // ===== Counts =====

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() - self.dead_vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len() - self.dead_edges.len()
    }

    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len() - self.dead_half_edges.len()
    }

    /// Number of interior faces (boundary loops excluded)
    pub fn face_count(&self) -> usize {
        self.interior_face_ids().count()
    }

    pub fn boundary_loop_count(&self) -> usize {
        self.boundary_loop_ids().count()
    }

    /// V - E + F, counting each boundary loop as a face
    pub fn euler_characteristic(&self) -> i64 {
        let faces = self.face_ids().count();
        self.vertex_count() as i64 - self.edge_count() as i64 + faces as i64
    }

    // ===== Finalization =====

    /// Physically remove every tombstoned element.
    ///
    /// Handles to removed elements fail their generation check afterwards.
    pub fn compact(&mut self) -> CompactionStats {
        if self.pending_erasures() == 0 {
            return CompactionStats::default();
        }

        let compact_start = std::time::Instant::now();
        tracing::debug!(
            "compact: START ({} verts, {} edges, {} half-edges, {} faces)",
            self.vertices.len(),
            self.edges.len(),
            self.half_edges.len(),
            self.faces.len()
        );

        let mut stats = CompactionStats::default();
        for id in self.dead_vertices.drain() {
            stats.vertices += usize::from(self.vertices.remove(id).is_some());
        }
        for id in self.dead_edges.drain() {
            stats.edges += usize::from(self.edges.remove(id).is_some());
        }
        for id in self.dead_half_edges.drain() {
            stats.half_edges += usize::from(self.half_edges.remove(id).is_some());
        }
        for id in self.dead_faces.drain() {
            stats.faces += usize::from(self.faces.remove(id).is_some());
        }

        tracing::debug!(
            "compact: END removed {} elements in {:.2?}",
            stats.total(),
            compact_start.elapsed()
        );
        stats
    }

    /// Validate, then compact. This is the step that makes operator
    /// results visible to renderers and other snapshot consumers.
    pub fn finalize(&mut self) -> Result<CompactionStats, ValidationError> {
        self.validate()?;
        Ok(self.compact())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use slotmap::Key;

    #[test]
    fn test_new_elements_are_placeholders() {
        let mut mesh = HalfEdgeMesh::new();
        let h = mesh.new_half_edge();
        let he = mesh.half_edge(h).unwrap();
        assert!(he.twin.is_null());
        assert!(he.next.is_null());
        assert!(he.vertex.is_null());
        let f = mesh.new_face(true);
        assert!(mesh.face(f).unwrap().is_boundary);
    }

    #[test]
    fn test_erase_is_soft_until_compact() {
        let mut mesh = primitives::tetrahedron().unwrap();
        let v = mesh.vertex_ids().next().unwrap();

        mesh.erase_vertex_element(v);
        assert!(mesh.vertex(v).is_none(), "erased vertex hidden from accessors");
        assert!(mesh.vertices.contains_key(v), "but still stored");
        assert_eq!(mesh.vertex_count(), 3);

        let stats = mesh.compact();
        assert_eq!(stats.vertices, 1);
        assert!(!mesh.vertices.contains_key(v));
        assert_eq!(mesh.pending_erasures(), 0);
    }

    #[test]
    fn test_stale_handle_after_compact() {
        let mut mesh = primitives::tetrahedron().unwrap();
        let v = mesh.vertex_ids().next().unwrap();
        mesh.erase_vertex_element(v);
        mesh.compact();

        // Reusing the slot must not revive the old handle
        let fresh = mesh.new_vertex(Vec3::ONE);
        assert_ne!(fresh, v);
        assert!(mesh.vertex(v).is_none());
        assert!(!mesh.set_vertex_position(v, Vec3::ZERO));
    }

    #[test]
    fn test_counts_and_euler() {
        let mesh = primitives::cube().unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.edge_count(), 12);
        assert_eq!(mesh.half_edge_count(), 24);
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.euler_characteristic(), 2);

        let grid = primitives::grid(2).unwrap();
        assert_eq!(grid.boundary_loop_count(), 1);
        assert_eq!(grid.face_count(), 4);
        // Disk: V - E + F(with loop) = 2
        assert_eq!(grid.euler_characteristic(), 2);
    }

    #[test]
    fn test_finalize_rejects_dangling_reference() {
        let mut mesh = primitives::tetrahedron().unwrap();
        let f = mesh.interior_face_ids().next().unwrap();
        // Erasing a face that half-edges still point at is corruption
        mesh.erase_face_element(f);
        assert!(mesh.finalize().is_err());
    }
}
