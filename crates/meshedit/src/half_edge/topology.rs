//! Topology and geometry queries for HalfEdgeMesh.

use glam::Vec3;
use std::collections::HashSet;

use super::types::{EdgeId, FaceId, HalfEdgeId, VertexId};
use super::HalfEdgeMesh;

impl HalfEdgeMesh {
    // ========================================================================
    // Raw navigation (handles must be reachable from a live element)
    // ========================================================================

    pub(crate) fn twin(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[h].twin
    }

    pub(crate) fn next(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[h].next
    }

    pub(crate) fn origin(&self, h: HalfEdgeId) -> VertexId {
        self.half_edges[h].vertex
    }

    pub(crate) fn edge_of(&self, h: HalfEdgeId) -> EdgeId {
        self.half_edges[h].edge
    }

    pub(crate) fn face_of(&self, h: HalfEdgeId) -> FaceId {
        self.half_edges[h].face
    }

    pub(crate) fn position(&self, v: VertexId) -> Vec3 {
        self.vertices[v].position
    }

    /// Predecessor of `h` around its face
    pub(crate) fn prev(&self, h: HalfEdgeId) -> HalfEdgeId {
        let mut current = h;
        loop {
            let next = self.half_edges[current].next;
            if next == h {
                return current;
            }
            current = next;
        }
    }

    /// Upper bound for any cycle walk, so corrupted links cannot spin forever
    fn walk_limit(&self) -> usize {
        self.half_edges.len() + 1
    }

    // ========================================================================
    // Half-edge queries
    // ========================================================================

    /// Destination vertex of a half-edge
    pub fn get_half_edge_dest(&self, h: HalfEdgeId) -> Option<VertexId> {
        let twin = self.half_edge(h)?.twin;
        self.half_edges.get(twin).map(|t| t.vertex)
    }

    /// The half-edge whose `next` is `h`
    pub fn prev_half_edge(&self, h: HalfEdgeId) -> Option<HalfEdgeId> {
        self.half_edge(h)?;
        let mut current = h;
        for _ in 0..self.walk_limit() {
            let next = self.half_edges.get(current)?.next;
            if next == h {
                return Some(current);
            }
            current = next;
        }
        None
    }

    // ========================================================================
    // Face queries
    // ========================================================================

    /// Half-edges of a face in `next` order, starting at the stored half-edge
    pub fn get_face_half_edges(&self, face_id: FaceId) -> Vec<HalfEdgeId> {
        let mut result = Vec::new();
        let Some(face) = self.face(face_id) else {
            return result;
        };

        let start = face.half_edge;
        let mut current = start;
        for _ in 0..self.walk_limit() {
            let Some(he) = self.half_edges.get(current) else {
                break;
            };
            result.push(current);
            current = he.next;
            if current == start {
                break;
            }
        }
        result
    }

    /// Vertices of a face in winding order
    pub fn get_face_vertices(&self, face_id: FaceId) -> Vec<VertexId> {
        self.get_face_half_edges(face_id)
            .into_iter()
            .map(|h| self.half_edges[h].vertex)
            .collect()
    }

    pub fn face_degree(&self, face_id: FaceId) -> usize {
        self.get_face_half_edges(face_id).len()
    }

    /// Mean of the face's vertex positions
    pub fn face_center(&self, face_id: FaceId) -> Vec3 {
        let verts = self.get_face_vertices(face_id);
        if verts.is_empty() {
            return Vec3::ZERO;
        }
        let sum: Vec3 = verts.iter().map(|&v| self.position(v)).sum();
        sum / verts.len() as f32
    }

    /// Unit normal (Newell's method, valid for non-planar polygons)
    pub fn face_normal(&self, face_id: FaceId) -> Vec3 {
        let verts = self.get_face_vertices(face_id);
        let mut normal = Vec3::ZERO;
        for (i, &v) in verts.iter().enumerate() {
            let a = self.position(v);
            let b = self.position(verts[(i + 1) % verts.len()]);
            normal += a.cross(b);
        }
        normal.normalize_or_zero()
    }

    pub fn is_boundary_face(&self, face_id: FaceId) -> bool {
        self.face(face_id).is_some_and(|f| f.is_boundary)
    }

    // ========================================================================
    // Vertex queries
    // ========================================================================

    /// Outgoing half-edges in rotation order (`twin.next`)
    pub fn get_vertex_outgoing(&self, vertex_id: VertexId) -> Vec<HalfEdgeId> {
        let mut result = Vec::new();
        let Some(vertex) = self.vertex(vertex_id) else {
            return result;
        };

        let start = vertex.half_edge;
        let mut current = start;
        for _ in 0..self.walk_limit() {
            let Some(he) = self.half_edges.get(current) else {
                break;
            };
            result.push(current);
            let Some(twin) = self.half_edges.get(he.twin) else {
                break;
            };
            current = twin.next;
            if current == start {
                break;
            }
        }
        result
    }

    pub fn vertex_degree(&self, vertex_id: VertexId) -> usize {
        self.get_vertex_outgoing(vertex_id).len()
    }

    /// One-ring neighbors in rotation order
    pub fn get_adjacent_vertices(&self, vertex_id: VertexId) -> Vec<VertexId> {
        self.get_vertex_outgoing(vertex_id)
            .into_iter()
            .map(|h| self.origin(self.twin(h)))
            .collect()
    }

    /// Interior faces around a vertex (boundary loops skipped)
    pub fn get_vertex_faces(&self, vertex_id: VertexId) -> Vec<FaceId> {
        let mut faces = Vec::new();
        for h in self.get_vertex_outgoing(vertex_id) {
            let face = self.face_of(h);
            if !self.faces[face].is_boundary && !faces.contains(&face) {
                faces.push(face);
            }
        }
        faces
    }

    /// A vertex is on the boundary if any incident face is a boundary loop
    pub fn is_boundary_vertex(&self, vertex_id: VertexId) -> bool {
        self.get_vertex_outgoing(vertex_id)
            .into_iter()
            .any(|h| self.faces[self.face_of(h)].is_boundary)
    }

    /// Area-weighted normal of the interior faces around a vertex
    pub fn vertex_normal(&self, vertex_id: VertexId) -> Vec3 {
        match self.vertex(vertex_id) {
            Some(v) => self.vertex_normal_at(vertex_id, v.position),
            None => Vec3::ZERO,
        }
    }

    /// Vertex normal as if the vertex sat at `center`.
    ///
    /// Sums the corner cross products of each interior face fan, so only the
    /// neighbors' current positions are read.
    pub(crate) fn vertex_normal_at(&self, vertex_id: VertexId, center: Vec3) -> Vec3 {
        let outgoing = self.get_vertex_outgoing(vertex_id);
        let mut normal = Vec3::ZERO;
        for (i, &h) in outgoing.iter().enumerate() {
            let h_next = outgoing[(i + 1) % outgoing.len()];
            // twin(h) -> h_next is a corner of face(h_next)
            if self.faces[self.face_of(h_next)].is_boundary {
                continue;
            }
            let before = self.position(self.origin(self.twin(h))) - center;
            let after = self.position(self.origin(self.twin(h_next))) - center;
            normal += after.cross(before);
        }
        normal.normalize_or_zero()
    }

    // ========================================================================
    // Edge queries
    // ========================================================================

    /// Endpoints of an edge (origin and destination of its stored half-edge)
    pub fn get_edge_vertices(&self, edge_id: EdgeId) -> Option<(VertexId, VertexId)> {
        let h = self.edge(edge_id)?.half_edge;
        Some((self.origin(h), self.origin(self.twin(h))))
    }

    pub fn edge_center(&self, edge_id: EdgeId) -> Vec3 {
        self.get_edge_vertices(edge_id)
            .map(|(a, b)| (self.position(a) + self.position(b)) * 0.5)
            .unwrap_or(Vec3::ZERO)
    }

    pub fn edge_length(&self, edge_id: EdgeId) -> f32 {
        self.get_edge_vertices(edge_id)
            .map(|(a, b)| self.position(a).distance(self.position(b)))
            .unwrap_or(0.0)
    }

    /// An edge is on the boundary if either side is a boundary loop
    pub fn is_boundary_edge(&self, edge_id: EdgeId) -> bool {
        let Some(edge) = self.edge(edge_id) else {
            return false;
        };
        let h = edge.half_edge;
        self.faces[self.face_of(h)].is_boundary
            || self.faces[self.face_of(self.twin(h))].is_boundary
    }

    /// The edge joining two vertices, if any
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.get_vertex_outgoing(a)
            .into_iter()
            .find(|&h| self.origin(self.twin(h)) == b)
            .map(|h| self.edge_of(h))
    }

    /// Vertices adjacent to both endpoints, excluding the endpoints themselves
    pub(crate) fn common_neighbors(&self, a: VertexId, b: VertexId) -> HashSet<VertexId> {
        let around_a: HashSet<VertexId> = self.get_adjacent_vertices(a).into_iter().collect();
        self.get_adjacent_vertices(b)
            .into_iter()
            .filter(|v| *v != a && *v != b && around_a.contains(v))
            .collect()
    }

    // ========================================================================
    // Whole-mesh queries
    // ========================================================================

    pub fn has_boundary(&self) -> bool {
        self.boundary_loop_ids().next().is_some()
    }

    /// True if every interior face has exactly three sides
    pub fn is_triangle_mesh(&self) -> bool {
        self.interior_face_ids().all(|f| self.face_degree(f) == 3)
    }

    /// Mean length over all live edges
    pub fn mean_edge_length(&self) -> f32 {
        let count = self.edge_count();
        if count == 0 {
            return 0.0;
        }
        let total: f32 = self.edge_ids().map(|e| self.edge_length(e)).sum();
        total / count as f32
    }
}
