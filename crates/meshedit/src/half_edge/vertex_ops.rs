//! Vertex operators: erase and extrude.

use std::collections::HashSet;
use tracing::trace;

use meshedit_config::DEFAULT_EXTRUDE_TANGENT_OFFSET;

use super::types::{Denial, EditResult, FaceId, HalfEdgeId, VertexId};
use super::HalfEdgeMesh;

impl HalfEdgeMesh {
    /// Remove a vertex with its incident edges, merging its faces into one.
    ///
    /// Returns the merged face.
    pub fn erase_vertex(&mut self, vertex_id: VertexId) -> EditResult<FaceId> {
        // ===== PHASE 1: GATHER (read-only, fail early) =====
        self.require_vertex(vertex_id)?;
        if self.is_boundary_vertex(vertex_id) {
            trace!("erase_vertex: DENY {:?} on boundary", vertex_id);
            return Err(Denial::OnBoundary);
        }

        let spokes = self.get_vertex_outgoing(vertex_id);
        let faces: Vec<FaceId> = spokes.iter().map(|&h| self.face_of(h)).collect();
        let neighbors = self.get_adjacent_vertices(vertex_id);
        let unique_faces: HashSet<FaceId> = faces.iter().copied().collect();
        let unique_neighbors: HashSet<VertexId> = neighbors.iter().copied().collect();
        if unique_faces.len() != faces.len() || unique_neighbors.len() != neighbors.len() {
            trace!("erase_vertex: DENY {:?} star touches itself", vertex_id);
            return Err(Denial::DegenerateResult);
        }
        for &x in &neighbors {
            let degree = self.vertex_degree(x);
            if degree < 3 {
                trace!("erase_vertex: DENY {:?} neighbor degree {}", vertex_id, degree);
                return Err(Denial::DegreeTooLow { degree, minimum: 3 });
            }
        }

        // Outer half-edges of every incident face, and the new links between
        // consecutive faces: prev(twin(o)) -> next(o) around each neighbor
        let mut outer: Vec<HalfEdgeId> = Vec::new();
        for &o in &spokes {
            // Stop at the spoke twin leading back into the vertex
            let mut current = self.next(o);
            while self.origin(self.next(current)) != vertex_id {
                outer.push(current);
                current = self.next(current);
            }
        }
        let corners: Vec<VertexId> = outer.iter().map(|&h| self.origin(h)).collect();
        let unique_corners: HashSet<VertexId> = corners.iter().copied().collect();
        if unique_corners.len() != corners.len() {
            trace!("erase_vertex: DENY {:?} merged face would repeat a corner", vertex_id);
            return Err(Denial::DegenerateResult);
        }
        let links: Vec<(HalfEdgeId, HalfEdgeId)> = spokes
            .iter()
            .map(|&o| (self.prev(self.twin(o)), self.next(o)))
            .collect();

        // ===== PHASE 2: REWIRE =====
        let merged = self.new_face(false);
        for &h in &outer {
            self.half_edges[h].face = merged;
        }
        for &(p, n) in &links {
            self.half_edges[p].next = n;
            let x = self.origin(n);
            self.vertices[x].half_edge = n;
        }
        self.faces[merged].half_edge = links[0].1;

        // ===== PHASE 3: ERASE =====
        for &o in &spokes {
            let twin = self.twin(o);
            let edge = self.edge_of(o);
            self.erase_half_edge_element(o);
            self.erase_half_edge_element(twin);
            self.erase_edge_element(edge);
        }
        for face in faces {
            self.erase_face_element(face);
        }
        self.erase_vertex_element(vertex_id);

        trace!("erase_vertex: {:?} -> face {:?}", vertex_id, merged);
        self.debug_validate("erase_vertex");
        Ok(merged)
    }

    /// Pull a vertex out into a spike.
    ///
    /// The vertex is beveled, its ring is pushed a fixed fraction along the
    /// spokes, and the ring face is contracted back to a single apex at the
    /// ring's centroid, so the apex sits on the surface below the old
    /// corner. Move the apex with
    /// [`extrude_vertex_position`](Self::extrude_vertex_position).
    pub fn extrude_vertex(&mut self, vertex_id: VertexId) -> EditResult<VertexId> {
        self.require_vertex(vertex_id)?;
        if self.is_boundary_vertex(vertex_id) {
            trace!("extrude_vertex: DENY {:?} on boundary", vertex_id);
            return Err(Denial::OnBoundary);
        }
        let position = self.position(vertex_id);

        let mut scratch = self.clone();
        let ring_face = scratch.bevel_vertex(vertex_id)?;
        let start = vec![position; scratch.face_degree(ring_face)];
        scratch.bevel_vertex_positions(&start, ring_face, DEFAULT_EXTRUDE_TANGENT_OFFSET)?;
        let cap = scratch.bevel_face(ring_face)?;
        let center = scratch.face_center(cap);
        let apex = scratch.contract_face(cap)?;
        scratch.vertices[apex].position = center;
        *self = scratch;

        trace!("extrude_vertex: {:?} -> apex {:?}", vertex_id, apex);
        self.debug_validate("extrude_vertex");
        Ok(apex)
    }
}
