//! Bevel operators.
//!
//! Bevels only change connectivity. Every new vertex starts at the position
//! of the vertex it was split from; the position updater moves them later.

use tracing::trace;

use super::types::{Denial, EdgeId, EditResult, FaceId, HalfEdge, HalfEdgeId, VertexId};
use super::HalfEdgeMesh;

impl HalfEdgeMesh {
    /// Detach a ring of spokes from their origins and close the hole with a
    /// new face.
    ///
    /// `spokes` are outgoing half-edges listed in rotation order
    /// (`next(twin(spokes[j]))` is the spoke after `spokes[j]`, or the removed
    /// edge between them). Each spoke gets its own new origin vertex at the
    /// old origin's position, and consecutive new vertices are joined by a
    /// new edge.
    fn bevel_ring(&mut self, spokes: &[HalfEdgeId]) -> FaceId {
        let k = spokes.len();
        let ring_face = self.new_face(false);

        let ring: Vec<VertexId> = spokes
            .iter()
            .map(|&s| {
                let r = self.new_vertex(self.position(self.origin(s)));
                self.vertices[r].half_edge = s;
                r
            })
            .collect();
        for (&s, &r) in spokes.iter().zip(&ring) {
            self.half_edges[s].vertex = r;
        }

        // c[j] runs r[j] -> r[j+1] inside the face between spokes j and j+1,
        // d[j] is its twin on the new face
        let c: Vec<HalfEdgeId> = (0..k).map(|_| self.new_half_edge()).collect();
        let d: Vec<HalfEdgeId> = (0..k).map(|_| self.new_half_edge()).collect();
        for j in 0..k {
            let after = (j + 1) % k;
            let before = (j + k - 1) % k;
            let side = self.face_of(spokes[after]);
            let edge = self.new_edge();

            self.half_edges[c[j]] = HalfEdge {
                twin: d[j],
                next: spokes[after],
                vertex: ring[j],
                edge,
                face: side,
            };
            self.half_edges[d[j]] = HalfEdge {
                twin: c[j],
                next: d[before],
                vertex: ring[after],
                edge,
                face: ring_face,
            };
            let incoming = self.twin(spokes[j]);
            self.half_edges[incoming].next = c[j];
            self.faces[side].half_edge = c[j];
            self.edges[edge].half_edge = c[j];
        }
        self.faces[ring_face].half_edge = d[0];
        ring_face
    }

    /// Replace a vertex with a new face, one new vertex per incident edge.
    pub fn bevel_vertex(&mut self, vertex_id: VertexId) -> EditResult<FaceId> {
        // ===== PHASE 1: GATHER (read-only, fail early) =====
        self.require_vertex(vertex_id)?;
        if self.is_boundary_vertex(vertex_id) {
            trace!("bevel_vertex: DENY {:?} on boundary", vertex_id);
            return Err(Denial::OnBoundary);
        }
        let spokes = self.get_vertex_outgoing(vertex_id);
        if spokes.len() < 3 {
            trace!("bevel_vertex: DENY {:?} degree {}", vertex_id, spokes.len());
            return Err(Denial::DegreeTooLow {
                degree: spokes.len(),
                minimum: 3,
            });
        }

        // ===== PHASE 2: REWIRE =====
        let face = self.bevel_ring(&spokes);
        self.erase_vertex_element(vertex_id);

        trace!("bevel_vertex: {:?} -> face {:?}", vertex_id, face);
        self.debug_validate("bevel_vertex");
        Ok(face)
    }

    /// Replace an edge with a new face.
    ///
    /// Both endpoints are split into one new vertex per remaining incident
    /// edge. When both endpoints have degree 3 the new face is a quad whose
    /// corners sit on the two faces' opposite edges.
    pub fn bevel_edge(&mut self, edge_id: EdgeId) -> EditResult<FaceId> {
        // ===== PHASE 1: GATHER (read-only, fail early) =====
        self.require_edge(edge_id)?;
        if self.is_boundary_edge(edge_id) {
            trace!("bevel_edge: DENY {:?} on boundary", edge_id);
            return Err(Denial::OnBoundary);
        }
        let h = self.edges[edge_id].half_edge;
        let t = self.twin(h);
        let (a, b) = (self.origin(h), self.origin(t));
        if self.is_boundary_vertex(a) || self.is_boundary_vertex(b) {
            trace!("bevel_edge: DENY {:?} endpoint on boundary", edge_id);
            return Err(Denial::OnBoundary);
        }
        if self.face_of(h) == self.face_of(t) {
            return Err(Denial::DegenerateResult);
        }

        let around_a = self.outgoing_from(a, h);
        let around_b = self.outgoing_from(b, t);
        for ring in [&around_a, &around_b] {
            if ring.len() < 3 {
                trace!("bevel_edge: DENY {:?} endpoint degree {}", edge_id, ring.len());
                return Err(Denial::DegreeTooLow {
                    degree: ring.len(),
                    minimum: 3,
                });
            }
        }

        // Skip the beveled edge itself: a's spokes then b's spokes
        let spokes: Vec<HalfEdgeId> = around_a[1..]
            .iter()
            .chain(&around_b[1..])
            .copied()
            .collect();

        // ===== PHASE 2: REWIRE =====
        let face = self.bevel_ring(&spokes);
        self.erase_half_edge_element(h);
        self.erase_half_edge_element(t);
        self.erase_edge_element(edge_id);
        self.erase_vertex_element(a);
        self.erase_vertex_element(b);

        trace!("bevel_edge: {:?} -> face {:?}", edge_id, face);
        self.debug_validate("bevel_edge");
        Ok(face)
    }

    /// Outgoing half-edges of `v` in rotation order, starting at `first`
    fn outgoing_from(&self, v: VertexId, first: HalfEdgeId) -> Vec<HalfEdgeId> {
        let mut ring = self.get_vertex_outgoing(v);
        if let Some(start) = ring.iter().position(|&h| h == first) {
            ring.rotate_left(start);
        }
        ring
    }

    /// Inset a copy of a face, joined to the original border by a ring of quads.
    ///
    /// ```text
    ///   v3 ------------ v2
    ///   |  \          / |
    ///   |   u3 ---- u2  |
    ///   |   |   f    |  |
    ///   |   u0 ---- u1  |
    ///   |  /          \ |
    ///   v0 ------------ v1
    /// ```
    ///
    /// The face keeps its handle and becomes the inner face. Returns it.
    pub fn bevel_face(&mut self, face_id: FaceId) -> EditResult<FaceId> {
        // ===== PHASE 1: GATHER (read-only, fail early) =====
        self.require_face(face_id)?;
        if self.is_boundary_face(face_id) {
            trace!("bevel_face: DENY {:?} is a boundary loop", face_id);
            return Err(Denial::OnBoundary);
        }

        let inner = self.get_face_half_edges(face_id);
        let n = inner.len();
        let outer_twins: Vec<HalfEdgeId> = inner.iter().map(|&h| self.twin(h)).collect();
        let outer_edges: Vec<EdgeId> = inner.iter().map(|&h| self.edge_of(h)).collect();
        let corners: Vec<VertexId> = inner.iter().map(|&h| self.origin(h)).collect();

        // ===== PHASE 2: ALLOCATE =====
        let inset: Vec<VertexId> = corners
            .iter()
            .map(|&v| self.new_vertex(self.position(v)))
            .collect();
        let quads: Vec<FaceId> = (0..n).map(|_| self.new_face(false)).collect();
        let inner_edges: Vec<EdgeId> = (0..n).map(|_| self.new_edge()).collect();
        let spoke_edges: Vec<EdgeId> = (0..n).map(|_| self.new_edge()).collect();
        let a: Vec<HalfEdgeId> = (0..n).map(|_| self.new_half_edge()).collect();
        let b: Vec<HalfEdgeId> = (0..n).map(|_| self.new_half_edge()).collect();
        let c: Vec<HalfEdgeId> = (0..n).map(|_| self.new_half_edge()).collect();
        let d: Vec<HalfEdgeId> = (0..n).map(|_| self.new_half_edge()).collect();

        // ===== PHASE 3: REWIRE =====
        // Quad i: a (v[i] -> v[i+1]), b (v[i+1] -> u[i+1]), c (u[i+1] -> u[i]), d (u[i] -> v[i])
        for i in 0..n {
            let after = (i + 1) % n;
            let before = (i + n - 1) % n;

            self.half_edges[a[i]] = HalfEdge {
                twin: outer_twins[i],
                next: b[i],
                vertex: corners[i],
                edge: outer_edges[i],
                face: quads[i],
            };
            self.half_edges[b[i]] = HalfEdge {
                twin: d[after],
                next: c[i],
                vertex: corners[after],
                edge: spoke_edges[after],
                face: quads[i],
            };
            self.half_edges[c[i]] = HalfEdge {
                twin: inner[i],
                next: d[i],
                vertex: inset[after],
                edge: inner_edges[i],
                face: quads[i],
            };
            self.half_edges[d[i]] = HalfEdge {
                twin: b[before],
                next: a[i],
                vertex: inset[i],
                edge: spoke_edges[i],
                face: quads[i],
            };

            self.half_edges[outer_twins[i]].twin = a[i];
            self.edges[outer_edges[i]].half_edge = a[i];

            let he = &mut self.half_edges[inner[i]];
            he.twin = c[i];
            he.edge = inner_edges[i];
            he.vertex = inset[i];

            self.edges[inner_edges[i]].half_edge = inner[i];
            self.edges[spoke_edges[i]].half_edge = d[i];
            self.faces[quads[i]].half_edge = a[i];
            self.vertices[corners[i]].half_edge = a[i];
            self.vertices[inset[i]].half_edge = inner[i];
        }

        trace!("bevel_face: {:?} inset with {} quads", face_id, n);
        self.debug_validate("bevel_face");
        Ok(face_id)
    }
}
