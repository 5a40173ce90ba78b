//! Edge operators: bisect, split, flip, collapse and erase.
//!
//! Each operator gathers everything it needs and runs every denial check
//! before the first write, so a denied call leaves the mesh untouched.

use std::collections::HashSet;
use tracing::trace;

use super::types::{Denial, EdgeId, EditResult, FaceId, HalfEdge, HalfEdgeId, VertexId};
use super::HalfEdgeMesh;

impl HalfEdgeMesh {
    /// Insert a vertex at the midpoint of an edge.
    ///
    /// Face connectivity is untouched: both incident faces gain one side.
    /// The new vertex is flagged `is_new`; its stored half-edge runs along
    /// the original edge towards the far endpoint.
    ///
    /// ```text
    ///   a ---------- b      ->      a ---- m ---- b
    /// ```
    pub fn bisect_edge(&mut self, edge_id: EdgeId) -> EditResult<VertexId> {
        // ===== PHASE 1: GATHER (read-only, fail early) =====
        self.require_edge(edge_id)?;
        if self.is_boundary_edge(edge_id) {
            trace!("bisect_edge: DENY {:?} on boundary", edge_id);
            return Err(Denial::OnBoundary);
        }

        let h = self.edges[edge_id].half_edge;
        let t = self.twin(h);
        let a = self.origin(h);
        let h_prev = self.prev(h);
        let t_next = self.next(t);
        let (f, g) = (self.face_of(h), self.face_of(t));
        let midpoint = (self.position(a) + self.position(self.origin(t))) * 0.5;

        // ===== PHASE 2: ALLOCATE =====
        let m = self.new_vertex(midpoint);
        let e0 = self.new_edge();
        let hn = self.new_half_edge();
        let hn_twin = self.new_half_edge();

        // ===== PHASE 3: REWIRE =====
        // F: ... -> hn (a->m) -> h (m->b) -> ...
        // G: ... -> t (b->m) -> hn_twin (m->a) -> ...
        self.half_edges[hn] = HalfEdge {
            twin: hn_twin,
            next: h,
            vertex: a,
            edge: e0,
            face: f,
        };
        self.half_edges[hn_twin] = HalfEdge {
            twin: hn,
            next: t_next,
            vertex: m,
            edge: e0,
            face: g,
        };
        self.half_edges[h_prev].next = hn;
        self.half_edges[h].vertex = m;
        self.half_edges[t].next = hn_twin;

        self.edges[e0].half_edge = hn;
        self.vertices[a].half_edge = hn;
        let vertex = &mut self.vertices[m];
        vertex.half_edge = h;
        vertex.is_new = true;

        trace!("bisect_edge: {:?} -> new vertex {:?}", edge_id, m);
        self.debug_validate("bisect_edge");
        Ok(m)
    }

    /// Split an edge between two triangles into four triangles.
    ///
    /// ```text
    ///        c                    c
    ///       / \                  /|\
    ///      /   \                / | \
    ///     a-----b      ->      a--m--b
    ///      \   /                \ | /
    ///       \ /                  \|/
    ///        d                    d
    /// ```
    ///
    /// The two new edges (m-c, m-d) are flagged `is_new`; the two halves of
    /// the original edge are not.
    pub fn split_edge(&mut self, edge_id: EdgeId) -> EditResult<VertexId> {
        // ===== PHASE 1: GATHER (read-only, fail early) =====
        self.require_edge(edge_id)?;
        if self.is_boundary_edge(edge_id) {
            trace!("split_edge: DENY {:?} on boundary", edge_id);
            return Err(Denial::OnBoundary);
        }

        let h = self.edges[edge_id].half_edge;
        let t = self.twin(h);
        if self.face_degree(self.face_of(h)) != 3 || self.face_degree(self.face_of(t)) != 3 {
            trace!("split_edge: DENY {:?} non-triangular neighbor", edge_id);
            return Err(Denial::NonTriangularFace);
        }
        // c -> a and d -> b
        let c_corner = self.prev(h);
        let d_corner = self.prev(t);
        if self.origin(c_corner) == self.origin(d_corner) {
            // Both new edges would join m to the same apex
            trace!("split_edge: DENY {:?} triangles share their apex", edge_id);
            return Err(Denial::DegenerateResult);
        }

        // ===== PHASE 2: BISECT =====
        let m = self.bisect_edge(edge_id)?;
        let hn_twin = self.next(t);

        // ===== PHASE 3: CUT BOTH QUADS =====
        // F = [a->m, m->b, b->c, c->a]: cut off (c, a, m)
        self.insert_diagonal(c_corner, h);
        // G = [b->m, m->a, a->d, d->b]: cut off (m, a, d)
        self.insert_diagonal(hn_twin, d_corner);
        self.vertices[m].half_edge = h;

        trace!("split_edge: {:?} -> new vertex {:?}", edge_id, m);
        self.debug_validate("split_edge");
        Ok(m)
    }

    /// Rotate an edge counter-clockwise inside the union of its two faces.
    ///
    /// For an edge AB shared by triangles ABC and BAD, flipping creates
    /// triangles DCA and CDB (swapping the shared edge from AB to CD).
    ///
    /// ```text
    ///     Before:              After:
    ///        C                    C
    ///       / \                  /|\
    ///      /   \                / | \
    ///     A-----B     ->       A  |  B
    ///      \   /                \ | /
    ///       \ /                  \|/
    ///        D                    D
    /// ```
    ///
    /// Works on polygons too: each face hands one corner to the other.
    /// Besides boundary edges, denies flips that would leave an endpoint with
    /// degree below 2, duplicate an existing edge, or hand a face a corner it
    /// already has.
    pub fn flip_edge(&mut self, edge_id: EdgeId) -> EditResult<EdgeId> {
        // ===== PHASE 1: GATHER (read-only, fail early) =====
        self.require_edge(edge_id)?;
        if self.is_boundary_edge(edge_id) {
            trace!("flip_edge: DENY {:?} on boundary", edge_id);
            return Err(Denial::OnBoundary);
        }

        let h = self.edges[edge_id].half_edge;
        let t = self.twin(h);
        let (a, b) = (self.origin(h), self.origin(t));
        let (f, g) = (self.face_of(h), self.face_of(t));
        if f == g {
            return Err(Denial::DegenerateResult);
        }

        for v in [a, b] {
            let degree = self.vertex_degree(v);
            if degree < 3 {
                trace!("flip_edge: DENY {:?} endpoint degree {}", edge_id, degree);
                return Err(Denial::DegreeTooLow { degree, minimum: 3 });
            }
        }

        let h1 = self.next(h);
        let t1 = self.next(t);
        let h_prev = self.prev(h);
        let t_prev = self.prev(t);
        let h1_next = self.next(h1);
        let t1_next = self.next(t1);
        let c = self.origin(h1_next);
        let d = self.origin(t1_next);

        // ===== PHASE 2: NON-MANIFOLD PRE-CHECK =====
        // Flipping A-B creates C-D. If C-D already exists the result would
        // carry two edges between the same vertices.
        if c == d || self.find_edge(c, d).is_some() {
            trace!(
                "flip_edge: ABORT - new edge ({:?}-{:?}) already exists, would create non-manifold geometry",
                c,
                d
            );
            return Err(Denial::DegenerateResult);
        }
        // F gains D and G gains C
        if self.get_face_vertices(f).contains(&d) || self.get_face_vertices(g).contains(&c) {
            trace!("flip_edge: DENY {:?} a face would visit a corner twice", edge_id);
            return Err(Denial::DegenerateResult);
        }

        // ===== PHASE 3: REWIRE =====
        // F: h (d->c) -> h1_next ... h_prev -> t1 -> h
        // G: t (c->d) -> t1_next ... t_prev -> h1 -> t
        self.half_edges[h_prev].next = t1;
        self.half_edges[t1].next = h;
        self.half_edges[h].next = h1_next;
        self.half_edges[t_prev].next = h1;
        self.half_edges[h1].next = t;
        self.half_edges[t].next = t1_next;

        self.half_edges[t1].face = f;
        self.half_edges[h1].face = g;
        self.half_edges[h].vertex = d;
        self.half_edges[t].vertex = c;

        self.vertices[a].half_edge = t1;
        self.vertices[b].half_edge = h1;
        self.faces[f].half_edge = h;
        self.faces[g].half_edge = t;

        trace!("flip_edge: {:?} now joins {:?}-{:?}", edge_id, d, c);
        self.debug_validate("flip_edge");
        Ok(edge_id)
    }

    /// Check whether [`collapse_edge`](Self::collapse_edge) would accept an edge.
    ///
    /// Denies boundary edges and edges touching the boundary, edges whose
    /// endpoints share a neighbor other than the triangle apexes (link
    /// condition), and triangles whose apex would drop below degree 2.
    /// Also denies when a face off the edge holds both endpoints, since
    /// that face would visit the survivor twice.
    pub fn check_collapse(&self, edge_id: EdgeId) -> EditResult<()> {
        self.require_edge(edge_id)?;
        if self.is_boundary_edge(edge_id) {
            return Err(Denial::OnBoundary);
        }

        let h = self.edges[edge_id].half_edge;
        let t = self.twin(h);
        let (a, b) = (self.origin(h), self.origin(t));
        if self.is_boundary_vertex(a) || self.is_boundary_vertex(b) {
            return Err(Denial::OnBoundary);
        }
        let (f, g) = (self.face_of(h), self.face_of(t));
        if f == g {
            return Err(Denial::DegenerateResult);
        }

        let mut apexes: HashSet<VertexId> = HashSet::new();
        for (side, face) in [(h, f), (t, g)] {
            if self.face_degree(face) != 3 {
                continue;
            }
            let apex = self.origin(self.prev(side));
            let degree = self.vertex_degree(apex);
            if degree < 3 {
                return Err(Denial::DegreeTooLow { degree, minimum: 3 });
            }
            if !apexes.insert(apex) {
                // Both triangles share their apex: the edge is part of a tetrahedron-like pinch
                return Err(Denial::DegenerateResult);
            }
        }

        if self
            .get_vertex_faces(a)
            .into_iter()
            .filter(|&other| other != f && other != g)
            .any(|other| self.get_face_vertices(other).contains(&b))
        {
            return Err(Denial::DegenerateResult);
        }

        if self.common_neighbors(a, b) != apexes {
            return Err(Denial::DegenerateResult);
        }

        let merged = (self.vertex_degree(a) + self.vertex_degree(b)).saturating_sub(2 + apexes.len());
        if merged < 2 {
            return Err(Denial::DegreeTooLow {
                degree: merged,
                minimum: 2,
            });
        }
        Ok(())
    }

    /// Merge the two endpoints of an edge into one vertex at the midpoint.
    ///
    /// The origin of the edge's stored half-edge survives. An incident
    /// triangle degenerates to two sides and is removed, its two remaining
    /// edges merging into one.
    pub fn collapse_edge(&mut self, edge_id: EdgeId) -> EditResult<VertexId> {
        // ===== PHASE 1: GATHER (read-only, fail early) =====
        if let Err(denial) = self.check_collapse(edge_id) {
            trace!("collapse_edge: DENY {:?}: {}", edge_id, denial);
            return Err(denial);
        }

        let h = self.edges[edge_id].half_edge;
        let t = self.twin(h);
        let (a, b) = (self.origin(h), self.origin(t));
        let (f, g) = (self.face_of(h), self.face_of(t));
        let f_is_triangle = self.face_degree(f) == 3;
        let g_is_triangle = self.face_degree(g) == 3;
        let h1 = self.next(h);
        let t1 = self.next(t);
        let h_prev = self.prev(h);
        let t_prev = self.prev(t);
        let b_outgoing = self.get_vertex_outgoing(b);
        let midpoint = (self.position(a) + self.position(b)) * 0.5;

        // ===== PHASE 2: MERGE b INTO a =====
        for out in b_outgoing {
            self.half_edges[out].vertex = a;
        }
        self.vertices[a].position = midpoint;

        // ===== PHASE 3: SPLICE OUT THE EDGE =====
        self.half_edges[h_prev].next = h1;
        self.faces[f].half_edge = h1;
        self.half_edges[t_prev].next = t1;
        self.faces[g].half_edge = t1;

        if f_is_triangle {
            // F is now [h1 (a->c), h_prev (c->a)]
            self.dissolve_digon(f, h1, h_prev);
        } else {
            self.vertices[a].half_edge = h1;
        }
        if g_is_triangle {
            // G is now [t1 (a->d), t_prev (d->a)]
            self.dissolve_digon(g, t1, t_prev);
        } else {
            self.vertices[a].half_edge = t1;
        }

        // ===== PHASE 4: ERASE =====
        self.erase_half_edge_element(h);
        self.erase_half_edge_element(t);
        self.erase_edge_element(edge_id);
        self.erase_vertex_element(b);

        trace!("collapse_edge: {:?} merged {:?} into {:?}", edge_id, b, a);
        self.debug_validate("collapse_edge");
        Ok(a)
    }

    /// Remove a two-sided face `[x (p->q), y (q->p)]`, gluing the outer
    /// neighbors of its sides together. The edge of `y` survives.
    fn dissolve_digon(&mut self, face: FaceId, x: HalfEdgeId, y: HalfEdgeId) {
        let x_twin = self.twin(x);
        let y_twin = self.twin(y);
        let dropped = self.edge_of(x);
        let kept = self.edge_of(y);
        let (p, q) = (self.origin(x), self.origin(y));

        self.half_edges[x_twin].twin = y_twin;
        self.half_edges[x_twin].edge = kept;
        self.half_edges[y_twin].twin = x_twin;
        self.edges[kept].half_edge = y_twin;
        self.vertices[p].half_edge = y_twin;
        self.vertices[q].half_edge = x_twin;

        self.erase_half_edge_element(x);
        self.erase_half_edge_element(y);
        self.erase_edge_element(dropped);
        self.erase_face_element(face);
    }

    /// Remove an edge, merging its two faces into one. Returns the merged face.
    pub fn erase_edge(&mut self, edge_id: EdgeId) -> EditResult<FaceId> {
        // ===== PHASE 1: GATHER (read-only, fail early) =====
        self.require_edge(edge_id)?;
        if self.is_boundary_edge(edge_id) {
            trace!("erase_edge: DENY {:?} on boundary", edge_id);
            return Err(Denial::OnBoundary);
        }

        let h = self.edges[edge_id].half_edge;
        let t = self.twin(h);
        let (a, b) = (self.origin(h), self.origin(t));
        let (f, g) = (self.face_of(h), self.face_of(t));
        if f == g {
            return Err(Denial::DegenerateResult);
        }
        // Faces sharing any other corner would merge into a face that meets itself
        let f_corners = self.get_face_vertices(f);
        if self
            .get_face_vertices(g)
            .iter()
            .any(|&x| x != a && x != b && f_corners.contains(&x))
        {
            trace!("erase_edge: DENY {:?} faces share another corner", edge_id);
            return Err(Denial::DegenerateResult);
        }
        let g_half_edges = self.get_face_half_edges(g);
        for v in [a, b] {
            let degree = self.vertex_degree(v);
            if degree < 3 {
                return Err(Denial::DegreeTooLow { degree, minimum: 3 });
            }
        }

        let h1 = self.next(h);
        let t1 = self.next(t);
        let h_prev = self.prev(h);
        let t_prev = self.prev(t);

        // ===== PHASE 2: MERGE G INTO F =====
        for x in g_half_edges {
            self.half_edges[x].face = f;
        }
        self.half_edges[h_prev].next = t1;
        self.half_edges[t_prev].next = h1;
        self.faces[f].half_edge = h1;
        self.vertices[a].half_edge = t1;
        self.vertices[b].half_edge = h1;

        // ===== PHASE 3: ERASE =====
        self.erase_half_edge_element(h);
        self.erase_half_edge_element(t);
        self.erase_edge_element(edge_id);
        self.erase_face_element(g);

        trace!("erase_edge: {:?} merged {:?} into {:?}", edge_id, g, f);
        self.debug_validate("erase_edge");
        Ok(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::half_edge::test_support::{assert_manifold, chorded_hexagon, counts};
    use crate::primitives;
    use glam::Vec3;

    fn first_edge(mesh: &HalfEdgeMesh) -> EdgeId {
        mesh.edge_ids().next().unwrap()
    }

    /// Vertex sets of the two faces on either side of an edge
    fn side_sets(mesh: &HalfEdgeMesh, e: EdgeId) -> Vec<Vec<VertexId>> {
        let h = mesh.edge(e).unwrap().half_edge;
        let mut sets: Vec<Vec<VertexId>> = [h, mesh.twin(h)]
            .iter()
            .map(|&x| {
                let mut verts = mesh.get_face_vertices(mesh.face_of(x));
                verts.sort();
                verts
            })
            .collect();
        sets.sort();
        sets
    }

    #[test]
    fn test_bisect_edge() {
        let mut mesh = primitives::tetrahedron().unwrap();
        let e = first_edge(&mesh);
        let (a, b) = mesh.get_edge_vertices(e).unwrap();
        let expected = (mesh.position(a) + mesh.position(b)) * 0.5;

        let m = mesh.bisect_edge(e).unwrap();

        assert_eq!(counts(&mesh), (5, 7, 4));
        let vertex = mesh.vertex(m).unwrap();
        assert!(vertex.is_new);
        assert!((vertex.position - expected).length() < 0.001);
        assert_eq!(mesh.vertex_degree(m), 2);
        assert_eq!(mesh.get_half_edge_dest(vertex.half_edge), Some(b));
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_bisect_boundary_edge_denied() {
        let mut mesh = primitives::triangle().unwrap();
        let e = first_edge(&mesh);
        assert_eq!(mesh.bisect_edge(e), Err(Denial::OnBoundary));
        assert_eq!(counts(&mesh), (3, 3, 1));
    }

    #[test]
    fn test_split_edge_closed_mesh() {
        let mut mesh = primitives::tetrahedron().unwrap();
        let e = first_edge(&mesh);
        let m = mesh.split_edge(e).unwrap();

        assert_eq!(counts(&mesh), (5, 9, 6));
        assert_eq!(mesh.euler_characteristic(), 2);
        assert_eq!(mesh.vertex_degree(m), 4);
        assert!(mesh.is_triangle_mesh());
        assert_manifold(&mesh);

        let new_edges = mesh.edge_ids().filter(|&x| mesh.edge(x).unwrap().is_new).count();
        assert_eq!(new_edges, 2, "only the two cross edges are flagged new");
    }

    #[test]
    fn test_split_single_triangle_is_denied_and_unchanged() {
        let mut mesh = primitives::triangle().unwrap();
        let before = mesh.to_polygons();
        for e in mesh.edge_ids().collect::<Vec<_>>() {
            assert_eq!(mesh.split_edge(e), Err(Denial::OnBoundary));
        }
        assert_eq!(mesh.to_polygons(), before);
        assert_eq!(mesh.pending_erasures(), 0);
    }

    #[test]
    fn test_split_requires_triangles() {
        let mut mesh = primitives::cube().unwrap();
        let e = first_edge(&mesh);
        assert_eq!(mesh.split_edge(e), Err(Denial::NonTriangularFace));
        assert_eq!(counts(&mesh), (8, 12, 6));
    }

    #[test]
    fn test_split_with_shared_apex_is_denied() {
        let mut mesh = primitives::tetrahedron().unwrap();
        let e = first_edge(&mesh);
        mesh.collapse_edge(e).unwrap();
        mesh.compact();
        // Two triangles glued along all three edges: every edge has one apex on both sides
        let before = mesh.to_polygons();
        for e in mesh.edge_ids().collect::<Vec<_>>() {
            assert_eq!(mesh.split_edge(e), Err(Denial::DegenerateResult));
        }
        assert_eq!(mesh.to_polygons(), before);
        assert_eq!(mesh.pending_erasures(), 0);
        assert_manifold(&mesh);
    }

    #[test]
    fn test_flip_every_tetrahedron_edge() {
        let mut mesh = primitives::tetrahedron().unwrap();
        for e in mesh.edge_ids().collect::<Vec<_>>() {
            // Every opposite pair is already connected
            assert_eq!(mesh.flip_edge(e), Err(Denial::DegenerateResult));
        }
        assert_eq!(counts(&mesh), (4, 6, 4));
        assert_manifold(&mesh);
    }

    #[test]
    fn test_flip_octahedron_edge() {
        let mut mesh = primitives::octahedron().unwrap();
        let e = first_edge(&mesh);
        let (a, b) = mesh.get_edge_vertices(e).unwrap();
        let degrees_before = (mesh.vertex_degree(a), mesh.vertex_degree(b));

        let flipped = mesh.flip_edge(e).unwrap();
        assert_eq!(flipped, e);
        assert_eq!(counts(&mesh), (6, 12, 8));
        assert_eq!(mesh.vertex_degree(a), degrees_before.0 - 1);
        assert_eq!(mesh.vertex_degree(b), degrees_before.1 - 1);
        let (c, d) = mesh.get_edge_vertices(e).unwrap();
        assert!(c != a && c != b && d != a && d != b);
        assert_manifold(&mesh);
    }

    #[test]
    fn test_flip_is_an_involution_on_face_sets() {
        let mut mesh = primitives::icosahedron().unwrap();
        let e = first_edge(&mesh);
        let before = side_sets(&mesh, e);
        mesh.flip_edge(e).unwrap();
        assert_ne!(side_sets(&mesh, e), before);
        mesh.flip_edge(e).unwrap();
        assert_eq!(side_sets(&mesh, e), before);
        assert_manifold(&mesh);
    }

    #[test]
    fn test_flip_quad_edge() {
        let mut mesh = primitives::cube().unwrap();
        let e = first_edge(&mesh);
        mesh.flip_edge(e).unwrap();
        assert_eq!(counts(&mesh), (8, 12, 6));
        for f in mesh.interior_face_ids() {
            assert_eq!(mesh.face_degree(f), 4);
        }
        assert_manifold(&mesh);
    }

    #[test]
    fn test_collapse_edge_octahedron() {
        let mut mesh = primitives::octahedron().unwrap();
        let e = first_edge(&mesh);
        let (a, b) = mesh.get_edge_vertices(e).unwrap();
        let midpoint = (mesh.position(a) + mesh.position(b)) * 0.5;

        let v = mesh.collapse_edge(e).unwrap();

        assert_eq!(v, a);
        assert_eq!(counts(&mesh), (5, 9, 6));
        assert!((mesh.vertex(v).unwrap().position - midpoint).length() < 0.001);
        assert!(mesh.vertex(b).is_none());
        assert!(mesh.edge(e).is_none());
        assert_manifold(&mesh);

        mesh.finalize().unwrap();
        assert_eq!(mesh.pending_erasures(), 0);
        assert_manifold(&mesh);
    }

    #[test]
    fn test_collapse_quad_edge_keeps_faces() {
        let mut mesh = primitives::cube().unwrap();
        let e = first_edge(&mesh);
        mesh.collapse_edge(e).unwrap();
        // Two quads become triangles; no face disappears
        assert_eq!(counts(&mesh), (7, 11, 6));
        assert_manifold(&mesh);
    }

    #[test]
    fn test_collapse_of_pinched_pair_is_denied() {
        let mut mesh = primitives::tetrahedron().unwrap();
        let e = first_edge(&mesh);
        // One collapse leaves two triangles glued along all three edges
        mesh.collapse_edge(e).unwrap();
        mesh.compact();
        assert_eq!(counts(&mesh), (3, 3, 2));
        assert_manifold(&mesh);
        let e = first_edge(&mesh);
        assert_eq!(
            mesh.collapse_edge(e),
            Err(Denial::DegreeTooLow {
                degree: 2,
                minimum: 3
            })
        );
        assert_eq!(counts(&mesh), (3, 3, 2));
    }

    #[test]
    fn test_collapse_with_both_endpoints_on_another_face_is_denied() {
        let (mut mesh, v) = chorded_hexagon();
        assert_manifold(&mesh);
        let chord = mesh.find_edge(v[0], v[3]).unwrap();
        let before = mesh.to_polygons();

        assert_eq!(mesh.check_collapse(chord), Err(Denial::DegenerateResult));
        assert_eq!(mesh.collapse_edge(chord), Err(Denial::DegenerateResult));
        assert_eq!(mesh.to_polygons(), before);
        assert_eq!(counts(&mesh), (8, 15, 9));

        // A hexagon side has no such face and still collapses
        let side = mesh.find_edge(v[0], v[1]).unwrap();
        mesh.collapse_edge(side).unwrap();
        assert_eq!(counts(&mesh), (7, 13, 8));
        assert_manifold(&mesh);
    }

    #[test]
    fn test_collapse_boundary_denied() {
        let mut mesh = primitives::grid(2).unwrap();
        let before = mesh.to_polygons();
        for e in mesh.edge_ids().collect::<Vec<_>>() {
            assert_eq!(mesh.collapse_edge(e), Err(Denial::OnBoundary));
        }
        assert_eq!(mesh.to_polygons(), before);
    }

    #[test]
    fn test_erase_edge_merges_faces() {
        let mut mesh = primitives::cube().unwrap();
        let e = first_edge(&mesh);
        let f = mesh.erase_edge(e).unwrap();
        assert_eq!(mesh.face_degree(f), 6);
        assert_eq!(counts(&mesh), (8, 11, 5));
        assert_eq!(mesh.euler_characteristic(), 2);
        assert_manifold(&mesh);
    }

    #[test]
    fn test_erase_edge_denials() {
        let mut mesh = primitives::triangle().unwrap();
        let e = first_edge(&mesh);
        assert_eq!(mesh.erase_edge(e), Err(Denial::OnBoundary));

        // Both faces of a bisected edge also share the other half
        let mut mesh = primitives::octahedron().unwrap();
        let e = first_edge(&mesh);
        let m = mesh.bisect_edge(e).unwrap();
        let half = mesh.edge_of(mesh.vertex(m).unwrap().half_edge);
        assert_eq!(mesh.erase_edge(half), Err(Denial::DegenerateResult));
        assert_eq!(counts(&mesh), (7, 13, 8));
    }

    #[test]
    fn test_erase_edge_denies_repeated_corner() {
        let (mut mesh, v) = chorded_hexagon();
        let side = mesh.find_edge(v[0], v[1]).unwrap();
        let merged = mesh.erase_edge(side).unwrap();
        assert_eq!(mesh.face_degree(merged), 7);
        assert_manifold(&mesh);

        // The merged face now holds the fan center, which the triangle on 2-3 shares
        let e = mesh.find_edge(v[2], v[3]).unwrap();
        let before = mesh.to_polygons();
        assert_eq!(mesh.erase_edge(e), Err(Denial::DegenerateResult));
        assert_eq!(mesh.to_polygons(), before);
        assert_manifold(&mesh);
    }

    #[test]
    fn test_flip_denies_corner_already_on_the_face() {
        let (mut mesh, v) = chorded_hexagon();
        mesh.erase_edge(mesh.find_edge(v[0], v[1]).unwrap()).unwrap();

        // Flipping 2-3 would hand the fan center to the face that holds it
        let e = mesh.find_edge(v[2], v[3]).unwrap();
        let before = mesh.to_polygons();
        assert_eq!(mesh.flip_edge(e), Err(Denial::DegenerateResult));
        assert_eq!(mesh.to_polygons(), before);
        assert_manifold(&mesh);
    }

    #[test]
    fn test_stale_handle_denied() {
        let mut mesh = primitives::octahedron().unwrap();
        let e = first_edge(&mesh);
        mesh.collapse_edge(e).unwrap();
        mesh.compact();
        assert_eq!(mesh.flip_edge(e), Err(Denial::StaleHandle));
        assert_eq!(mesh.split_edge(e), Err(Denial::StaleHandle));
        assert!(!mesh.set_vertex_position(VertexId::default(), Vec3::ZERO));
    }
}
