//! Face operators: diagonal insertion, triangulation, collapse and inset.

use glam::Vec3;
use tracing::trace;

use super::types::{Denial, EditResult, FaceId, HalfEdge, HalfEdgeId, VertexId};
use super::HalfEdgeMesh;

impl HalfEdgeMesh {
    /// Cut a face in two with a new edge from `origin(ha)` to `origin(hb)`.
    ///
    /// The half-edges from `ha` up to (not including) `hb` move to a new
    /// face. Returns the half-edge of the new edge that stays in the original
    /// face (it starts at `origin(ha)`) and the new face.
    ///
    /// Callers guarantee both half-edges belong to the same interior face and
    /// that the corners are neither equal nor adjacent.
    pub(crate) fn insert_diagonal(&mut self, ha: HalfEdgeId, hb: HalfEdgeId) -> (HalfEdgeId, FaceId) {
        let f = self.face_of(ha);
        let x = self.origin(ha);
        let y = self.origin(hb);
        let pa = self.prev(ha);
        let pb = self.prev(hb);

        let mut moved = Vec::new();
        let mut current = ha;
        while current != hb {
            moved.push(current);
            current = self.next(current);
        }

        let g = self.new_face(false);
        let e = self.new_edge();
        let k = self.new_half_edge();
        let kept = self.new_half_edge();

        self.half_edges[k] = HalfEdge {
            twin: kept,
            next: ha,
            vertex: y,
            edge: e,
            face: g,
        };
        self.half_edges[kept] = HalfEdge {
            twin: k,
            next: hb,
            vertex: x,
            edge: e,
            face: f,
        };
        self.half_edges[pa].next = kept;
        self.half_edges[pb].next = k;
        for h in moved {
            self.half_edges[h].face = g;
        }

        self.faces[g].half_edge = ha;
        self.faces[f].half_edge = kept;
        let edge = &mut self.edges[e];
        edge.half_edge = kept;
        edge.is_new = true;

        (kept, g)
    }

    /// Split a face along a new edge between two of its corners.
    ///
    /// Returns the newly created face (the part after `from` in face order).
    pub fn split_face(&mut self, face_id: FaceId, from: VertexId, to: VertexId) -> EditResult<FaceId> {
        self.require_face(face_id)?;
        if self.is_boundary_face(face_id) {
            return Err(Denial::OnBoundary);
        }

        let ring = self.get_face_half_edges(face_id);
        let ha = ring.iter().copied().find(|&h| self.origin(h) == from);
        let hb = ring.iter().copied().find(|&h| self.origin(h) == to);
        let (Some(ha), Some(hb)) = (ha, hb) else {
            return Err(Denial::DegenerateResult);
        };
        if ha == hb || self.next(ha) == hb || self.next(hb) == ha || self.find_edge(from, to).is_some() {
            trace!("split_face: DENY {:?} corners adjacent or already joined", face_id);
            return Err(Denial::DegenerateResult);
        }

        let (_, g) = self.insert_diagonal(ha, hb);
        trace!("split_face: {:?} -> new face {:?}", face_id, g);
        self.debug_validate("split_face");
        Ok(g)
    }

    /// Triangulate one face with a zig-zag strip of diagonals.
    ///
    /// Returns the number of diagonals inserted; triangles are left alone.
    pub fn triangulate_face(&mut self, face_id: FaceId) -> EditResult<usize> {
        self.require_face(face_id)?;
        if self.is_boundary_face(face_id) {
            return Err(Denial::OnBoundary);
        }

        let mut anchor = self.faces[face_id].half_edge;
        let mut cut_before = true;
        let mut inserted = 0;
        while self.face_degree(face_id) > 3 {
            // Alternate the ear between both ends of the last diagonal
            let ha = if cut_before { self.prev(anchor) } else { anchor };
            let hb = self.next(self.next(ha));
            let (kept, _) = self.insert_diagonal(ha, hb);
            anchor = kept;
            cut_before = !cut_before;
            inserted += 1;
        }

        if inserted > 0 {
            trace!("triangulate_face: {:?} +{} diagonals", face_id, inserted);
            self.debug_validate("triangulate_face");
        }
        Ok(inserted)
    }

    /// Triangulate every interior polygon. Returns the number of diagonals inserted.
    pub fn triangulate(&mut self) -> usize {
        let polygons: Vec<FaceId> = self
            .interior_face_ids()
            .filter(|&f| self.face_degree(f) > 3)
            .collect();

        let mut inserted = 0;
        for face in polygons {
            inserted += self.triangulate_face(face).unwrap_or(0);
        }
        tracing::debug!("triangulate: {} diagonals inserted", inserted);
        inserted
    }

    /// Contract a face to a single vertex by collapsing its edges.
    ///
    /// Runs on the mesh in place; composite callers work on a scratch copy
    /// so a denial halfway through leaves their mesh untouched.
    pub(crate) fn contract_face(&mut self, face_id: FaceId) -> EditResult<VertexId> {
        while self.face_degree(face_id) > 3 {
            let e = self.edge_of(self.faces[face_id].half_edge);
            self.collapse_edge(e)?;
        }

        let ring = self.get_face_vertices(face_id);
        let third = ring[2];
        // The face is a triangle: collapsing its first edge dissolves it
        let e = self.edge_of(self.faces[face_id].half_edge);
        let merged = self.collapse_edge(e)?;
        let Some(last) = self.find_edge(merged, third) else {
            return Err(Denial::DegenerateResult);
        };
        self.collapse_edge(last)
    }

    /// Collapse a face to a single vertex at its centroid.
    pub fn collapse_face(&mut self, face_id: FaceId) -> EditResult<VertexId> {
        self.require_face(face_id)?;
        if self.is_boundary_face(face_id) {
            trace!("collapse_face: DENY {:?} is a boundary loop", face_id);
            return Err(Denial::OnBoundary);
        }
        let center = self.face_center(face_id);

        let mut scratch = self.clone();
        let v = scratch.contract_face(face_id).inspect_err(|denial| {
            trace!("collapse_face: DENY {:?}: {}", face_id, denial);
        })?;
        scratch.vertices[v].position = center;
        *self = scratch;

        trace!("collapse_face: {:?} -> vertex {:?}", face_id, v);
        self.debug_validate("collapse_face");
        Ok(v)
    }

    /// Replace a face with a fan of triangles around a new center vertex.
    pub fn inset_vertex(&mut self, face_id: FaceId) -> EditResult<VertexId> {
        self.require_face(face_id)?;
        if self.is_boundary_face(face_id) {
            trace!("inset_vertex: DENY {:?} is a boundary loop", face_id);
            return Err(Denial::OnBoundary);
        }
        let center = self.face_center(face_id);

        let mut scratch = self.clone();
        let inner = scratch.bevel_face(face_id)?;
        let v = scratch.contract_face(inner)?;
        scratch.vertices[v].position = center;
        *self = scratch;

        trace!("inset_vertex: {:?} -> center vertex {:?}", face_id, v);
        self.debug_validate("inset_vertex");
        Ok(v)
    }

    /// Inset a face, moving the inner ring halfway to the centroid.
    ///
    /// Returns the inner face.
    pub fn inset_face(&mut self, face_id: FaceId) -> EditResult<FaceId> {
        let inner = self.bevel_face(face_id)?;
        let center = self.face_center(inner);
        for v in self.get_face_vertices(inner) {
            let position = &mut self.vertices[v].position;
            *position = (*position + center) * 0.5;
        }

        trace!("inset_face: {:?}", face_id);
        Ok(inner)
    }

    /// Centroid and vertex positions of a face, in face order
    pub(crate) fn face_snapshot(&self, face_id: FaceId) -> (Vec3, Vec<Vec3>) {
        let positions: Vec<Vec3> = self
            .get_face_vertices(face_id)
            .into_iter()
            .map(|v| self.position(v))
            .collect();
        (self.face_center(face_id), positions)
    }
}
