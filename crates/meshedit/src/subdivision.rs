//! Global rebuild: linear and Catmull-Clark subdivision.
//!
//! Subdivision first stages one new position per vertex, edge and face in
//! their `new_position` fields, then emits one quad per face corner and
//! rebuilds the whole mesh from those lists. Every original element becomes
//! exactly one vertex of the result.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use tracing::debug;

use crate::half_edge::{EdgeId, FaceId, HalfEdgeError, HalfEdgeMesh, VertexId};

/// Position rule used by [`HalfEdgeMesh::subdivide`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubdivisionScheme {
    /// Edge midpoints and face centroids; the surface shape is unchanged
    #[default]
    Linear,
    /// Catmull-Clark smoothing; closed meshes only
    CatmullClark,
}

impl HalfEdgeMesh {
    /// Stage positions for linear subdivision.
    pub fn linear_subdivide_positions(&mut self) {
        let vertex_ids: Vec<VertexId> = self.vertex_ids().collect();
        for v in vertex_ids {
            let vertex = &mut self.vertices[v];
            vertex.new_position = vertex.position;
        }

        let edge_ids: Vec<EdgeId> = self.edge_ids().collect();
        for e in edge_ids {
            self.edges[e].new_position = self.edge_center(e);
        }

        let face_ids: Vec<FaceId> = self.interior_face_ids().collect();
        for f in face_ids {
            self.faces[f].new_position = self.face_center(f);
        }
    }

    /// Stage positions for Catmull-Clark subdivision.
    ///
    /// - face point: centroid
    /// - edge point: `(2 * midpoint + face_a + face_b) / 4`
    /// - vertex point: `((n - 3) * p + 2 * R + Q) / n` with `R` the mean of the
    ///   incident edge midpoints and `Q` the mean of the incident face points
    pub fn catmull_clark_subdivide_positions(&mut self) -> Result<(), HalfEdgeError> {
        if self.has_boundary() {
            return Err(HalfEdgeError::HasBoundary);
        }

        let face_ids: Vec<FaceId> = self.interior_face_ids().collect();
        for &f in &face_ids {
            self.faces[f].new_position = self.face_center(f);
        }

        let edge_ids: Vec<EdgeId> = self.edge_ids().collect();
        for e in edge_ids {
            let h = self.edges[e].half_edge;
            let face_a = self.faces[self.face_of(h)].new_position;
            let face_b = self.faces[self.face_of(self.twin(h))].new_position;
            self.edges[e].new_position = (self.edge_center(e) * 2.0 + face_a + face_b) / 4.0;
        }

        // All reads first: vertex points depend on neighbors' old positions
        let mut vertex_points: SecondaryMap<VertexId, Vec3> = SecondaryMap::new();
        for v in self.vertex_ids() {
            let outgoing = self.get_vertex_outgoing(v);
            let n = outgoing.len() as f32;
            let mut r = Vec3::ZERO;
            let mut q = Vec3::ZERO;
            for &h in &outgoing {
                r += self.edge_center(self.edge_of(h));
                q += self.faces[self.face_of(h)].new_position;
            }
            let (r, q) = (r / n, q / n);
            vertex_points.insert(v, ((n - 3.0) * self.position(v) + 2.0 * r + q) / n);
        }
        for (v, point) in vertex_points {
            self.vertices[v].new_position = point;
        }
        Ok(())
    }

    /// Subdivide every interior face into quads and rebuild the mesh.
    ///
    /// Each face of degree `n` becomes `n` quads. Boundary loops are kept open.
    pub fn subdivide(&mut self, scheme: SubdivisionScheme) -> Result<(), HalfEdgeError> {
        match scheme {
            SubdivisionScheme::Linear => self.linear_subdivide_positions(),
            SubdivisionScheme::CatmullClark => self.catmull_clark_subdivide_positions()?,
        }

        let (positions, quads) = self.subdivision_lists();
        let before = (self.vertex_count(), self.edge_count(), self.face_count());
        self.rebuild(&positions, &quads)?;

        debug!(
            "subdivide({:?}): {:?} -> ({}, {}, {})",
            scheme,
            before,
            self.vertex_count(),
            self.edge_count(),
            self.face_count()
        );
        Ok(())
    }

    /// Dense vertex list (vertices, then edges, then faces) and one quad per
    /// face corner, from the staged positions
    fn subdivision_lists(&self) -> (Vec<Vec3>, Vec<Vec<usize>>) {
        let mut positions = Vec::with_capacity(self.vertex_count() + self.edge_count() + self.face_count());
        let mut vertex_index: SecondaryMap<VertexId, usize> = SecondaryMap::new();
        let mut edge_index: SecondaryMap<EdgeId, usize> = SecondaryMap::new();
        let mut face_index: SecondaryMap<FaceId, usize> = SecondaryMap::new();

        for v in self.vertex_ids() {
            vertex_index.insert(v, positions.len());
            positions.push(self.vertices[v].new_position);
        }
        for e in self.edge_ids() {
            edge_index.insert(e, positions.len());
            positions.push(self.edges[e].new_position);
        }
        for f in self.interior_face_ids() {
            face_index.insert(f, positions.len());
            positions.push(self.faces[f].new_position);
        }

        let mut quads = Vec::new();
        for f in self.interior_face_ids() {
            for h in self.get_face_half_edges(f) {
                let next = self.next(h);
                // Corner at the destination of h, in the face's winding
                quads.push(vec![
                    face_index[f],
                    edge_index[self.edge_of(h)],
                    vertex_index[self.origin(next)],
                    edge_index[self.edge_of(next)],
                ]);
            }
        }
        (positions, quads)
    }
}
