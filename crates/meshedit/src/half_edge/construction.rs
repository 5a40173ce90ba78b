//! Construction and export methods for HalfEdgeMesh.
//!
//! Importers hand over a flat position list plus polygon index lists; this is
//! also the path the global rebuild (subdivision) takes to replace the mesh
//! wholesale.

use glam::Vec3;
use slotmap::Key;
use std::collections::HashMap;

use super::types::{HalfEdgeError, HalfEdgeId, VertexId};
use super::HalfEdgeMesh;

/// Flat triangle buffers for renderers.
///
/// Polygons are fan-triangulated; only live interior faces are emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleBuffers {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl TriangleBuffers {
    /// Vertex buffer as raw bytes (tightly packed `f32` triples)
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl HalfEdgeMesh {
    /// Build a halfedge mesh from polygons with consistent winding.
    ///
    /// Open edges are closed off with boundary-loop faces so that every
    /// half-edge ends up with a twin.
    pub fn from_polygons(positions: &[Vec3], polygons: &[Vec<usize>]) -> Result<Self, HalfEdgeError> {
        // ===== PHASE 1: CHECK INPUT (fail before allocating) =====
        for (pi, poly) in polygons.iter().enumerate() {
            if poly.len() < 3 {
                return Err(HalfEdgeError::DegenerateFace(pi));
            }
            for (ci, &index) in poly.iter().enumerate() {
                if index >= positions.len() {
                    return Err(HalfEdgeError::InvalidIndex {
                        polygon: pi,
                        index,
                        count: positions.len(),
                    });
                }
                if poly[..ci].contains(&index) {
                    return Err(HalfEdgeError::DegenerateFace(pi));
                }
            }
        }

        let mut mesh = Self::new();
        let vertex_ids: Vec<VertexId> = positions.iter().map(|&p| mesh.new_vertex(p)).collect();

        // ===== PHASE 2: INTERIOR FACES =====
        let mut directed: HashMap<(usize, usize), HalfEdgeId> = HashMap::new();
        let mut outgoing_count = vec![0usize; positions.len()];

        for (pi, poly) in polygons.iter().enumerate() {
            let face = mesh.new_face(false);
            let ring: Vec<HalfEdgeId> = poly.iter().map(|_| mesh.new_half_edge()).collect();

            for (i, &h) in ring.iter().enumerate() {
                let from = poly[i];
                let to = poly[(i + 1) % poly.len()];
                if directed.insert((from, to), h).is_some() {
                    return Err(HalfEdgeError::NonManifoldEdge(from, to));
                }

                let he = &mut mesh.half_edges[h];
                he.vertex = vertex_ids[from];
                he.next = ring[(i + 1) % ring.len()];
                he.face = face;

                outgoing_count[from] += 1;
                mesh.vertices[vertex_ids[from]].half_edge = h;
            }
            mesh.faces[face].half_edge = ring[0];
            tracing::trace!("from_polygons: polygon {} -> {:?}", pi, face);
        }

        if let Some(isolated) = outgoing_count.iter().position(|&n| n == 0) {
            return Err(HalfEdgeError::IsolatedVertex(isolated));
        }

        // ===== PHASE 3: TWINS AND EDGES =====
        // Sorted so that edge allocation order does not depend on hash order
        let mut keys: Vec<(usize, usize)> = directed.keys().copied().collect();
        keys.sort_unstable();

        let mut open: Vec<((usize, usize), HalfEdgeId)> = Vec::new();
        for &(from, to) in &keys {
            let h = directed[&(from, to)];
            match directed.get(&(to, from)) {
                Some(&t) => {
                    if from < to {
                        let edge = mesh.new_edge();
                        mesh.edges[edge].half_edge = h;
                        mesh.half_edges[h].twin = t;
                        mesh.half_edges[h].edge = edge;
                        mesh.half_edges[t].twin = h;
                        mesh.half_edges[t].edge = edge;
                    }
                }
                None => open.push(((from, to), h)),
            }
        }

        // ===== PHASE 4: BOUNDARY LOOPS =====
        // Each open half-edge from -> to gets a boundary twin to -> from.
        let mut boundary_from: HashMap<usize, HalfEdgeId> = HashMap::new();
        let mut boundary_order: Vec<HalfEdgeId> = Vec::with_capacity(open.len());
        for &((from, to), h) in &open {
            let edge = mesh.new_edge();
            let b = mesh.new_half_edge();
            mesh.edges[edge].half_edge = h;
            mesh.half_edges[h].twin = b;
            mesh.half_edges[h].edge = edge;
            mesh.half_edges[b] = super::types::HalfEdge {
                twin: h,
                vertex: vertex_ids[to],
                edge,
                ..Default::default()
            };
            if boundary_from.insert(to, b).is_some() {
                // Two boundary chains pass through this vertex
                return Err(HalfEdgeError::NonManifoldVertex(to));
            }
            outgoing_count[to] += 1;
            boundary_order.push(b);
        }

        // A boundary half-edge to -> from continues with the one leaving `from`
        for (&((from, _), _), &b) in open.iter().zip(&boundary_order) {
            match boundary_from.get(&from) {
                Some(&next) => mesh.half_edges[b].next = next,
                None => return Err(HalfEdgeError::NonManifoldVertex(from)),
            }
        }

        for &b in &boundary_order {
            if !mesh.half_edges[b].face.is_null() {
                continue;
            }
            let face = mesh.new_face(true);
            mesh.faces[face].half_edge = b;
            let mut current = b;
            loop {
                mesh.half_edges[current].face = face;
                current = mesh.half_edges[current].next;
                if current == b {
                    break;
                }
            }
        }

        // ===== PHASE 5: SINGLE FAN PER VERTEX =====
        for (index, &v) in vertex_ids.iter().enumerate() {
            if mesh.vertex_degree(v) != outgoing_count[index] {
                return Err(HalfEdgeError::NonManifoldVertex(index));
            }
        }

        tracing::debug!(
            "from_polygons: built {} verts, {} edges, {} faces, {} boundary loops",
            mesh.vertex_count(),
            mesh.edge_count(),
            mesh.face_count(),
            mesh.boundary_loop_count()
        );

        Ok(mesh)
    }

    /// Replace the whole mesh with one built from polygons.
    ///
    /// On error the current mesh is left untouched.
    pub fn rebuild(&mut self, positions: &[Vec3], polygons: &[Vec<usize>]) -> Result<(), HalfEdgeError> {
        *self = Self::from_polygons(positions, polygons)?;
        Ok(())
    }

    /// Export live vertices and interior faces with dense indices
    pub fn to_polygons(&self) -> (Vec<Vec3>, Vec<Vec<usize>>) {
        let mut index_of: HashMap<VertexId, usize> = HashMap::with_capacity(self.vertex_count());
        let mut positions = Vec::with_capacity(self.vertex_count());
        for v in self.vertex_ids() {
            index_of.insert(v, positions.len());
            positions.push(self.position(v));
        }

        let polygons = self
            .interior_face_ids()
            .map(|f| {
                self.get_face_vertices(f)
                    .into_iter()
                    .map(|v| index_of[&v])
                    .collect()
            })
            .collect();

        (positions, polygons)
    }

    /// Shared-vertex triangle buffers (fan triangulation of each face)
    pub fn triangle_buffers(&self) -> TriangleBuffers {
        let (positions, polygons) = self.to_polygons();
        let mut indices = Vec::new();
        for poly in &polygons {
            for i in 1..poly.len().saturating_sub(1) {
                indices.push(poly[0] as u32);
                indices.push(poly[i] as u32);
                indices.push(poly[i + 1] as u32);
            }
        }
        TriangleBuffers {
            positions: positions.iter().map(|p| p.to_array()).collect(),
            indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::half_edge::test_support::assert_manifold;
    use crate::primitives;

    fn quad_positions() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_single_triangle_gets_boundary_loop() {
        let mesh = HalfEdgeMesh::from_polygons(&quad_positions()[..3], &[vec![0, 1, 2]]).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.edge_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.boundary_loop_count(), 1);
        assert!(mesh.validate().is_ok());

        let boundary = mesh.boundary_loop_ids().next().unwrap();
        assert_eq!(mesh.face_degree(boundary), 3);
    }

    #[test]
    fn test_closed_mesh_has_no_boundary() {
        let mesh = primitives::cube().unwrap();
        assert_eq!(mesh.boundary_loop_count(), 0);
        assert_manifold(&mesh);
    }

    #[test]
    fn test_rejects_bad_input() {
        let positions = quad_positions();
        assert_eq!(
            HalfEdgeMesh::from_polygons(&positions, &[vec![0, 1]]).unwrap_err(),
            HalfEdgeError::DegenerateFace(0)
        );
        assert_eq!(
            HalfEdgeMesh::from_polygons(&positions, &[vec![0, 1, 1, 2]]).unwrap_err(),
            HalfEdgeError::DegenerateFace(0)
        );
        assert!(matches!(
            HalfEdgeMesh::from_polygons(&positions, &[vec![0, 1, 9]]),
            Err(HalfEdgeError::InvalidIndex { index: 9, .. })
        ));
        // Same winding twice over the shared edge 0 -> 1
        assert_eq!(
            HalfEdgeMesh::from_polygons(&positions, &[vec![0, 1, 2], vec![0, 1, 3]]).unwrap_err(),
            HalfEdgeError::NonManifoldEdge(0, 1)
        );
        assert_eq!(
            HalfEdgeMesh::from_polygons(&positions, &[vec![0, 1, 2]]).unwrap_err(),
            HalfEdgeError::IsolatedVertex(3)
        );
    }

    #[test]
    fn test_bowtie_vertex_is_rejected() {
        // Two triangles touching at vertex 0 only
        let positions = vec![
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
        ];
        let result = HalfEdgeMesh::from_polygons(&positions, &[vec![0, 1, 2], vec![0, 3, 4]]);
        assert_eq!(result.unwrap_err(), HalfEdgeError::NonManifoldVertex(0));
    }

    #[test]
    fn test_rebuild_keeps_mesh_on_error() {
        let mut mesh = primitives::tetrahedron().unwrap();
        let before = mesh.to_polygons();
        assert!(mesh.rebuild(&quad_positions(), &[vec![0, 1]]).is_err());
        assert_eq!(mesh.to_polygons(), before);
    }

    #[test]
    fn test_polygon_round_trip_preserves_faces() {
        let mesh = primitives::cube().unwrap();
        let (positions, polygons) = mesh.to_polygons();
        let rebuilt = HalfEdgeMesh::from_polygons(&positions, &polygons).unwrap();
        assert_eq!(rebuilt.to_polygons(), (positions, polygons));
    }

    #[test]
    fn test_triangle_buffers() {
        let buffers = primitives::cube().unwrap().triangle_buffers();
        assert_eq!(buffers.positions.len(), 8);
        assert_eq!(buffers.triangle_count(), 12);
        assert_eq!(buffers.position_bytes().len(), 8 * 3 * 4);
        assert!(buffers.indices.iter().all(|&i| i < 8));
    }
}
