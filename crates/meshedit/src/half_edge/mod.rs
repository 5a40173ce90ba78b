//! Halfedge mesh data structure and local editing operators
//!
//! Every edge owns exactly two half-edges, so open meshes close their
//! boundaries with boundary-loop faces. Elements live in generation-tagged
//! arenas; erasing an element only tombstones it until [`HalfEdgeMesh::compact`]
//! runs, so validation can still see anything that references it.

#[cfg(feature = "bevy")]
mod bevy;
mod bevel;
mod construction;
mod edge_ops;
mod face_ops;
mod store;
mod topology;
mod types;
mod validation;
mod vertex_ops;

use slotmap::SlotMap;
use std::collections::HashSet;

pub use construction::TriangleBuffers;
pub use store::CompactionStats;
pub use types::{
    Denial, EditResult, Edge, EdgeId, Face, FaceId, HalfEdge, HalfEdgeError, HalfEdgeId,
    ValidationError, Vertex, VertexId,
};
pub use validation::ManifoldError;

/// Halfedge mesh data structure
///
/// Owns all four element arenas. Handles stay valid until the element is
/// erased and the mesh is compacted. Cloning takes a full snapshot, which is
/// how callers layer undo on top.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: SlotMap<VertexId, Vertex>,
    pub(crate) edges: SlotMap<EdgeId, Edge>,
    pub(crate) half_edges: SlotMap<HalfEdgeId, HalfEdge>,
    pub(crate) faces: SlotMap<FaceId, Face>,
    /// Tombstones awaiting compaction
    pub(crate) dead_vertices: HashSet<VertexId>,
    pub(crate) dead_edges: HashSet<EdgeId>,
    pub(crate) dead_half_edges: HashSet<HalfEdgeId>,
    pub(crate) dead_faces: HashSet<FaceId>,
}

#[cfg(test)]
pub(crate) mod test_support {
    use glam::Vec3;

    use super::{HalfEdgeMesh, VertexId};

    /// Assert structural validity and manifoldness with a readable message.
    pub fn assert_manifold(mesh: &HalfEdgeMesh) {
        if let Err(e) = mesh.check_manifold() {
            panic!("mesh is not a valid manifold: {e}");
        }
    }

    /// (V, E, F) with F counting interior faces only
    pub fn counts(mesh: &HalfEdgeMesh) -> (usize, usize, usize) {
        (mesh.vertex_count(), mesh.edge_count(), mesh.face_count())
    }

    /// Closed mesh with a hexagon on top and two triangle fans below, split
    /// by the chord 0-3. The hexagon holds both chord endpoints without
    /// owning the chord. Vertex ids come back in input order.
    pub fn chorded_hexagon() -> (HalfEdgeMesh, Vec<VertexId>) {
        let mut positions: Vec<Vec3> = (0..6)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::FRAC_PI_3;
                Vec3::new(angle.cos(), angle.sin(), 0.0)
            })
            .collect();
        positions.push(Vec3::new(0.0, 0.5, -1.0));
        positions.push(Vec3::new(0.0, -0.5, -1.0));
        let polygons = vec![
            vec![0, 1, 2, 3, 4, 5],
            vec![1, 0, 6],
            vec![2, 1, 6],
            vec![3, 2, 6],
            vec![0, 3, 6],
            vec![4, 3, 7],
            vec![5, 4, 7],
            vec![0, 5, 7],
            vec![3, 0, 7],
        ];
        let mesh = HalfEdgeMesh::from_polygons(&positions, &polygons).unwrap();
        let ids = mesh.vertex_ids().collect();
        (mesh, ids)
    }
}
