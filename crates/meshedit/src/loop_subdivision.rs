//! Loop subdivision of closed triangle meshes, in place.
//!
//! Every original edge is split, then each new edge joining an old vertex to
//! a new one is flipped, which leaves four triangles per original triangle.
//! New positions are computed from the coarse connectivity before any split.

use glam::Vec3;
use slotmap::SecondaryMap;
use tracing::debug;

use crate::half_edge::{Denial, EdgeId, EditResult, HalfEdgeMesh, VertexId};

/// Loop weight for the neighbors of a vertex of degree `n`
fn neighbor_weight(n: usize) -> f32 {
    if n == 3 {
        3.0 / 16.0
    } else {
        3.0 / (8.0 * n as f32)
    }
}

impl HalfEdgeMesh {
    /// Refine a closed triangle mesh with Loop subdivision.
    ///
    /// With `linear` set only the connectivity is refined: new vertices stay
    /// at edge midpoints and old vertices do not move.
    ///
    /// Runs on a copy and commits only if every step succeeds.
    pub fn loop_subdivide(&mut self, linear: bool) -> EditResult<()> {
        if !self.is_triangle_mesh() {
            return Err(Denial::NotTriangleMesh);
        }
        if self.has_boundary() {
            return Err(Denial::OnBoundary);
        }

        let before = (self.vertex_count(), self.edge_count(), self.face_count());
        let mut scratch = self.clone();
        scratch.compact();
        for vertex in scratch.vertices.values_mut() {
            vertex.is_new = false;
        }
        for edge in scratch.edges.values_mut() {
            edge.is_new = false;
        }

        // ===== PHASE 1: POSITIONS FROM THE COARSE MESH =====
        let original_edges: Vec<EdgeId> = scratch.edge_ids().collect();
        let mut edge_points: SecondaryMap<EdgeId, Vec3> = SecondaryMap::new();
        for &e in &original_edges {
            let h = scratch.edges[e].half_edge;
            let t = scratch.twin(h);
            let opposite = (scratch.position(scratch.origin(scratch.prev(h)))
                + scratch.position(scratch.origin(scratch.prev(t))))
                * 0.5;
            let point = if linear {
                scratch.edge_center(e)
            } else {
                scratch.edge_center(e) * 0.75 + opposite * 0.25
            };
            edge_points.insert(e, point);
        }

        let vertex_ids: Vec<VertexId> = scratch.vertex_ids().collect();
        for &v in &vertex_ids {
            let position = scratch.position(v);
            scratch.vertices[v].new_position = if linear {
                position
            } else {
                let neighbors = scratch.get_adjacent_vertices(v);
                let n = neighbors.len();
                let u = neighbor_weight(n);
                let sum: Vec3 = neighbors.iter().map(|&x| scratch.position(x)).sum();
                position * (1.0 - n as f32 * u) + sum * u
            };
        }

        // ===== PHASE 2: SPLIT EVERY ORIGINAL EDGE =====
        for &e in &original_edges {
            let m = scratch.split_edge(e)?;
            scratch.vertices[m].new_position = edge_points[e];
            scratch.edges[e].new_position = edge_points[e];
        }

        // ===== PHASE 3: FLIP NEW EDGES THAT TOUCH AN OLD VERTEX =====
        let new_edges: Vec<EdgeId> = scratch
            .edge_ids()
            .filter(|&e| scratch.edges[e].is_new)
            .collect();
        let mut flips = 0;
        for e in new_edges {
            let Some((a, b)) = scratch.get_edge_vertices(e) else {
                continue;
            };
            if scratch.vertices[a].is_new != scratch.vertices[b].is_new {
                scratch.flip_edge(e)?;
                flips += 1;
            }
        }

        // ===== PHASE 4: COMMIT =====
        for vertex in scratch.vertices.values_mut() {
            vertex.position = vertex.new_position;
        }
        *self = scratch;

        debug!(
            "loop_subdivide(linear={}): {:?} -> ({}, {}, {}), {} flips",
            linear,
            before,
            self.vertex_count(),
            self.edge_count(),
            self.face_count(),
            flips
        );
        self.debug_validate("loop_subdivide");
        Ok(())
    }
}
