//! Isotropic remeshing.
//!
//! Each pass drives edge lengths toward a target `L`:
//! 1. split edges longer than `split_ratio * L`
//! 2. collapse edges shorter than `collapse_ratio * L`
//! 3. flip edges that bring vertex valences closer to regular
//! 4. smooth vertices tangentially toward their neighbors' centroid
//!
//! Boundary edges and vertices are left in place.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use meshedit_config::RemeshConfig;

use crate::constants::{MIN_COLLAPSE_VALENCE, REGULAR_VALENCE};
use crate::half_edge::{Denial, EdgeId, EditResult, HalfEdgeMesh, VertexId};

/// Boundary vertices are regular at this valence
const BOUNDARY_REGULAR_VALENCE: usize = 4;

/// Work done by [`HalfEdgeMesh::isotropic_remesh`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemeshStats {
    pub iterations: usize,
    pub splits: usize,
    pub collapses: usize,
    pub flips: usize,
}

impl HalfEdgeMesh {
    /// Remesh a triangle mesh toward uniform edge length.
    pub fn isotropic_remesh(&mut self, config: &RemeshConfig) -> EditResult<RemeshStats> {
        if !self.is_triangle_mesh() {
            return Err(Denial::NotTriangleMesh);
        }
        self.compact();

        let start = Instant::now();
        let target = config.target_length.unwrap_or_else(|| self.mean_edge_length());
        if !(target.is_finite() && target > 0.0) {
            return Err(Denial::DegenerateResult);
        }
        let high = target * config.split_ratio;
        let low = target * config.collapse_ratio;

        let mut stats = RemeshStats::default();
        for pass in 0..config.iterations {
            let splits = self.split_long_edges(high);
            let collapses = self.collapse_short_edges(low, high);
            let flips = self.equalize_valences();
            self.smooth_tangentially(config.smoothing);

            debug!(
                "isotropic_remesh: pass {} split {} collapsed {} flipped {} ({} faces)",
                pass,
                splits,
                collapses,
                flips,
                self.face_count()
            );
            stats.iterations += 1;
            stats.splits += splits;
            stats.collapses += collapses;
            stats.flips += flips;
        }

        info!(
            "isotropic_remesh: target {:.4}, {:?} -> {} faces in {:.2?}",
            target,
            stats,
            self.face_count(),
            start.elapsed()
        );
        self.debug_validate("isotropic_remesh");
        Ok(stats)
    }

    fn split_long_edges(&mut self, high: f32) -> usize {
        let long: Vec<EdgeId> = self
            .edge_ids()
            .filter(|&e| self.edge_length(e) > high)
            .collect();
        long.into_iter()
            .filter(|&e| self.split_edge(e).is_ok())
            .count()
    }

    fn collapse_short_edges(&mut self, low: f32, high: f32) -> usize {
        let candidates: Vec<EdgeId> = self.edge_ids().collect();
        let mut collapses = 0;
        for e in candidates {
            // Earlier collapses in this pass may have removed or stretched it
            if !self.is_edge_live(e) || self.edge_length(e) >= low {
                continue;
            }
            let Some((a, b)) = self.get_edge_vertices(e) else {
                continue;
            };
            if self.check_collapse(e).is_err() || !self.collapse_keeps_valence(e, MIN_COLLAPSE_VALENCE) {
                continue;
            }

            let midpoint = (self.position(a) + self.position(b)) * 0.5;
            let stretches = [a, b]
                .into_iter()
                .flat_map(|v| self.get_adjacent_vertices(v))
                .any(|x| x != a && x != b && self.position(x).distance(midpoint) > high);
            if stretches || self.collapse_would_flip(a, b, midpoint) {
                continue;
            }

            if self.collapse_edge(e).is_ok() {
                collapses += 1;
            }
        }
        self.compact();
        collapses
    }

    /// Flip interior edges whose flip lowers the total valence deviation
    /// of the four vertices involved.
    fn equalize_valences(&mut self) -> usize {
        let edges: Vec<EdgeId> = self.edge_ids().collect();
        let mut flips = 0;
        for e in edges {
            if self.is_boundary_edge(e) {
                continue;
            }
            let h = self.edges[e].half_edge;
            let t = self.twin(h);
            let (a, b) = (self.origin(h), self.origin(t));
            let (c, d) = (self.origin(self.prev(h)), self.origin(self.prev(t)));

            let before = self.valence_deviation(a, 0)
                + self.valence_deviation(b, 0)
                + self.valence_deviation(c, 0)
                + self.valence_deviation(d, 0);
            let after = self.valence_deviation(a, -1)
                + self.valence_deviation(b, -1)
                + self.valence_deviation(c, 1)
                + self.valence_deviation(d, 1);
            if after < before && self.flip_edge(e).is_ok() {
                flips += 1;
            }
        }
        flips
    }

    /// |valence + delta - regular| for a vertex
    fn valence_deviation(&self, v: VertexId, delta: isize) -> usize {
        let regular = if self.is_boundary_vertex(v) {
            BOUNDARY_REGULAR_VALENCE
        } else {
            REGULAR_VALENCE
        };
        (self.vertex_degree(v) as isize + delta).abs_diff(regular as isize)
    }

    /// Move interior vertices toward their neighbors' centroid, within the
    /// tangent plane. All targets are computed before any vertex moves.
    fn smooth_tangentially(&mut self, weight: f32) {
        let mut moves: Vec<(VertexId, Vec3)> = Vec::new();
        for v in self.vertex_ids() {
            if self.is_boundary_vertex(v) {
                continue;
            }
            let neighbors = self.get_adjacent_vertices(v);
            if neighbors.is_empty() {
                continue;
            }
            let p = self.position(v);
            let centroid = neighbors.iter().map(|&x| self.position(x)).sum::<Vec3>() / neighbors.len() as f32;
            let normal = self.vertex_normal(v);
            let offset = centroid - p;
            let tangential = offset - normal * normal.dot(offset);
            moves.push((v, p + tangential * weight));
        }
        for (v, position) in moves {
            self.vertices[v].position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::half_edge::test_support::{assert_manifold, counts};
    use crate::primitives;

    #[test]
    fn test_regular_mesh_is_a_fixed_point() {
        let mut mesh = primitives::icosahedron().unwrap();
        let before: Vec<Vec3> = mesh
            .vertex_ids()
            .map(|v| mesh.vertex(v).unwrap().position)
            .collect();

        let stats = mesh.isotropic_remesh(&RemeshConfig::default()).unwrap();

        assert_eq!(stats.iterations, 6);
        assert_eq!((stats.splits, stats.collapses, stats.flips), (0, 0, 0));
        assert_eq!(counts(&mesh), (12, 30, 20));
        // Neighbor centroids lie on the vertex normal, so smoothing is a no-op
        for (v, p) in mesh.vertex_ids().zip(before) {
            assert!((mesh.vertex(v).unwrap().position - p).length() < 1e-4);
        }
    }

    #[test]
    fn test_remesh_refines_toward_target() {
        let mut mesh = primitives::cube().unwrap();
        mesh.triangulate();
        let initial_mean = mesh.mean_edge_length();
        let config = RemeshConfig {
            target_length: Some(0.5),
            ..Default::default()
        };

        let stats = mesh.isotropic_remesh(&config).unwrap();

        assert!(stats.splits > 0);
        assert!(mesh.is_triangle_mesh());
        assert_eq!(mesh.euler_characteristic(), 2);
        assert_manifold(&mesh);
        assert!(mesh.face_count() > 12);
        assert!(mesh.mean_edge_length() < initial_mean / 2.0);
        assert!(mesh.vertex_ids().all(|v| mesh.vertex(v).unwrap().position.is_finite()));
    }

    #[test]
    fn test_remesh_subdivided_sphere() {
        let mut mesh = primitives::icosahedron().unwrap();
        mesh.loop_subdivide(false).unwrap();
        mesh.loop_subdivide(false).unwrap();
        let config = RemeshConfig {
            iterations: 3,
            ..Default::default()
        };

        let stats = mesh.isotropic_remesh(&config).unwrap();

        assert_eq!(stats.iterations, 3);
        assert!(mesh.is_triangle_mesh());
        assert_eq!(mesh.euler_characteristic(), 2);
        assert_eq!(mesh.pending_erasures(), 0);
        assert_manifold(&mesh);
    }

    #[test]
    fn test_flat_open_mesh_stays_flat() {
        let mut mesh = primitives::grid(3).unwrap();
        mesh.triangulate();
        let boundary_before = mesh.boundary_loop_count();
        let config = RemeshConfig {
            target_length: Some(0.4),
            ..Default::default()
        };

        mesh.isotropic_remesh(&config).unwrap();

        assert_eq!(mesh.boundary_loop_count(), boundary_before);
        assert_manifold(&mesh);
        for v in mesh.vertex_ids() {
            assert!(mesh.vertex(v).unwrap().position.z.abs() < 1e-5);
        }
    }

    #[test]
    fn test_remesh_denials() {
        let mut quads = primitives::cube().unwrap();
        assert_eq!(
            quads.isotropic_remesh(&RemeshConfig::default()),
            Err(Denial::NotTriangleMesh)
        );
        assert_eq!(counts(&quads), (8, 12, 6));

        let mut mesh = primitives::tetrahedron().unwrap();
        let config = RemeshConfig {
            target_length: Some(0.0),
            ..Default::default()
        };
        assert_eq!(mesh.isotropic_remesh(&config), Err(Denial::DegenerateResult));
    }
}
