//! Quadric error simplification
//!
//! Greedy edge contraction after Garland and Heckbert. Every vertex carries
//! the sum of the plane quadrics of its faces; every edge carries the
//! position minimizing the summed quadric of its endpoints and the error
//! there. The cheapest edge is collapsed until the face budget is met.
//!
//! ## Stale records
//!
//! A collapse changes the quadric of the surviving vertex, so every record
//! touching either endpoint is evicted before the collapse and rebuilt for
//! the edges around the survivor afterwards.

mod quadric;
mod queue;

pub use quadric::Quadric;
pub use queue::EdgeRecord;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use std::time::Instant;
use tracing::{debug, info, trace};

use meshedit_config::SimplifyConfig;

use crate::constants::MIN_COLLAPSE_VALENCE;
use crate::half_edge::{Denial, EdgeId, EditResult, FaceId, HalfEdgeMesh, VertexId};
use queue::CollapseQueue;

/// Outcome of a simplification run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifyReport {
    /// Edges contracted
    pub collapses: usize,
    /// Candidates popped but rejected
    pub skipped: usize,
    pub faces_before: usize,
    pub faces_after: usize,
    /// False when the queue ran dry above the budget
    pub reached_target: bool,
}

impl HalfEdgeMesh {
    /// Simplify to the face budget derived from `config`.
    pub fn simplify(&mut self, config: &SimplifyConfig) -> EditResult<SimplifyReport> {
        let target = config.target_faces(self.face_count());
        self.simplify_to(target)
    }

    /// Collapse edges by increasing quadric error until at most
    /// `target_faces` faces remain or no candidate is left.
    ///
    /// Each collapse removes two triangles, so an odd budget on a closed
    /// mesh stops one face below it.
    pub fn simplify_to(&mut self, target_faces: usize) -> EditResult<SimplifyReport> {
        if !self.is_triangle_mesh() {
            return Err(Denial::NotTriangleMesh);
        }
        self.compact();

        let start = Instant::now();
        let mut report = SimplifyReport {
            faces_before: self.face_count(),
            ..Default::default()
        };

        // ===== PHASE 1: QUADRICS =====
        let mut face_quadrics: SecondaryMap<FaceId, Quadric> = SecondaryMap::new();
        for f in self.interior_face_ids() {
            let corner = self.position(self.origin(self.faces[f].half_edge));
            face_quadrics.insert(f, Quadric::from_plane(self.face_normal(f), corner));
        }
        let mut vertex_quadrics: SecondaryMap<VertexId, Quadric> = SecondaryMap::new();
        for v in self.vertex_ids() {
            let mut q = Quadric::default();
            for f in self.get_vertex_faces(v) {
                if let Some(face_q) = face_quadrics.get(f) {
                    q += *face_q;
                }
            }
            vertex_quadrics.insert(v, q);
        }

        // ===== PHASE 2: SEED THE QUEUE =====
        let mut queue = CollapseQueue::new();
        for e in self.edge_ids() {
            if let Some(record) = self.edge_record(e, &vertex_quadrics) {
                queue.insert(record);
            }
        }
        debug!(
            "simplify: {} faces -> target {}, {} candidates",
            report.faces_before,
            target_faces,
            queue.len()
        );

        // ===== PHASE 3: GREEDY CONTRACTION =====
        // Running count, lowered by the faces each compaction drops
        let mut faces = report.faces_before;
        while faces > target_faces {
            let Some(record) = queue.pop() else {
                break;
            };
            let Some((a, b)) = self.get_edge_vertices(record.edge) else {
                report.skipped += 1;
                continue;
            };
            if a == b
                || self.check_collapse(record.edge).is_err()
                || !self.collapse_keeps_valence(record.edge, MIN_COLLAPSE_VALENCE)
                || self.collapse_would_flip(a, b, record.optimal)
            {
                trace!("simplify: skip {:?} (cost {})", record.edge, record.cost);
                report.skipped += 1;
                continue;
            }

            for v in [a, b] {
                for h in self.get_vertex_outgoing(v) {
                    queue.remove(self.edge_of(h));
                }
            }

            let merged = self.collapse_edge(record.edge)?;
            self.vertices[merged].position = record.optimal;
            let combined = vertex_quadrics.remove(a).unwrap_or_default()
                + vertex_quadrics.remove(b).unwrap_or_default();
            vertex_quadrics.insert(merged, combined);
            faces = faces.saturating_sub(self.compact().faces);

            for h in self.get_vertex_outgoing(merged) {
                if let Some(fresh) = self.edge_record(self.edge_of(h), &vertex_quadrics) {
                    queue.insert(fresh);
                }
            }
            report.collapses += 1;
        }

        report.faces_after = self.face_count();
        report.reached_target = report.faces_after <= target_faces;
        info!(
            "simplify: {} -> {} faces ({} collapses, {} skipped) in {:.2?}",
            report.faces_before,
            report.faces_after,
            report.collapses,
            report.skipped,
            start.elapsed()
        );
        self.debug_validate("simplify");
        Ok(report)
    }

    fn edge_record(&self, edge: EdgeId, quadrics: &SecondaryMap<VertexId, Quadric>) -> Option<EdgeRecord> {
        let (a, b) = self.get_edge_vertices(edge)?;
        let q = *quadrics.get(a)? + *quadrics.get(b)?;
        let (optimal, cost) = q.optimal(self.position(a), self.position(b));
        Some(EdgeRecord { edge, optimal, cost })
    }

    /// True if collapsing the edge leaves every affected vertex with at
    /// least `min_valence` edges.
    pub(crate) fn collapse_keeps_valence(&self, edge_id: EdgeId, min_valence: usize) -> bool {
        let Some((a, b)) = self.get_edge_vertices(edge_id) else {
            return false;
        };
        let apexes = self.common_neighbors(a, b);
        let merged = (self.vertex_degree(a) + self.vertex_degree(b)).saturating_sub(2 + apexes.len());
        merged >= min_valence
            && apexes
                .iter()
                .all(|&x| self.vertex_degree(x) > min_valence)
    }

    /// Check if merging `a` and `b` at `position` would reverse a surviving
    /// face's normal.
    ///
    /// Faces containing both vertices disappear with the collapse and are
    /// not checked.
    pub(crate) fn collapse_would_flip(&self, a: VertexId, b: VertexId, position: Vec3) -> bool {
        for v in [a, b] {
            for face_id in self.get_vertex_faces(v) {
                let corners = self.get_face_vertices(face_id);
                if corners.len() < 3 || (corners.contains(&a) && corners.contains(&b)) {
                    continue;
                }

                let before: Vec<Vec3> = corners.iter().map(|&x| self.position(x)).collect();
                let after: Vec<Vec3> = corners
                    .iter()
                    .map(|&x| if x == a || x == b { position } else { self.position(x) })
                    .collect();

                let current_normal = (before[1] - before[0]).cross(before[2] - before[0]);
                let new_normal = (after[1] - after[0]).cross(after[2] - after[0]);
                if current_normal.dot(new_normal) < 0.0 {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::half_edge::test_support::{assert_manifold, counts};
    use crate::primitives;

    fn subdivided_icosahedron() -> HalfEdgeMesh {
        let mut mesh = primitives::icosahedron().unwrap();
        mesh.loop_subdivide(false).unwrap();
        mesh
    }

    #[test]
    fn test_simplify_to_half() {
        let mut mesh = subdivided_icosahedron();
        assert_eq!(mesh.face_count(), 80);

        let report = mesh.simplify_to(40).unwrap();

        assert_eq!(report.faces_before, 80);
        assert_eq!(report.faces_after, 40);
        assert_eq!(report.collapses, 20);
        assert!(report.reached_target);
        assert_eq!(counts(&mesh), (22, 60, 40));
        assert_eq!(mesh.euler_characteristic(), 2);
        assert_eq!(mesh.pending_erasures(), 0);
        assert_manifold(&mesh);

        for v in mesh.vertex_ids() {
            assert!(mesh.vertex_degree(v) >= MIN_COLLAPSE_VALENCE);
            assert!(mesh.vertex(v).unwrap().position.is_finite());
        }
    }

    #[test]
    fn test_odd_budget_stops_one_face_below() {
        let mut mesh = subdivided_icosahedron();
        let report = mesh.simplify_to(41).unwrap();

        assert_eq!(report.faces_after, 40);
        assert_eq!(report.faces_after, mesh.face_count());
        assert_eq!(report.faces_before - report.faces_after, 2 * report.collapses);
        assert!(report.reached_target);
        assert_manifold(&mesh);
    }

    #[test]
    fn test_simplify_with_config() {
        let mut mesh = subdivided_icosahedron();
        let config = SimplifyConfig {
            target_ratio: 0.5,
            min_faces: 4,
        };
        let report = mesh.simplify(&config).unwrap();
        assert_eq!(report.faces_after, 40);
        assert_manifold(&mesh);
    }

    #[test]
    fn test_simplify_octahedron_to_tetrahedron() {
        let mut mesh = primitives::octahedron().unwrap();
        let report = mesh.simplify_to(4).unwrap();
        assert!(report.reached_target);
        assert_eq!(counts(&mesh), (4, 6, 4));
        assert_manifold(&mesh);
    }

    #[test]
    fn test_simplify_budget_already_met() {
        let mut mesh = primitives::icosahedron().unwrap();
        let before = mesh.to_polygons();
        let report = mesh.simplify_to(20).unwrap();
        assert_eq!(report.collapses, 0);
        assert!(report.reached_target);
        assert_eq!(mesh.to_polygons(), before);
    }

    #[test]
    fn test_simplify_stops_when_queue_runs_dry() {
        // A tetrahedron has no collapse that keeps valence 3
        let mut mesh = primitives::tetrahedron().unwrap();
        let report = mesh.simplify_to(0).unwrap();
        assert_eq!(report.collapses, 0);
        assert_eq!(report.skipped, 6);
        assert!(!report.reached_target);
        assert_eq!(counts(&mesh), (4, 6, 4));
    }

    #[test]
    fn test_simplify_requires_triangles() {
        let mut mesh = primitives::cube().unwrap();
        assert_eq!(mesh.simplify_to(2), Err(Denial::NotTriangleMesh));
        assert_eq!(counts(&mesh), (8, 12, 6));
    }

    #[test]
    fn test_collapse_would_flip() {
        let mesh = primitives::octahedron().unwrap();
        let top = mesh
            .vertex_ids()
            .find(|&v| mesh.vertex(v).unwrap().position.z > 0.9)
            .unwrap();
        let side = mesh.get_adjacent_vertices(top)[0];

        let midpoint = (mesh.vertex(top).unwrap().position + mesh.vertex(side).unwrap().position) * 0.5;
        assert!(!mesh.collapse_would_flip(top, side, midpoint));
        // Dragging the merged vertex through the far side folds the fan over
        assert!(mesh.collapse_would_flip(top, side, Vec3::new(0.0, 0.0, -3.0)));
    }
}
