//! Position updater for bevel and extrude drags.
//!
//! A bevel operator changes connectivity only. While the user drags, the
//! caller keeps the positions captured before the bevel (`start`) and calls
//! one of these functions every frame. They read the snapshot plus current
//! connectivity and write vertex positions, never references, so repeated
//! calls with the same arguments give the same result.
//!
//! `start` lists one position per face vertex, in face order beginning at the
//! face's stored half-edge.

use glam::Vec3;
use tracing::trace;

use meshedit_config::BevelConfig;

use crate::half_edge::{Denial, EditResult, FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

/// Tangent offsets below this would invert the inset through the centroid
const INVERSION_LIMIT: f32 = -0.99;

/// Scale applied to the normal offset of a face bevel
const NORMAL_SCALE: f32 = 1.5;

impl HalfEdgeMesh {
    /// Slide each ring vertex of a vertex bevel along its spoke.
    ///
    /// The offset is clamped to `[0, 1]`: 0 keeps the start position, 1
    /// reaches the spoke midpoint.
    pub fn bevel_vertex_positions(
        &mut self,
        start: &[Vec3],
        face_id: FaceId,
        tangent_offset: f32,
    ) -> EditResult<()> {
        self.slide_along_spokes(start, face_id, tangent_offset)?;
        trace!("bevel_vertex_positions: {:?} offset {}", face_id, tangent_offset);
        Ok(())
    }

    /// Slide each corner of an edge bevel along its spoke, like
    /// [`bevel_vertex_positions`](Self::bevel_vertex_positions).
    pub fn bevel_edge_positions(
        &mut self,
        start: &[Vec3],
        face_id: FaceId,
        tangent_offset: f32,
    ) -> EditResult<()> {
        self.slide_along_spokes(start, face_id, tangent_offset)?;
        trace!("bevel_edge_positions: {:?} offset {}", face_id, tangent_offset);
        Ok(())
    }

    fn slide_along_spokes(&mut self, start: &[Vec3], face_id: FaceId, tangent_offset: f32) -> EditResult<()> {
        let ring = self.ring_snapshot(start, face_id)?;
        let t = tangent_offset.abs().min(1.0);

        let mut updates: Vec<(VertexId, Vec3)> = Vec::with_capacity(ring.len());
        for (&h, &original) in ring.iter().zip(start) {
            // The spoke leaves the ring vertex right after the twin of h
            let spoke = self.next(self.twin(h));
            let far = self.position(self.origin(self.twin(spoke)));
            let midpoint = (original + far) * 0.5;
            updates.push((self.origin(h), midpoint * t + original * (1.0 - t)));
        }
        for (v, position) in updates {
            self.vertices[v].position = position;
        }
        Ok(())
    }

    /// Move the inner ring of a face bevel.
    ///
    /// Each vertex goes to `start + 1.5 * n * N + t * (start - centroid)` where
    /// `N` is the inward normal of the start polygon, so a positive `n` sinks
    /// the inner ring into the surface. `flip_orientation` negates the normal
    /// offset and lifts it out instead.
    pub fn bevel_face_positions(
        &mut self,
        start: &[Vec3],
        face_id: FaceId,
        tangent_offset: f32,
        normal_offset: f32,
        flip_orientation: bool,
    ) -> EditResult<()> {
        let ring = self.ring_snapshot(start, face_id)?;

        let normal_offset = if flip_orientation {
            -normal_offset
        } else {
            normal_offset
        };
        let mut t = tangent_offset;
        if t < INVERSION_LIMIT {
            t = -2.0 - t;
        }

        let n = start.len();
        let centroid = start.iter().copied().sum::<Vec3>() / n as f32;
        // From the first corner's two adjacent edge midpoints
        let corner = start[1];
        let toward_next = (start[1] + start[2 % n]) * 0.5 - corner;
        let toward_prev = (start[0] + start[1]) * 0.5 - corner;
        let normal = toward_prev.cross(toward_next).normalize_or_zero();

        for (&h, &original) in ring.iter().zip(start) {
            let v = self.origin(h);
            self.vertices[v].position =
                original + normal * (NORMAL_SCALE * normal_offset) + (original - centroid) * t;
        }

        trace!(
            "bevel_face_positions: {:?} tangent {} normal {}",
            face_id,
            t,
            normal_offset
        );
        Ok(())
    }

    /// [`bevel_face_positions`](Self::bevel_face_positions) driven by a [`BevelConfig`]
    pub fn apply_face_bevel(&mut self, start: &[Vec3], face_id: FaceId, config: &BevelConfig) -> EditResult<()> {
        self.bevel_face_positions(
            start,
            face_id,
            config.tangent_offset,
            config.normal_offset,
            config.flip_orientation,
        )
    }

    /// Move an extruded apex along the vertex normal.
    pub fn extrude_vertex_position(&mut self, start: Vec3, vertex_id: VertexId, normal_offset: f32) -> EditResult<()> {
        self.require_vertex(vertex_id)?;
        let normal = self.vertex_normal_at(vertex_id, start);
        self.vertices[vertex_id].position = start + normal * normal_offset;
        trace!("extrude_vertex_position: {:?} offset {}", vertex_id, normal_offset);
        Ok(())
    }

    /// Half-edges of a face in order, checked against the snapshot length
    fn ring_snapshot(&self, start: &[Vec3], face_id: FaceId) -> EditResult<Vec<HalfEdgeId>> {
        self.require_face(face_id)?;
        let ring = self.get_face_half_edges(face_id);
        if ring.len() != start.len() {
            return Err(Denial::PositionCountMismatch {
                expected: ring.len(),
                actual: start.len(),
            });
        }
        Ok(ring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    fn beveled_cube_corner() -> (HalfEdgeMesh, FaceId, Vec<Vec3>) {
        let mut mesh = primitives::cube().unwrap();
        let v = mesh.vertex_ids().next().unwrap();
        let face = mesh.bevel_vertex(v).unwrap();
        let (_, start) = mesh.face_snapshot(face);
        (mesh, face, start)
    }

    #[test]
    fn test_vertex_bevel_positions() {
        let (mut mesh, face, start) = beveled_cube_corner();
        mesh.bevel_vertex_positions(&start, face, 0.5).unwrap();

        // Cube edges have length 2: half way to the midpoint is 0.5 along each spoke
        for (v, original) in mesh.get_face_vertices(face).into_iter().zip(&start) {
            let moved = mesh.vertex(v).unwrap().position;
            assert!(((moved - *original).length() - 0.5).abs() < 1e-4);
        }
        assert!(mesh.face_normal(face).length() > 0.9);
    }

    #[test]
    fn test_vertex_bevel_positions_clamp_and_repeat() {
        let (mut mesh, face, start) = beveled_cube_corner();
        mesh.bevel_vertex_positions(&start, face, 7.0).unwrap();
        let (_, clamped) = mesh.face_snapshot(face);
        mesh.bevel_vertex_positions(&start, face, 1.0).unwrap();
        let (_, once) = mesh.face_snapshot(face);
        mesh.bevel_vertex_positions(&start, face, 1.0).unwrap();
        let (_, twice) = mesh.face_snapshot(face);

        assert_eq!(clamped, once);
        assert_eq!(once, twice);
        for (p, q) in once.iter().zip(&start) {
            assert!(((*p - *q).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_position_count_mismatch() {
        let (mut mesh, face, start) = beveled_cube_corner();
        assert_eq!(
            mesh.bevel_vertex_positions(&start[..2], face, 0.5),
            Err(Denial::PositionCountMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(mesh.face_snapshot(face).1, start);
    }

    #[test]
    fn test_edge_bevel_positions() {
        let mut mesh = primitives::cube().unwrap();
        let e = mesh.edge_ids().next().unwrap();
        let face = mesh.bevel_edge(e).unwrap();
        let (_, start) = mesh.face_snapshot(face);

        mesh.bevel_edge_positions(&start, face, 0.25).unwrap();

        let (_, moved) = mesh.face_snapshot(face);
        for (p, q) in moved.iter().zip(&start) {
            assert!(((*p - *q).length() - 0.25).abs() < 1e-4);
        }
        assert!(mesh.face_normal(face).length() > 0.9);
    }

    #[test]
    fn test_face_bevel_positions_inset_and_lift() {
        let mut mesh = primitives::cube().unwrap();
        // Top face z = 1
        let top = mesh
            .interior_face_ids()
            .find(|&f| mesh.face_center(f).z > 0.9)
            .unwrap();
        let inner = mesh.bevel_face(top).unwrap();
        let (center, start) = mesh.face_snapshot(inner);

        mesh.bevel_face_positions(&start, inner, -0.5, 0.2, false).unwrap();

        // Positive normal offset sinks toward the cube's center
        for (p, q) in mesh.face_snapshot(inner).1.iter().zip(&start) {
            let expected = *q - Vec3::Z * 0.3 + (*q - center) * -0.5;
            assert!((*p - expected).length() < 1e-4);
            assert!((p.z - 0.7).abs() < 1e-4);
        }

        mesh.bevel_face_positions(&start, inner, -0.5, 0.2, true).unwrap();
        for p in mesh.face_snapshot(inner).1 {
            assert!((p.z - 1.3).abs() < 1e-4);
        }
    }

    #[test]
    fn test_face_bevel_positions_reflects_inversion() {
        let mut mesh = primitives::cube().unwrap();
        let f = mesh.interior_face_ids().next().unwrap();
        let inner = mesh.bevel_face(f).unwrap();
        let (_, start) = mesh.face_snapshot(inner);

        mesh.bevel_face_positions(&start, inner, -1.5, 0.0, false).unwrap();
        let (_, reflected) = mesh.face_snapshot(inner);
        mesh.bevel_face_positions(&start, inner, -0.5, 0.0, false).unwrap();
        let (_, direct) = mesh.face_snapshot(inner);

        for (p, q) in reflected.iter().zip(&direct) {
            assert!((*p - *q).length() < 1e-4);
        }
    }

    #[test]
    fn test_apply_face_bevel_config() {
        let mut mesh = primitives::cube().unwrap();
        let f = mesh.interior_face_ids().next().unwrap();
        let inner = mesh.bevel_face(f).unwrap();
        let (_, start) = mesh.face_snapshot(inner);
        let config = BevelConfig {
            tangent_offset: -0.25,
            normal_offset: 0.0,
            ..Default::default()
        };

        mesh.apply_face_bevel(&start, inner, &config).unwrap();
        let (_, by_config) = mesh.face_snapshot(inner);
        mesh.bevel_face_positions(&start, inner, -0.25, 0.0, false).unwrap();
        assert_eq!(mesh.face_snapshot(inner).1, by_config);
    }

    #[test]
    fn test_extrude_vertex_position() {
        let mut mesh = primitives::octahedron().unwrap();
        // +z apex
        let v = mesh
            .vertex_ids()
            .find(|&v| mesh.vertex(v).unwrap().position.z > 0.9)
            .unwrap();
        let apex = mesh.extrude_vertex(v).unwrap();
        let start = mesh.vertex(apex).unwrap().position;
        // The apex starts at the ring centroid, below the old tip
        assert!(start.z < 1.0 && start.truncate().length() < 1e-4);

        mesh.extrude_vertex_position(start, apex, 0.5).unwrap();
        let moved = mesh.vertex(apex).unwrap().position;
        assert!((moved - (start + Vec3::Z * 0.5)).length() < 1e-4);

        mesh.extrude_vertex_position(start, apex, 0.0).unwrap();
        assert_eq!(mesh.vertex(apex).unwrap().position, start);
    }
}
