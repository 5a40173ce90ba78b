//! Conversion to and from Bevy meshes.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use std::collections::HashMap;

use super::types::HalfEdgeError;
use super::HalfEdgeMesh;
use crate::constants::WELD_QUANTIZATION;

impl HalfEdgeMesh {
    /// Build a halfedge mesh from an indexed Bevy triangle list.
    ///
    /// Vertices at the same position are welded first. Bevy primitives
    /// duplicate vertices along UV seams, which would otherwise show up as
    /// open boundaries. Triangles that collapse under welding are dropped.
    pub fn from_bevy_mesh(mesh: &Mesh) -> Result<Self, HalfEdgeError> {
        let positions = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|attr| attr.as_float3())
            .ok_or(HalfEdgeError::NoPositions)?;

        let indices: Vec<usize> = match mesh.indices() {
            Some(Indices::U16(idx)) => idx.iter().map(|&i| i as usize).collect(),
            Some(Indices::U32(idx)) => idx.iter().map(|&i| i as usize).collect(),
            None => return Err(HalfEdgeError::NoIndices),
        };

        // === Vertex Welding ===
        let quantize = |p: &[f32; 3]| -> [i64; 3] {
            [
                (p[0] * WELD_QUANTIZATION).round() as i64,
                (p[1] * WELD_QUANTIZATION).round() as i64,
                (p[2] * WELD_QUANTIZATION).round() as i64,
            ]
        };
        let mut position_to_canonical: HashMap<[i64; 3], usize> = HashMap::new();
        let canonical: Vec<usize> = positions
            .iter()
            .enumerate()
            .map(|(i, p)| *position_to_canonical.entry(quantize(p)).or_insert(i))
            .collect();

        let welded = canonical.iter().enumerate().filter(|(i, c)| **c != *i).count();
        if welded > 0 {
            tracing::debug!(
                "from_bevy_mesh: welded {} duplicate vertices ({} unique of {} total)",
                welded,
                position_to_canonical.len(),
                positions.len()
            );
        }

        // Dense indices over the vertices that survive, in first-use order
        let mut dense: HashMap<usize, usize> = HashMap::new();
        let mut dense_positions: Vec<Vec3> = Vec::new();
        let mut triangles: Vec<Vec<usize>> = Vec::with_capacity(indices.len() / 3);
        let mut dropped = 0;
        for (ti, tri) in indices.chunks(3).enumerate() {
            if tri.len() < 3 {
                return Err(HalfEdgeError::DegenerateFace(ti));
            }
            let mut corners = [0usize; 3];
            for (slot, &index) in corners.iter_mut().zip(tri) {
                let Some(&c) = canonical.get(index) else {
                    return Err(HalfEdgeError::InvalidIndex {
                        polygon: ti,
                        index,
                        count: positions.len(),
                    });
                };
                *slot = c;
            }
            if corners[0] == corners[1] || corners[1] == corners[2] || corners[0] == corners[2] {
                dropped += 1;
                continue;
            }

            let polygon = corners
                .iter()
                .map(|&c| {
                    *dense.entry(c).or_insert_with(|| {
                        dense_positions.push(Vec3::from_array(positions[c]));
                        dense_positions.len() - 1
                    })
                })
                .collect();
            triangles.push(polygon);
        }
        if dropped > 0 {
            tracing::debug!("from_bevy_mesh: dropped {} degenerate triangles", dropped);
        }

        Self::from_polygons(&dense_positions, &triangles)
    }

    /// Flat-shaded Bevy mesh of the interior faces.
    ///
    /// Each face gets its own vertices so normals stay per face; polygons
    /// are fan-triangulated.
    pub fn to_bevy_mesh(&self) -> Mesh {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();

        for face_id in self.interior_face_ids() {
            let corners = self.get_face_vertices(face_id);
            if corners.len() < 3 {
                continue;
            }
            let normal = self.face_normal(face_id).to_array();
            let base = positions.len() as u32;
            for &v in &corners {
                positions.push(self.position(v).to_array());
                normals.push(normal);
            }
            for i in 1..(corners.len() as u32 - 1) {
                indices.extend_from_slice(&[base, base + i, base + i + 1]);
            }
        }

        let uvs = vec![[0.0f32, 0.0]; positions.len()];
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
        mesh.insert_indices(Indices::U32(indices));
        mesh
    }
}
