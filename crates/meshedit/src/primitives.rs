//! Primitive shapes for tests, demos and importer smoke checks.
//!
//! All closed shapes are centered on the origin with outward (counter-clockwise)
//! winding.

use glam::Vec3;

use crate::half_edge::{HalfEdgeError, HalfEdgeMesh};

/// Result of building one of the shapes below
pub type PrimitiveResult = Result<HalfEdgeMesh, HalfEdgeError>;

/// Regular tetrahedron inscribed in the cube `[-1, 1]^3`
pub fn tetrahedron() -> PrimitiveResult {
    let positions = [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
    ];
    let faces = [vec![0, 1, 2], vec![0, 3, 1], vec![0, 2, 3], vec![1, 3, 2]];
    HalfEdgeMesh::from_polygons(&positions, &faces)
}

/// Axis-aligned cube `[-1, 1]^3` made of six quads
pub fn cube() -> PrimitiveResult {
    let positions = [
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
    ];
    let faces = [
        vec![0, 3, 2, 1], // -z
        vec![4, 5, 6, 7], // +z
        vec![0, 1, 5, 4], // -y
        vec![2, 3, 7, 6], // +y
        vec![3, 0, 4, 7], // -x
        vec![1, 2, 6, 5], // +x
    ];
    HalfEdgeMesh::from_polygons(&positions, &faces)
}

/// Octahedron with vertices on the unit axes
pub fn octahedron() -> PrimitiveResult {
    let positions = [
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ];
    let faces = [
        vec![0, 2, 4],
        vec![2, 1, 4],
        vec![1, 3, 4],
        vec![3, 0, 4],
        vec![2, 0, 5],
        vec![1, 2, 5],
        vec![3, 1, 5],
        vec![0, 3, 5],
    ];
    HalfEdgeMesh::from_polygons(&positions, &faces)
}

/// Icosahedron on the unit sphere
pub fn icosahedron() -> PrimitiveResult {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let positions: Vec<Vec3> = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .iter()
    .map(|&(x, y, z)| Vec3::new(x, y, z).normalize())
    .collect();

    let faces = [
        vec![0, 11, 5],
        vec![0, 5, 1],
        vec![0, 1, 7],
        vec![0, 7, 10],
        vec![0, 10, 11],
        vec![1, 5, 9],
        vec![5, 11, 4],
        vec![11, 10, 2],
        vec![10, 7, 6],
        vec![7, 1, 8],
        vec![3, 9, 4],
        vec![3, 4, 2],
        vec![3, 2, 6],
        vec![3, 6, 8],
        vec![3, 8, 9],
        vec![4, 9, 5],
        vec![2, 4, 11],
        vec![6, 2, 10],
        vec![8, 6, 7],
        vec![9, 8, 1],
    ];
    HalfEdgeMesh::from_polygons(&positions, &faces)
}

/// Open `n` x `n` grid of unit quads in the XY plane, facing +Z
pub fn grid(n: usize) -> PrimitiveResult {
    let n = n.max(1);
    let side = n + 1;
    let positions: Vec<Vec3> = (0..side * side)
        .map(|i| Vec3::new((i % side) as f32, (i / side) as f32, 0.0))
        .collect();

    let mut faces = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            let i = row * side + col;
            faces.push(vec![i, i + 1, i + side + 1, i + side]);
        }
    }
    HalfEdgeMesh::from_polygons(&positions, &faces)
}

/// A single triangle in the XY plane (one face, one boundary loop)
pub fn triangle() -> PrimitiveResult {
    let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
    HalfEdgeMesh::from_polygons(&positions, &[vec![0, 1, 2]])
}
