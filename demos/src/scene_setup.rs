//! Built-in fallback geometry, used when no `--model` is given or the given
//! path fails to load. Mirrors `am1ko-sw-renderer`'s `load_default_model`.

use renderer::{Mesh, MeshType, Vec3};

/// An axis-aligned unit cube, 6 faces triangulated to 12, with per-face
/// normals (no texcoords).
pub fn default_cube() -> Mesh {
    let positions = [
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(1.0, 1.0, 1.0),
    ];
    let normals = [
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
    ];

    // (v0, v1, v2, normal) per triangle, 1-based to match the OBJ convention
    // kept throughout the mesh model (spec §3).
    let faces: [(u32, u32, u32, u32); 12] = [
        (1, 2, 4, 1),
        (1, 4, 3, 1),
        (5, 7, 8, 2),
        (5, 8, 6, 2),
        (3, 4, 8, 3),
        (3, 8, 7, 3),
        (1, 5, 6, 4),
        (1, 6, 2, 4),
        (2, 6, 8, 5),
        (2, 8, 4, 5),
        (1, 3, 7, 6),
        (1, 7, 5, 6),
    ];

    let mut mesh = Mesh::new();
    mesh.vertices = positions.to_vec();
    mesh.normals = normals.to_vec();
    mesh.mesh_type = MeshType::NORMAL;
    mesh.n_faces = faces.len() as u32;

    for &(a, b, c, n) in &faces {
        mesh.vertex_idx.extend_from_slice(&[a, b, c]);
        mesh.normal_idx.extend_from_slice(&[n, n, n]);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cube_has_twelve_triangles_over_eight_vertices() {
        let mesh = default_cube();
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.n_faces, 12);
        assert_eq!(mesh.vertex_idx.len(), 36);
    }
}
