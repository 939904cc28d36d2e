//! The concrete vertex/fragment program pair for the demo: a single
//! directional light over a flat base color, driven entirely through the
//! uniform/attribute/varying float ABI described in spec §4.3/§6.
//!
//! Uniform layout: `[light.x, light.y, light.z, base.r, base.g, base.b]`.
//! Attribute layout (per corner): `[normal.x, normal.y, normal.z]`.
//! Varying layout (per corner): `[normal.x, normal.y, normal.z]`.

use renderer::{Color3, Device, Mesh, MeshType, Vec3};

pub const UNIF_SIZE: usize = 6;
pub const ATTR_SIZE: usize = 3;
pub const VARY_SIZE: usize = 3;

pub fn light_uniforms(light_dir: Vec3, base_color: (f32, f32, f32)) -> [f32; UNIF_SIZE] {
    let l = light_dir.normalize();
    [l.x, l.y, l.z, base_color.0, base_color.1, base_color.2]
}

/// Populates `device.unif` and, for every triangle of `mesh`, the vertex
/// and attribute slots before calling `device.draw_triangle()`.
pub fn drawer(device: &mut Device, mesh: &Mesh) {
    let has_normals = mesh.mesh_type.contains(MeshType::NORMAL);

    for face in 0..mesh.n_faces as usize {
        for corner in 0..3 {
            let k = face * 3 + corner;
            device.vertex[corner] = mesh.corner_position(k);
            let normal = if has_normals {
                mesh.corner_normal(k)
            } else {
                Vec3::new(0.0, 0.0, 1.0)
            };
            device.attr[corner][0] = normal.x;
            device.attr[corner][1] = normal.y;
            device.attr[corner][2] = normal.z;
        }
        device.draw_triangle();
    }
}

pub fn vertex_shader(_unif: &[f32], attr: &[f32], vary: &mut [f32]) {
    vary[0] = attr[0];
    vary[1] = attr[1];
    vary[2] = attr[2];
}

pub fn fragment_shader(unif: &[f32], vary: &[f32], _w: f32) -> Color3 {
    let light = Vec3::new(unif[0], unif[1], unif[2]);
    let normal = Vec3::new(vary[0], vary[1], vary[2]);
    let normal = if normal.norm_squared() > 1e-12 {
        normal.normalize()
    } else {
        Vec3::new(0.0, 0.0, 1.0)
    };
    let brightness = normal.dot(&light).max(0.1);

    Color3 {
        r: unif[3] * brightness,
        g: unif[4] * brightness,
        b: unif[5] * brightness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_shader_is_brighter_facing_the_light() {
        let unif = light_uniforms(Vec3::new(0.0, 0.0, -1.0), (1.0, 1.0, 1.0));
        let facing = fragment_shader(&unif, &[0.0, 0.0, -1.0], 1.0);
        let away = fragment_shader(&unif, &[0.0, 0.0, 1.0], 1.0);
        assert!(facing.r > away.r);
    }
}
