//! Per-object world transforms and the scene driver. Mirrors `scene_t` /
//! `draw_scene` in the original source, with `Object3D.mesh` held as an
//! `Rc` so several objects can share one mesh without cloning vertex data.

use std::rc::Rc;

use crate::device::Device;
use crate::math::{get_world_mat, Mat4, Quat, Vec3};
use crate::mesh::Mesh;

/// A mesh reference plus a translation/rotation/scale and its cached world
/// matrix.
pub struct Object3D {
    pub mesh: Rc<Mesh>,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub m_world: Mat4,
}

impl Object3D {
    pub fn new(mesh: Rc<Mesh>) -> Object3D {
        let mut obj = Object3D {
            mesh,
            position: Vec3::zeros(),
            rotation: Quat::IDENTITY,
            scale: Vec3::new(1.0, 1.0, 1.0),
            m_world: Mat4::identity(),
        };
        obj.update_m_world();
        obj
    }

    /// Recomputes `m_world = T(position) * R(rotation) * S(scale)`. Must be
    /// called whenever position/rotation/scale changes.
    pub fn update_m_world(&mut self) {
        self.m_world = get_world_mat(self.position, self.rotation, self.scale);
    }
}

/// Ordered sequence of objects, drawn in insertion order.
#[derive(Default)]
pub struct Scene {
    pub objects: Vec<Object3D>,
}

impl Scene {
    pub fn new() -> Scene {
        Scene::default()
    }
}

/// Draws every object in `scene`, in order, through the device's installed
/// drawer. Sets `device.m_world = device.m_camera * object.m_world` before
/// each one.
pub fn draw_scene(device: &mut Device, scene: &Scene) {
    for object in &scene.objects {
        device.m_world = device.m_camera * object.m_world;
        device.draw_mesh(&object.mesh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn update_m_world_composes_translation_rotation_scale() {
        let mut obj = Object3D::new(Rc::new(Mesh::new()));
        obj.position = Vec3::new(1.0, 2.0, 3.0);
        obj.scale = Vec3::new(2.0, 2.0, 2.0);
        obj.update_m_world();

        let p = obj.m_world * crate::math::vec4_from_vec3(Vec3::zeros());
        assert_relative_eq!(p.xyz(), Vec3::new(1.0, 2.0, 3.0), epsilon = 1e-6);
    }

    #[test]
    fn default_object_world_matrix_is_identity() {
        let obj = Object3D::new(Rc::new(Mesh::new()));
        assert_relative_eq!(obj.m_world, Mat4::identity(), epsilon = 1e-6);
    }
}
