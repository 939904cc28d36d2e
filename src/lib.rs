//! Software 3D rasterizer: transforms, clips, rasterizes and shades a scene
//! of triangle meshes into a color buffer and a depth buffer, one frame at a
//! time, without a GPU. See `SPEC_FULL.md` for the full design.

extern crate nalgebra as na;

pub mod device;
pub mod error;
pub mod math;
pub mod mesh;
pub mod pipeline;
pub mod scene;
pub mod texture;

pub use device::{Color3, Device, Drawer, FragmentShader, VertexShader};
pub use error::RenderError;
pub use math::{Aabb, Mat4, Quat, Vec2, Vec3, Vec4};
pub use mesh::{load_mesh, Mesh, MeshType};
pub use scene::{draw_scene, Object3D, Scene};
pub use texture::{load_tga, Image};
