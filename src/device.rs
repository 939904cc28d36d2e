//! The device owns the color buffer (borrowed), the depth buffer (owned),
//! the current transforms and the pluggable shader triple. Mirrors
//! `device_t` in `original_source/include/qpixel.h`.

use crate::math::Mat4;
use crate::mesh::Mesh;

/// Fragment color in BGR order, channels in `[0, 1]` prior to the final
/// round-to-nearest-and-clamp conversion to `u8`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color3 {
    pub b: f32,
    pub g: f32,
    pub r: f32,
}

/// Populates `device.unif`/`device.attr`/`device.vertex` for each triangle
/// of `mesh` and calls `Device::draw_triangle`.
pub type Drawer = fn(device: &mut Device, mesh: &Mesh);

/// Writes one corner's varying block from that corner's attribute block.
pub type VertexShader = fn(unif: &[f32], attr: &[f32], vary: &mut [f32]);

/// Produces one fragment's color from already perspective-corrected
/// varyings and the interpolated `1/z` (`w`).
pub type FragmentShader = fn(unif: &[f32], vary: &[f32], w: f32) -> Color3;

pub struct Device<'a> {
    pub width: u32,
    pub height: u32,

    color_buffer: &'a mut [u8],
    depth_buffer: Vec<f32>,

    pub m_project: Mat4,
    pub m_camera: Mat4,
    pub m_world: Mat4,

    /// Object-space positions of the triangle currently being assembled by
    /// the drawer, filled before `draw_triangle` is called.
    pub vertex: [crate::math::Vec3; 3],

    pub unif: Vec<f32>,
    pub attr: [Vec<f32>; 3],
    pub vary_size: usize,

    pub drawer: Option<Drawer>,
    pub vs: Option<VertexShader>,
    pub fs: Option<FragmentShader>,

    pub triangle_count: u32,
    pub texel_count: u32,
}

impl<'a> Device<'a> {
    /// Stores `width`/`height`, borrows `screen_buffer` as the color buffer,
    /// and allocates a zeroed depth buffer.
    pub fn setup(width: u32, height: u32, screen_buffer: &'a mut [u8]) -> Device<'a> {
        assert_eq!(screen_buffer.len(), width as usize * height as usize * 4);
        Device {
            width,
            height,
            color_buffer: screen_buffer,
            depth_buffer: vec![0.0; width as usize * height as usize],
            m_project: Mat4::identity(),
            m_camera: Mat4::identity(),
            m_world: Mat4::identity(),
            vertex: [crate::math::Vec3::zeros(); 3],
            unif: Vec::new(),
            attr: [Vec::new(), Vec::new(), Vec::new()],
            vary_size: 0,
            drawer: None,
            vs: None,
            fs: None,
            triangle_count: 0,
            texel_count: 0,
        }
    }

    /// (Re)sizes the uniform/attribute/varying scratch regions. The drawer
    /// and shader triple must agree on these sizes; mismatches are a shader
    /// contract violation and are undefined at this level (spec §7).
    pub fn set_shader_sizes(&mut self, unif_size: usize, attr_size: usize, vary_size: usize) {
        self.unif.resize(unif_size, 0.0);
        for a in &mut self.attr {
            a.resize(attr_size, 0.0);
        }
        self.vary_size = vary_size;
    }

    /// Fills color with `(B=127,G=127,R=127,A=255)` and depth with `0.0`;
    /// resets the per-frame counters.
    pub fn clear_buffer(&mut self) {
        for px in self.color_buffer.chunks_exact_mut(4) {
            px[0] = 127;
            px[1] = 127;
            px[2] = 127;
            px[3] = 255;
        }
        self.depth_buffer.iter_mut().for_each(|d| *d = 0.0);
        self.triangle_count = 0;
        self.texel_count = 0;
    }

    /// Dispatches to the installed drawer for `mesh`.
    pub fn draw_mesh(&mut self, mesh: &Mesh) {
        if let Some(drawer) = self.drawer {
            drawer(self, mesh);
        }
    }

    /// Draws the triangle currently assembled in `vertex`/`attr`. The
    /// drawer calls this once per triangle after filling those slots.
    pub fn draw_triangle(&mut self) {
        crate::pipeline::draw_triangle(self);
    }

    pub(crate) fn color_buffer_mut(&mut self) -> &mut [u8] {
        self.color_buffer
    }

    pub(crate) fn depth_buffer_mut(&mut self) -> &mut [f32] {
        &mut self.depth_buffer
    }

    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth_buffer
    }

    pub fn color_buffer(&self) -> &[u8] {
        self.color_buffer
    }
}
