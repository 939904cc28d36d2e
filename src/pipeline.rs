//! The render pipeline: world/projection transform, programmable vertex
//! stage, homogeneous clipping, perspective divide, back-face culling and
//! scanline rasterization with a 1/w depth test. Mirrors
//! `draw_triangle`/`draw_mesh` in `original_source/include/qpixel.h`, with
//! clipping added per spec §4.4 (the canonical, clipping+counters variant).

use smallvec::SmallVec;

use crate::device::Device;
use crate::math::{clip_float, lerp, vec4_from_vec3, vec4_normalize, Vec2, Vec4};

/// A pipeline-internal vertex: the homogeneous point (`pndc`, meaningful
/// pre-divide during clipping and post-divide after), the screen-space
/// position (`ps`, valid only after the perspective divide stage), the
/// interpolation depth `w` (`1/z` after the divide), and an owned varying
/// block. Cloning allocates a fresh `vary`; interpolation produces a new
/// owned vertex.
#[derive(Clone, Debug)]
struct PipelineVertex {
    pndc: Vec4,
    ps: Vec2,
    w: f32,
    vary: Vec<f32>,
}

impl PipelineVertex {
    fn lerp(a: &PipelineVertex, b: &PipelineVertex, t: f32) -> PipelineVertex {
        PipelineVertex {
            pndc: a.pndc + (b.pndc - a.pndc) * t,
            ps: Vec2::new(lerp(a.ps.x, b.ps.x, t), lerp(a.ps.y, b.ps.y, t)),
            w: lerp(a.w, b.w, t),
            vary: a
                .vary
                .iter()
                .zip(&b.vary)
                .map(|(x, y)| lerp(*x, *y, t))
                .collect(),
        }
    }

    /// `(self - other) / dy`, used to build per-scanline step vectors.
    fn step_from(&self, top: &PipelineVertex, dy: f32) -> PipelineVertex {
        PipelineVertex {
            pndc: (self.pndc - top.pndc) / dy,
            ps: Vec2::new((self.ps.x - top.ps.x) / dy, (self.ps.y - top.ps.y) / dy),
            w: (self.w - top.w) / dy,
            vary: self
                .vary
                .iter()
                .zip(&top.vary)
                .map(|(b, t)| (b - t) / dy)
                .collect(),
        }
    }

    fn add_assign(&mut self, step: &PipelineVertex) {
        self.ps += step.ps;
        self.w += step.w;
        for (a, s) in self.vary.iter_mut().zip(&step.vary) {
            *a += s;
        }
    }
}

/// Canonical view volume half-space tests: `f(v) >= 0` means inside.
const PLANES: [fn(Vec4) -> f32; 6] = [
    |v| v.x + v.w, // LEFT:   x >= -w
    |v| v.w - v.x, // RIGHT:  x <= w
    |v| v.y + v.w, // TOP:    y >= -w  (note: buffer flip happens at rasterization, not here)
    |v| v.w - v.y, // BOTTOM: y <= w
    |v| v.z + v.w, // FRONT:  z >= -w
    |v| v.w - v.z, // REAR:   z <= w
];

type Polygon = SmallVec<[PipelineVertex; 9]>;

/// Sutherland-Hodgman clip of `poly` against one half-space plane.
fn clip_plane(poly: &Polygon, plane: fn(Vec4) -> f32) -> Polygon {
    let mut out = Polygon::new();
    if poly.is_empty() {
        return out;
    }
    for i in 0..poly.len() {
        let cur = &poly[i];
        let next = &poly[(i + 1) % poly.len()];
        let f_cur = plane(cur.pndc);
        let f_next = plane(next.pndc);

        if f_cur >= 0.0 {
            out.push(cur.clone());
        }
        if (f_cur >= 0.0) != (f_next >= 0.0) {
            let t = f_cur / (f_cur - f_next);
            out.push(PipelineVertex::lerp(cur, next, t));
        }
    }
    out
}

/// Draws the triangle currently assembled in `device.vertex`/`device.attr`.
/// Runs the full stage 1-8 pipeline described in spec §4.4-4.5.
pub fn draw_triangle(device: &mut Device) {
    // Stage 1: world transform (object-space -> camera-space homogeneous).
    let camera_points: [Vec4; 3] =
        std::array::from_fn(|i| device.m_world * vec4_from_vec3(device.vertex[i]));

    // Stage 2: projection.
    let mut corners: Vec<PipelineVertex> = (0..3)
        .map(|i| PipelineVertex {
            pndc: device.m_project * camera_points[i],
            ps: Vec2::zeros(),
            w: 0.0,
            vary: vec![0.0; device.vary_size],
        })
        .collect();

    // Stage 3: vertex program.
    if let Some(vs) = device.vs {
        for i in 0..3 {
            vs(&device.unif, &device.attr[i], &mut corners[i].vary);
        }
    }

    // Stage 4: homogeneous clipping against the six canonical planes.
    let mut polygon: Polygon = corners.into_iter().collect();
    for plane in PLANES {
        polygon = clip_plane(&polygon, plane);
        if polygon.is_empty() {
            log::trace!("triangle fully clipped, skipping");
            return;
        }
    }
    if polygon.len() < 3 {
        log::trace!("clip polygon degenerated to {} vertices, skipping", polygon.len());
        return;
    }

    // Stage 5: perspective divide & screen mapping.
    for v in &mut polygon {
        let w = 1.0 / v.pndc.w;
        for e in v.vary.iter_mut() {
            *e *= w;
        }
        v.pndc = vec4_normalize(v.pndc);
        v.w = w;
        v.ps.x = clip_float(v.pndc.x * 0.5 + 0.5, 0.0, 1.0) * device.width as f32;
        v.ps.y = clip_float(v.pndc.y * 0.5 + 0.5, 0.0, 1.0) * device.height as f32;
    }

    // Stage 6: fan triangulation, stage 7: back-face cull, stage 8: raster.
    for i in 1..polygon.len() - 1 {
        let tri = [polygon[0].clone(), polygon[i].clone(), polygon[i + 1].clone()];

        let e1 = tri[1].ps - tri[0].ps;
        let e2 = tri[2].ps - tri[0].ps;
        let cross_z = e1.x * e2.y - e1.y * e2.x;
        if cross_z >= 0.0 {
            continue;
        }

        device.triangle_count += 1;
        rasterize_triangle(device, tri);
    }
}

/// Splits the triangle into top/bottom trapezoids (§4.5) and scans them.
fn rasterize_triangle(device: &mut Device, mut tri: [PipelineVertex; 3]) {
    tri.sort_by(|a, b| a.ps.y.partial_cmp(&b.ps.y).unwrap());
    let [a, b, c] = tri;

    if c.ps.y == a.ps.y {
        // Degenerate (zero-height) triangle: guard against division by zero.
        log::trace!("zero-height triangle, skipping");
        return;
    }
    let t = (b.ps.y - a.ps.y) / (c.ps.y - a.ps.y);
    let d = PipelineVertex::lerp(&a, &c, t);

    let (left_mid, right_mid) = if b.ps.x <= d.ps.x { (b, d) } else { (d, b) };

    rasterize_trapezoid(device, &a, &a, &left_mid, &right_mid);
    rasterize_trapezoid(device, &left_mid, &right_mid, &c, &c);
}

/// Scans one trapezoid: `top_left`/`top_right` form the (possibly
/// degenerate) top edge, `bottom_left`/`bottom_right` the bottom edge.
fn rasterize_trapezoid(
    device: &mut Device,
    top_left: &PipelineVertex,
    top_right: &PipelineVertex,
    bottom_left: &PipelineVertex,
    bottom_right: &PipelineVertex,
) {
    let top_y = top_left.ps.y;
    let bottom_y = bottom_left.ps.y;
    if top_y == bottom_y {
        return;
    }
    let dy = bottom_y - top_y;

    let left_step = bottom_left.step_from(top_left, dy);
    let right_step = bottom_right.step_from(top_right, dy);

    let mut y = top_y.ceil();
    let t0 = (y - top_y) / dy;
    let mut left = PipelineVertex::lerp(top_left, bottom_left, t0);
    let mut right = PipelineVertex::lerp(top_right, bottom_right, t0);

    while y <= bottom_y {
        scan_line(device, y, &left, &right);
        y += 1.0;
        left.add_assign(&left_step);
        right.add_assign(&right_step);
    }
}

fn scan_line(device: &mut Device, y: f32, left: &PipelineVertex, right: &PipelineVertex) {
    if left.ps.x == right.ps.x {
        return;
    }
    let iy = y as i32;
    if iy < 0 || iy >= device.height as i32 {
        return;
    }

    let dx = right.ps.x - left.ps.x;
    let step = right.step_from(left, dx);

    let mut ix = left.ps.x.ceil();
    let t0 = (ix - left.ps.x) / dx;
    let mut cur = PipelineVertex::lerp(left, right, t0);

    let x_end = right.ps.x.floor();
    while ix <= x_end {
        let px = ix as i32;
        if px >= 0 && px < device.width as i32 {
            shade_pixel(device, px as u32, iy as u32, &cur);
        }
        ix += 1.0;
        cur.add_assign(&step);
    }
}

fn shade_pixel(device: &mut Device, x: u32, y: u32, v: &PipelineVertex) {
    let row = device.height - 1 - y;
    let idx = (row as usize * device.width as usize) + x as usize;

    if v.w <= device.depth_buffer()[idx] {
        return;
    }

    let Some(fs) = device.fs else { return };
    let real_vary: Vec<f32> = v.vary.iter().map(|e| e / v.w).collect();
    let color = fs(&device.unif, &real_vary, v.w);

    device.depth_buffer_mut()[idx] = v.w;
    let px_idx = idx * 4;
    let buf = device.color_buffer_mut();
    buf[px_idx] = (clip_float(color.b, 0.0, 1.0) * 255.0).round() as u8;
    buf[px_idx + 1] = (clip_float(color.g, 0.0, 1.0) * 255.0).round() as u8;
    buf[px_idx + 2] = (clip_float(color.r, 0.0, 1.0) * 255.0).round() as u8;
    buf[px_idx + 3] = 255;
    device.texel_count += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Color3, Device};
    use crate::math::{get_lookat_mat, get_projection_mat, Vec3};

    fn make_vertex(x: f32, y: f32, z: f32, w: f32) -> PipelineVertex {
        PipelineVertex { pndc: Vec4::new(x, y, z, w), ps: Vec2::zeros(), w: 0.0, vary: vec![] }
    }

    #[test]
    fn clip_plane_leaves_an_all_inside_polygon_unchanged() {
        let poly: Polygon = [
            make_vertex(-0.5, -0.5, 0.0, 1.0),
            make_vertex(0.5, -0.5, 0.0, 1.0),
            make_vertex(0.0, 0.5, 0.0, 1.0),
        ]
        .into_iter()
        .collect();

        let clipped = clip_plane(&poly, PLANES[0]);

        assert_eq!(clipped.len(), poly.len());
        for (a, b) in clipped.iter().zip(poly.iter()) {
            assert_eq!(a.pndc, b.pndc);
        }
    }

    fn solid_red_fs(_unif: &[f32], _vary: &[f32], _w: f32) -> Color3 {
        Color3 { b: 0.0, g: 0.0, r: 1.0 }
    }

    fn passthrough_vs(_unif: &[f32], _attr: &[f32], _vary: &mut [f32]) {}

    fn setup_centered_triangle<'a>(buf: &'a mut [u8], width: u32, height: u32, ccw: bool) -> Device<'a> {
        let mut device = Device::setup(width, height, buf);
        device.clear_buffer();
        device.set_shader_sizes(0, 0, 0);
        device.vs = Some(passthrough_vs);
        device.fs = Some(solid_red_fs);

        device.m_project = get_projection_mat(90.0, 1.0, 1.0, 100.0);
        device.m_camera = get_lookat_mat(
            Vec3::new(0.0, 0.0, -3.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        device.m_world = device.m_camera;

        if ccw {
            device.vertex = [
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ];
        } else {
            device.vertex = [
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
            ];
        }
        device
    }

    #[test]
    fn centered_triangle_colors_center_pixel_red() {
        let width = 64;
        let height = 64;
        let mut buf = vec![0u8; width as usize * height as usize * 4];
        let mut device = setup_centered_triangle(&mut buf, width, height, true);

        draw_triangle(&mut device);

        let cx = width / 2;
        let cy = height / 2;
        let row = device.height - 1 - cy;
        let idx = (row as usize * device.width as usize + cx as usize) * 4;
        let px = &device.color_buffer()[idx..idx + 4];
        assert_eq!(px, &[0, 0, 255, 255]);
        assert_eq!(device.triangle_count, 1);
    }

    #[test]
    fn back_facing_winding_is_culled() {
        let width = 64;
        let height = 64;
        let mut buf = vec![0u8; width as usize * height as usize * 4];
        let mut device = setup_centered_triangle(&mut buf, width, height, false);

        draw_triangle(&mut device);

        assert_eq!(device.triangle_count, 0);
        assert!(device.color_buffer().chunks_exact(4).all(|px| px == [127, 127, 127, 255]));
    }

    #[test]
    fn nearer_triangle_occludes_farther_regardless_of_order() {
        let width = 16;
        let height = 16;
        let mut buf = vec![0u8; width as usize * height as usize * 4];

        fn blue_fs(_u: &[f32], _v: &[f32], _w: f32) -> Color3 {
            Color3 { b: 1.0, g: 0.0, r: 0.0 }
        }

        let mut device = Device::setup(width, height, &mut buf);
        device.clear_buffer();
        device.set_shader_sizes(0, 0, 0);
        device.vs = Some(passthrough_vs);
        device.m_project = get_projection_mat(90.0, 1.0, 1.0, 100.0);
        device.m_camera = get_lookat_mat(
            Vec3::new(0.0, 0.0, -3.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        device.m_world = device.m_camera;

        // Draw the farther (red) triangle first ...
        device.fs = Some(solid_red_fs);
        device.vertex = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
        ];
        draw_triangle(&mut device);

        // ... then the nearer (blue) one at the same footprint.
        device.fs = Some(blue_fs);
        device.vertex = [
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ];
        draw_triangle(&mut device);

        let cx = width / 2;
        let cy = height / 2;
        let row = device.height - 1 - cy;
        let idx = (row as usize * device.width as usize + cx as usize) * 4;
        let px = &device.color_buffer()[idx..idx + 4];
        assert_eq!(px, &[255, 0, 0, 255]);
    }

    #[test]
    fn triangle_straddling_left_plane_stays_within_screen_bounds() {
        let width = 32;
        let height = 32;
        let mut buf = vec![0u8; width as usize * height as usize * 4];
        let mut device = Device::setup(width, height, &mut buf);
        device.clear_buffer();
        device.set_shader_sizes(0, 0, 0);
        device.vs = Some(passthrough_vs);
        device.fs = Some(solid_red_fs);
        device.m_project = get_projection_mat(90.0, 1.0, 0.1, 100.0);
        device.m_camera = crate::math::Mat4::identity();
        device.m_world = crate::math::Mat4::identity();

        // Triangle mostly to the left of the camera, straddling x = -w.
        device.vertex = [
            Vec3::new(-5.0, -0.5, -2.0),
            Vec3::new(-0.5, -0.5, -2.0),
            Vec3::new(-0.5, 0.5, -2.0),
        ];
        draw_triangle(&mut device);

        assert!(device.color_buffer().chunks_exact(4).any(|px| px == [0, 0, 255, 255]));
    }
}
