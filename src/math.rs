//! Vector, matrix and quaternion primitives used throughout the pipeline.
//!
//! `Vec2`/`Vec3`/`Vec4`/`Mat4` are thin aliases over `nalgebra` types; `Quat`
//! and `AABB` are local structs because their exact formulas are part of the
//! contract and must not depend on `nalgebra`'s own conventions.

use na::{Matrix4, Vector2, Vector3, Vector4};

pub type Vec2 = Vector2<f32>;
pub type Vec3 = Vector3<f32>;
pub type Vec4 = Vector4<f32>;
pub type Mat4 = Matrix4<f32>;

/// Unit quaternion `(w, x, y, z)` used for object rotations.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Quat {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat { w: 1.0, x: 0.0, y: 0.0, z: 0.0 };
}

/// Axis-aligned bounding box as two opposite corners.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub lo: Vec3,
    pub hi: Vec3,
}

/// Clamp `x` into `[a, b]`.
pub fn clip_float(x: f32, a: f32, b: f32) -> f32 {
    if x > b {
        b
    } else if x < a {
        a
    } else {
        x
    }
}

/// Linear interpolation: `(1 - t) * a + t * b`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + t * b
}

pub fn vec3_clip(v: Vec3, a: f32, b: f32) -> Vec3 {
    Vec3::new(clip_float(v.x, a, b), clip_float(v.y, a, b), clip_float(v.z, a, b))
}

/// Perspective divide: divide all components of a homogeneous point by `w`.
pub fn vec4_normalize(v: Vec4) -> Vec4 {
    v / v.w
}

pub fn vec4_from_vec3(v: Vec3) -> Vec4 {
    Vec4::new(v.x, v.y, v.z, 1.0)
}

/// Symmetric right-handed perspective projection.
///
/// `fov` is the full vertical field of view in degrees. Maps a camera-space
/// point with `z < 0` (in front of the camera) to a homogeneous point with
/// `w = -z_camera > 0`.
pub fn get_projection_mat(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let t = (fov_deg * std::f32::consts::PI / 360.0).tan();
    let mut m = Mat4::zeros();
    m[(0, 0)] = 1.0 / (t * aspect);
    m[(1, 1)] = 1.0 / t;
    m[(2, 2)] = -(far + near) / (far - near);
    m[(2, 3)] = -2.0 * far * near / (far - near);
    m[(3, 2)] = -1.0;
    m
}

/// View matrix looking from `eye` toward `center`, with `up` establishing
/// the camera's vertical axis.
pub fn get_lookat_mat(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
    let up = up.normalize();
    let forward = (center - eye).normalize();
    let u = forward.cross(&up).normalize();
    let v = u.cross(&forward).normalize();
    let w = -forward;

    let mut m = Mat4::identity();
    m[(0, 0)] = u.x;
    m[(0, 1)] = u.y;
    m[(0, 2)] = u.z;
    m[(0, 3)] = -eye.dot(&u);
    m[(1, 0)] = v.x;
    m[(1, 1)] = v.y;
    m[(1, 2)] = v.z;
    m[(1, 3)] = -eye.dot(&v);
    m[(2, 0)] = w.x;
    m[(2, 1)] = w.y;
    m[(2, 2)] = w.z;
    m[(2, 3)] = -eye.dot(&w);
    m
}

/// World matrix from translation, rotation (quaternion) and scale: `T * R * S`.
pub fn get_world_mat(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    let mut t = Mat4::identity();
    t[(0, 3)] = translation.x;
    t[(1, 3)] = translation.y;
    t[(2, 3)] = translation.z;

    let r = mat4_from_quat(rotation);

    let mut s = Mat4::identity();
    s[(0, 0)] = scale.x;
    s[(1, 1)] = scale.y;
    s[(2, 2)] = scale.z;

    t * r * s
}

/// Rotation matrix for a unit quaternion, standard unit-quaternion formula.
pub fn mat4_from_quat(q: Quat) -> Mat4 {
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);
    let (x2, y2, z2) = (x * x, y * y, z * z);

    let mut m = Mat4::zeros();
    m[(0, 0)] = 1.0 - 2.0 * y2 - 2.0 * z2;
    m[(0, 1)] = 2.0 * x * y - 2.0 * z * w;
    m[(0, 2)] = 2.0 * x * z + 2.0 * y * w;

    m[(1, 0)] = 2.0 * x * y + 2.0 * z * w;
    m[(1, 1)] = 1.0 - 2.0 * x2 - 2.0 * z2;
    m[(1, 2)] = 2.0 * y * z - 2.0 * x * w;

    m[(2, 0)] = 2.0 * x * z - 2.0 * y * w;
    m[(2, 1)] = 2.0 * y * z + 2.0 * x * w;
    m[(2, 2)] = 1.0 - 2.0 * x2 - 2.0 * y2;

    m[(3, 3)] = 1.0;
    m
}

/// Axis-angle to quaternion: `u` must be a unit vector.
pub fn quat_from_axis_angle(u: Vec3, theta: f32) -> Quat {
    let half = 0.5 * theta;
    let (s, c) = half.sin_cos();
    Quat { w: c, x: s * u.x, y: s * u.y, z: s * u.z }
}

/// Determinant of the 3x3 minor obtained by deleting row `r` and column `c`.
fn calc_det3(m: &Mat4, r: usize, c: usize) -> f32 {
    let mut n = [[0.0f32; 3]; 3];
    for i in 0..4 {
        if i == r {
            continue;
        }
        let nr = if i < r { i } else { i - 1 };
        for j in 0..4 {
            if j == c {
                continue;
            }
            let nc = if j < c { j } else { j - 1 };
            n[nr][nc] = m[(i, j)];
        }
    }
    n[0][0] * n[1][1] * n[2][2] + n[0][1] * n[1][2] * n[2][0] + n[0][2] * n[1][0] * n[2][1]
        - n[2][0] * n[1][1] * n[0][2]
        - n[2][1] * n[1][2] * n[0][0]
        - n[2][2] * n[1][0] * n[0][1]
}

/// Writes the adjugate (classical adjoint) of `m` into `out`, returns `det(m)`.
fn calc_adjugate_mat(m: &Mat4, out: &mut Mat4) -> f32 {
    for i in 0..4 {
        let mut sign = if i & 1 == 1 { -1.0 } else { 1.0 };
        for j in 0..4 {
            out[(j, i)] = sign * calc_det3(m, i, j);
            sign = -sign;
        }
    }
    let mut det = 0.0;
    for i in 0..4 {
        det += out[(i, 0)] * m[(0, i)];
    }
    det
}

/// Inverse of `m` via cofactor/adjugate expansion, `A' = A* / det(A)`.
pub fn calc_inv_mat(m: &Mat4) -> Mat4 {
    let mut out = Mat4::zeros();
    let det = calc_adjugate_mat(m, &mut out);
    out * (1.0 / det)
}
