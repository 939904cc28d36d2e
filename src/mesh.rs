//! Indexed triangle mesh model and the OBJ loader.
//!
//! Mirrors `original_source/src/qmesh.c`: a two-pass OBJ reader (count, then
//! fill), 1-based indices kept exactly as read, and a `mesh_type` bitmask
//! recording whether texcoords/normals are present.

use std::fs;
use std::path::Path;

use crate::error::RenderError;
use crate::math::{Aabb, Vec2, Vec3};

bitflags::bitflags! {
    /// Which optional per-corner attributes this mesh carries.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct MeshType: u8 {
        const TEXCOORD = 0b01;
        const NORMAL   = 0b10;
    }
}

/// Indexed triangle soup: positions/normals/texcoords plus three parallel,
/// corner-major (`3 * n_faces` long), 1-based index lists.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,

    pub vertex_idx: Vec<u32>,
    pub normal_idx: Vec<u32>,
    pub texcoord_idx: Vec<u32>,

    pub n_faces: u32,
    pub mesh_type: MeshType,
}

impl Mesh {
    pub fn new() -> Mesh {
        Mesh::default()
    }

    /// Position of corner `k` (`k` in `[0, 3 * n_faces)`), resolving the
    /// 1-based index stored in `vertex_idx`.
    pub fn corner_position(&self, k: usize) -> Vec3 {
        self.vertices[self.vertex_idx[k] as usize - 1]
    }

    /// Normal of corner `k`, valid only when `mesh_type` has `NORMAL` set.
    pub fn corner_normal(&self, k: usize) -> Vec3 {
        self.normals[self.normal_idx[k] as usize - 1]
    }

    /// Texcoord of corner `k`, valid only when `mesh_type` has `TEXCOORD` set.
    pub fn corner_texcoord(&self, k: usize) -> Vec2 {
        self.texcoords[self.texcoord_idx[k] as usize - 1]
    }

    /// Midpoint of the position AABB.
    pub fn mesh_center(&self) -> Vec3 {
        self.aabb().map_or(Vec3::zeros(), |b| 0.5 * (b.lo + b.hi))
    }

    pub fn aabb(&self) -> Option<Aabb> {
        if self.vertices.is_empty() {
            return None;
        }
        let mut lo = Vec3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut hi = Vec3::new(f32::MIN, f32::MIN, f32::MIN);
        for v in &self.vertices {
            lo = lo.zip_map(v, f32::min);
            hi = hi.zip_map(v, f32::max);
        }
        Some(Aabb { lo, hi })
    }
}

/// Dispatches on file extension; `.obj` is the only supported format.
pub fn load_mesh(path: &Path) -> Result<Mesh, RenderError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("obj") => load_obj(path),
        other => Err(RenderError::UnsupportedExtension(
            other.unwrap_or("").to_string(),
        )),
    }
}

fn load_obj(path: &Path) -> Result<Mesh, RenderError> {
    let text = fs::read_to_string(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // Pass one: count lines, establish mesh_type.
    let mut n_vertices = 0usize;
    let mut n_normals = 0usize;
    let mut n_texcoords = 0usize;
    let mut n_faces = 0usize;
    for line in text.lines() {
        match line.split_whitespace().next() {
            Some("v") => n_vertices += 1,
            Some("vn") => n_normals += 1,
            Some("vt") => n_texcoords += 1,
            Some("f") => n_faces += 1,
            _ => {}
        }
    }

    let mut mesh_type = MeshType::empty();
    if n_texcoords > 0 {
        mesh_type |= MeshType::TEXCOORD;
    }
    if n_normals > 0 {
        mesh_type |= MeshType::NORMAL;
    }

    let mut mesh = Mesh {
        vertices: Vec::with_capacity(n_vertices),
        normals: Vec::with_capacity(n_normals),
        texcoords: Vec::with_capacity(n_texcoords),
        vertex_idx: Vec::with_capacity(n_faces * 3),
        normal_idx: Vec::with_capacity(n_faces * 3),
        texcoord_idx: Vec::with_capacity(n_faces * 3),
        n_faces: n_faces as u32,
        mesh_type,
    };

    // Pass two: fill.
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let v = parse_floats::<3>(&mut tokens, line)?;
                mesh.vertices.push(Vec3::new(v[0], v[1], v[2]));
            }
            Some("vn") => {
                let v = parse_floats::<3>(&mut tokens, line)?;
                mesh.normals.push(Vec3::new(v[0], v[1], v[2]));
            }
            Some("vt") => {
                let v = parse_floats::<2>(&mut tokens, line)?;
                mesh.texcoords.push(Vec2::new(v[0], v[1]));
            }
            Some("f") => {
                for _ in 0..3 {
                    let corner = tokens
                        .next()
                        .ok_or_else(|| RenderError::MalformedFace(line.to_string()))?;
                    let mut parts = corner.split('/');
                    let vi: u32 = parts
                        .next()
                        .and_then(|s| s.parse().ok())
                        .ok_or_else(|| RenderError::MalformedFace(line.to_string()))?;
                    mesh.vertex_idx.push(vi);

                    let vt = parts.next().filter(|s| !s.is_empty());
                    let vn = parts.next().filter(|s| !s.is_empty());

                    if mesh.mesh_type.contains(MeshType::TEXCOORD) {
                        let ti: u32 = vt
                            .and_then(|s| s.parse().ok())
                            .ok_or_else(|| RenderError::MalformedFace(line.to_string()))?;
                        mesh.texcoord_idx.push(ti);
                    }
                    if mesh.mesh_type.contains(MeshType::NORMAL) {
                        let ni: u32 = vn
                            .and_then(|s| s.parse().ok())
                            .ok_or_else(|| RenderError::MalformedFace(line.to_string()))?;
                        mesh.normal_idx.push(ni);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(mesh)
}

fn parse_floats<const N: usize>(
    tokens: &mut std::str::SplitWhitespace,
    line: &str,
) -> Result<[f32; N], RenderError> {
    let mut out = [0.0f32; N];
    for slot in out.iter_mut() {
        *slot = tokens
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| RenderError::MalformedFace(line.to_string()))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_cube_obj() -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        writeln!(
            f,
            "v -1 -1 -1\nv -1 -1 1\nv -1 1 -1\nv -1 1 1\nv 1 -1 -1\nv 1 -1 1\nv 1 1 -1\nv 1 1 1\n\
             vn 0 0 1\nvn 0 0 -1\nvn 0 1 0\nvn 0 -1 0\nvn 1 0 0\nvn -1 0 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             f 1/1/1 2/2/1 4/3/1\n\
             f 1/1/1 4/3/1 3/4/1\n\
             f 5/1/2 7/2/2 8/3/2\n\
             f 5/1/2 8/3/2 6/4/2\n\
             f 3/1/3 4/2/3 8/3/3\n\
             f 3/1/3 8/3/3 7/4/3\n\
             f 1/1/4 5/2/4 6/3/4\n\
             f 1/1/4 6/3/4 2/4/4\n\
             f 2/1/5 6/2/5 8/3/5\n\
             f 2/1/5 8/3/5 4/4/5\n\
             f 1/1/6 3/2/6 7/3/6\n\
             f 1/1/6 7/3/6 5/4/6\n"
        )
        .unwrap();
        f
    }

    #[test]
    fn loads_cube_with_expected_shape() {
        let f = write_cube_obj();
        let mesh = load_mesh(f.path()).unwrap();

        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.n_faces, 12);
        assert!(mesh.mesh_type.contains(MeshType::TEXCOORD));
        assert!(mesh.mesh_type.contains(MeshType::NORMAL));
        assert!(mesh.vertex_idx.iter().all(|&i| (1..=8).contains(&i)));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = load_mesh(Path::new("model.fbx")).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedExtension(_)));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_mesh(Path::new("does/not/exist.obj")).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }

    #[test]
    fn mesh_center_is_aabb_midpoint() {
        let f = write_cube_obj();
        let mesh = load_mesh(f.path()).unwrap();
        let center = mesh.mesh_center();
        assert!(center.x.abs() < 1e-6 && center.y.abs() < 1e-6 && center.z.abs() < 1e-6);
    }
}
