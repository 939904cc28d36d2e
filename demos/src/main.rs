//! Demo host: owns the window, loads a mesh, wires up the directional-light
//! shader pair and drives the device once per repaint tick. Everything in
//! this binary is an external collaborator per spec §1 — the window, the
//! OBJ load path, the scene setup — implemented only far enough to exercise
//! the `renderer` library honestly.

mod scene_setup;
mod shaders;

use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use minifb::{Key, Window, WindowOptions};

use renderer::{draw_scene, load_mesh, Device, Object3D, Scene, Vec3};

#[derive(Parser, Debug)]
#[command(about = "Software 3D rasterizer demo")]
struct Args {
    #[arg(long, default_value_t = 800)]
    width: u32,
    #[arg(long, default_value_t = 600)]
    height: u32,
    #[arg(long, default_value_t = 60.0)]
    fov: f32,
    #[arg(long, default_value_t = 0.1)]
    near: f32,
    #[arg(long, default_value_t = 100.0)]
    far: f32,
    #[arg(long)]
    model: Option<PathBuf>,
    #[arg(long, default_value = "0,0,6")]
    eye: String,
    #[arg(long, default_value = "0,0,0")]
    target: String,
    #[arg(long, default_value = "0,1,0")]
    up: String,
}

fn parse_vec3(s: &str, default: Vec3) -> Vec3 {
    let parts: Vec<f32> = s.split(',').filter_map(|p| p.trim().parse().ok()).collect();
    match parts.as_slice() {
        [x, y, z] => Vec3::new(*x, *y, *z),
        _ => {
            log::warn!("could not parse \"{s}\" as x,y,z; using default {default:?}");
            default
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mesh = args
        .model
        .as_ref()
        .and_then(|path| match load_mesh(path) {
            Ok(mesh) => Some(mesh),
            Err(err) => {
                log::warn!("failed to load {}: {err}; using built-in cube", path.display());
                None
            }
        })
        .unwrap_or_else(scene_setup::default_cube);

    let mut scene = Scene::new();
    scene.objects.push(Object3D::new(Rc::new(mesh)));

    let eye = parse_vec3(&args.eye, Vec3::new(0.0, 0.0, 6.0));
    let target = parse_vec3(&args.target, Vec3::zeros());
    let up = parse_vec3(&args.up, Vec3::new(0.0, 1.0, 0.0));

    let mut color_buffer = vec![0u8; args.width as usize * args.height as usize * 4];
    let mut window = Window::new(
        "Software Rasterizer",
        args.width as usize,
        args.height as usize,
        WindowOptions::default(),
    )
    .unwrap_or_else(|e| panic!("failed to open window: {e}"));
    window.set_target_fps(60);

    let mut present_buffer: Vec<u32> = vec![0; args.width as usize * args.height as usize];
    let mut angle = 0.0f32;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let mut device = Device::setup(args.width, args.height, &mut color_buffer);
        device.clear_buffer();
        device.set_shader_sizes(shaders::UNIF_SIZE, shaders::ATTR_SIZE, shaders::VARY_SIZE);
        device.drawer = Some(shaders::drawer);
        device.vs = Some(shaders::vertex_shader);
        device.fs = Some(shaders::fragment_shader);
        device.m_project = renderer::math::get_projection_mat(
            args.fov,
            args.width as f32 / args.height as f32,
            args.near,
            args.far,
        );
        device.m_camera = renderer::math::get_lookat_mat(eye, target, up);

        angle += 0.01;
        scene.objects[0].rotation = renderer::math::quat_from_axis_angle(Vec3::new(0.0, 1.0, 0.0), angle);
        scene.objects[0].update_m_world();

        draw_scene(&mut device, &scene);
        log::debug!(
            "frame: {} triangles, {} texels",
            device.triangle_count,
            device.texel_count
        );

        for (i, px) in color_buffer.chunks_exact(4).enumerate() {
            let (b, g, r) = (px[0] as u32, px[1] as u32, px[2] as u32);
            present_buffer[i] = (r << 16) | (g << 8) | b;
        }

        window
            .update_with_buffer(&present_buffer, args.width as usize, args.height as usize)
            .unwrap();
    }
}
