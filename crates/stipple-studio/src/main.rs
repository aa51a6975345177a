//! Stipple studio: a rotating sphere of points.
//!
//! Usage: `stipple-studio [sprite.png]`. The optional image tints every point
//! with the color at its center once it has loaded.

use std::f32::consts::PI;
use std::rc::Rc;

use stipple_engine::camera::CameraParams;
use stipple_engine::core::{App, AppControl, FrameCtx};
use stipple_engine::device::UniformKind;
use stipple_engine::logging::{LoggingConfig, init_logging};
use stipple_engine::program::{
    AttributeDecl, ProgramConfig, ResizeEvent, Scene, TextureDecl, UniformDecl,
};
use stipple_engine::window::{Runtime, RuntimeConfig};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{Key, NamedKey};

const POINT_COUNT: usize = 4000;
const RADIUS: f32 = 40.0;

const VERTEX_SHADER: &str = include_str!("../shaders/points.vert.wgsl");
const FRAGMENT_SHADER: &str = include_str!("../shaders/points.frag.wgsl");

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let sprite = std::env::args().nth(1);
    let scene = build_scene(sprite.as_deref());

    let runtime = RuntimeConfig::default()
        .with_title("Stipple Studio")
        .with_size(960.0, 720.0);
    let program = ProgramConfig::new(VERTEX_SHADER, FRAGMENT_SHADER)
        .antialias(true)
        .depth_test(false);

    Runtime::run(runtime, program, Studio { scene: Some(scene) })
}

struct Studio {
    /// Handed to the runtime's scene on the first frame.
    scene: Option<Scene>,
}

impl App for Studio {
    fn on_resize(&mut self, event: &ResizeEvent) {
        log::info!(
            "stage {}x{} (logical {}x{} @ {}x)",
            event.stage.width,
            event.stage.height,
            event.logical_width,
            event.logical_height,
            event.device_pixel_ratio,
        );
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => AppControl::Exit,
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        if let Some(scene) = self.scene.take() {
            *ctx.scene = scene;
        }

        ctx.scene.set_uniform("u_time", ctx.time.elapsed as f32);

        // Slow vertical bob so the camera binding sees changes too.
        let height = (ctx.time.elapsed as f32 * PI).sin() * 30.0;
        if let Some(camera) = ctx.scene.camera.as_mut() {
            camera.position[1] = height;
        }

        if ctx.time.frame_index % 600 == 0 {
            log::debug!("frame {} at {:.2} ms", ctx.time.frame_index, ctx.time.delta);
        }
        AppControl::Continue
    }
}

fn build_scene(sprite: Option<&str>) -> Scene {
    let (positions, colors) = fibonacci_sphere(POINT_COUNT, RADIUS);

    let texture = match sprite {
        Some(path) => TextureDecl::new(path),
        None => TextureDecl::empty(),
    };

    Scene::new()
        .uniform(UniformDecl::new("u_time", UniformKind::Float, 0.0f32))
        .uniform(UniformDecl::new("u_spin", UniformKind::Float, 1.0f32))
        .attribute(AttributeDecl::new("a_position", positions).main())
        .attribute(AttributeDecl::new("a_color", colors).with_size(4))
        .texture(texture)
        .camera(CameraParams::default().with_fov(45.0).at(0.0, 0.0, 140.0))
}

/// Evenly spread points on a sphere, colored by latitude.
fn fibonacci_sphere(count: usize, radius: f32) -> (Rc<[f32]>, Rc<[f32]>) {
    let golden = PI * (3.0 - 5.0f32.sqrt());
    let mut positions = Vec::with_capacity(count * 3);
    let mut colors = Vec::with_capacity(count * 4);

    for i in 0..count {
        let y = 1.0 - (i as f32 + 0.5) / count as f32 * 2.0;
        let ring = (1.0 - y * y).sqrt();
        let theta = golden * i as f32;

        positions.extend_from_slice(&[
            theta.cos() * ring * radius,
            y * radius,
            theta.sin() * ring * radius,
        ]);

        let t = (y + 1.0) * 0.5;
        colors.extend_from_slice(&[0.2 + 0.8 * t, 0.4, 1.0 - 0.7 * t, 1.0]);
    }

    (positions.into(), colors.into())
}
