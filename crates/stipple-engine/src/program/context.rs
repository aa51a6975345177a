use crate::bindings::{AttributeBinding, CameraBinding, TextureBinding, UniformBinding};
use crate::coords::{ColorRgba, Stage};
use crate::device::{Device, ProgramError, ProgramId};
use crate::host::{Host, ResizeSignal, ResizeSubscription};
use crate::image::{FileImageLoader, ImageLoader};
use crate::math::Mat4;

use super::{AttributeDecl, ProgramConfig, Scene, TextureDecl, UniformDecl};

/// Sizes applied by a resize, reported to the application.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResizeEvent {
    pub logical_width: f32,
    pub logical_height: f32,
    pub device_pixel_ratio: f32,
    /// The resulting stage, in device pixels.
    pub stage: Stage,
}

/// Owns a device and the program linked on it.
///
/// Activation configures the device and links the program. If linking fails
/// the diagnostic is logged and kept in [`ProgramContext::error`]; the
/// context then never attaches bindings, never resizes and never draws.
pub struct ProgramContext<D: Device> {
    device: D,
    program: Option<ProgramId>,
    error: Option<ProgramError>,
    loader: Box<dyn ImageLoader>,
    subscription: Option<ResizeSubscription>,
    stage: Stage,
    activation_resize: Option<ResizeEvent>,

    uniforms: Vec<UniformBinding>,
    attributes: Vec<AttributeBinding>,
    textures: Vec<TextureBinding>,
    camera: Option<CameraBinding>,
}

impl<D: Device> ProgramContext<D> {
    pub fn activate(
        mut device: D,
        config: &ProgramConfig,
        host: &dyn Host,
        signal: &ResizeSignal,
    ) -> Self {
        device.configure(&config.render_state());

        let (program, error) =
            match device.create_program(&config.vertex_source, &config.fragment_source) {
                Ok(program) => {
                    device.use_program(program);
                    (Some(program), None)
                }
                Err(err) => {
                    log::error!("{err}");
                    (None, Some(err))
                }
            };

        let mut ctx = Self {
            device,
            program,
            error,
            loader: Box::new(FileImageLoader::new()),
            subscription: None,
            stage: Stage::default(),
            activation_resize: None,
            uniforms: Vec::new(),
            attributes: Vec::new(),
            textures: Vec::new(),
            camera: None,
        };

        if ctx.program.is_some() {
            ctx.activation_resize = Some(ctx.resize(host));
            ctx.subscription = Some(signal.subscribe());
        }
        ctx
    }

    /// Replaces the loader used by textures attached from now on.
    pub fn with_image_loader(mut self, loader: impl ImageLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Applies a pending resize, if any.
    ///
    /// The first call after activation reports the activation resize, or the
    /// newer one if the host was resized since.
    pub fn poll_resize(&mut self, host: &dyn Host) -> Option<ResizeEvent> {
        let activation = self.activation_resize.take();
        let signalled = self.subscription.as_ref().is_some_and(ResizeSubscription::take);

        // A resize signalled before the first poll supersedes the activation size.
        if signalled {
            return Some(self.resize(host));
        }
        activation
    }

    /// Reconciles `scene` and draws it. Returns whether a draw was issued.
    pub fn render(&mut self, scene: &Scene) -> bool {
        let Some(program) = self.program else {
            return false;
        };

        for decl in &scene.uniforms {
            self.sync_uniform(program, decl);
        }
        for decl in &scene.attributes {
            self.sync_attribute(program, decl);
        }
        for (unit, decl) in scene.textures.iter().enumerate() {
            self.sync_texture(unit as u32, decl);
        }
        if let Some(params) = &scene.camera {
            let camera = self
                .camera
                .get_or_insert_with(|| CameraBinding::attach(&mut self.device, program));
            camera.update(&mut self.device, self.stage, params);
        }
        for texture in &mut self.textures {
            texture.poll(&mut self.device);
        }

        match self.vertex_count() {
            Some(count) if count > 0 => {
                self.device.draw_points(0, count);
                true
            }
            _ => false,
        }
    }

    fn sync_uniform(&mut self, program: ProgramId, decl: &UniformDecl) {
        let index = match self.uniforms.iter().position(|u| u.name() == decl.name) {
            Some(index) => index,
            None => {
                let binding = UniformBinding::attach(&mut self.device, program, &decl.name, decl.kind);
                self.uniforms.push(binding);
                self.uniforms.len() - 1
            }
        };

        let binding = &mut self.uniforms[index];
        if binding.kind() != decl.kind {
            log::debug!(
                "uniform {:?} stays {} (declared {})",
                decl.name,
                binding.kind(),
                decl.kind
            );
        }
        binding.update(&mut self.device, &decl.value);
    }

    fn sync_attribute(&mut self, program: ProgramId, decl: &AttributeDecl) {
        let index = match self.attributes.iter().position(|a| a.name() == decl.name) {
            Some(index) => index,
            None => {
                let binding = AttributeBinding::attach(
                    &mut self.device,
                    program,
                    &decl.name,
                    decl.size,
                    decl.main,
                );
                self.attributes.push(binding);
                self.attributes.len() - 1
            }
        };
        self.attributes[index].update(&mut self.device, &decl.value);
    }

    fn sync_texture(&mut self, unit: u32, decl: &TextureDecl) {
        match self.textures.get(unit as usize) {
            Some(existing) => {
                if existing.source() != decl.source.as_deref() {
                    log::debug!("texture {unit} source is fixed once loaded; ignoring change");
                }
            }
            None => {
                let binding = TextureBinding::attach(
                    &mut self.device,
                    unit,
                    decl.source.as_deref(),
                    self.loader.as_ref(),
                );
                self.textures.push(binding);
            }
        }
    }

    fn resize(&mut self, host: &dyn Host) -> ResizeEvent {
        let (logical_width, logical_height) = host.logical_size();
        let device_pixel_ratio = host.device_pixel_ratio();
        let stage = Stage::from_logical(logical_width, logical_height, device_pixel_ratio);
        let (width, height) = stage.surface_size();

        self.device.resize_surface(width, height);
        self.device.set_viewport(width, height);
        self.device.set_clear_color(ColorRgba::transparent());
        self.stage = stage;

        log::debug!("stage resized to {width}x{height} (dpr {device_pixel_ratio})");
        ResizeEvent {
            logical_width,
            logical_height,
            device_pixel_ratio,
            stage,
        }
    }

    // ── accessors ──────────────────────────────────────────────────────────

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The linked program; `None` after a compile or link failure.
    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }

    pub fn error(&self) -> Option<&ProgramError> {
        self.error.as_ref()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Points drawn per frame, published by the first main attribute.
    ///
    /// `None` until that attribute has uploaded a value.
    pub fn vertex_count(&self) -> Option<u32> {
        self.attributes
            .iter()
            .find(|a| a.is_main())
            .and_then(AttributeBinding::vertex_count)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformBinding> {
        self.uniforms.iter().find(|u| u.name() == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeBinding> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn texture(&self, unit: u32) -> Option<&TextureBinding> {
        self.textures.get(unit as usize)
    }

    pub fn projection(&self) -> Option<&Mat4> {
        self.camera.as_ref().and_then(CameraBinding::matrix)
    }

    /// Whether this context currently listens for resizes.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::bindings::fixtures::{FRAGMENT, VERTEX};
    use crate::bindings::{PROJECTION_UNIFORM, TextureState};
    use crate::camera::CameraParams;
    use crate::device::{Command, HeadlessDevice, ProgramError, UniformKind, UniformValue};
    use crate::host::FixedHost;
    use crate::image::{PendingImage, ImageSender};

    /// A host whose size tests can change between resizes.
    struct MutableHost {
        size: Cell<(f32, f32)>,
        dpr: f32,
    }

    impl Host for MutableHost {
        fn logical_size(&self) -> (f32, f32) {
            self.size.get()
        }

        fn device_pixel_ratio(&self) -> f32 {
            self.dpr
        }
    }

    /// Loads that never finish.
    #[derive(Default)]
    struct StalledLoader {
        senders: std::cell::RefCell<Vec<ImageSender>>,
    }

    impl ImageLoader for StalledLoader {
        fn load(&self, _source: &str) -> PendingImage {
            let (sender, pending) = PendingImage::channel();
            self.senders.borrow_mut().push(sender);
            pending
        }
    }

    const HOST: FixedHost = FixedHost::new(400.0, 300.0, 2.0);

    fn activate() -> (ProgramContext<HeadlessDevice>, ResizeSignal) {
        let signal = ResizeSignal::new();
        let ctx = ProgramContext::activate(
            HeadlessDevice::new(),
            &ProgramConfig::new(VERTEX, FRAGMENT),
            &HOST,
            &signal,
        );
        (ctx, signal)
    }

    fn points(n: usize) -> AttributeDecl {
        AttributeDecl::new("a_position", vec![0.5f32; n * 3]).main()
    }

    // ── Activation ────────────────────────────────────────────────────────

    #[test]
    fn activation_configures_links_and_uses_program() {
        let (ctx, _signal) = activate();
        let device = ctx.device();

        let state = device.render_state().unwrap();
        assert!(state.additive_blend);
        assert!(state.cull_back_faces);
        assert!(!state.depth_test);
        assert_eq!(device.current_program(), ctx.program());
        assert!(ctx.error().is_none());
    }

    #[test]
    fn activation_resizes_once_and_subscribes() {
        let (mut ctx, signal) = activate();

        assert_eq!(ctx.stage(), Stage::new(800.0, 600.0));
        assert_eq!(ctx.device().surface_size(), (800, 600));
        assert_eq!(ctx.device().viewport(), (800, 600));
        assert_eq!(ctx.device().clear_color(), ColorRgba::transparent());
        assert_eq!(signal.listener_count(), 1);

        let event = ctx.poll_resize(&HOST).unwrap();
        assert_eq!((event.logical_width, event.logical_height), (400.0, 300.0));
        assert_eq!(event.device_pixel_ratio, 2.0);
        assert_eq!(ctx.poll_resize(&HOST), None);
    }

    #[test]
    fn depth_test_follows_config() {
        let signal = ResizeSignal::new();
        let config = ProgramConfig::new(VERTEX, FRAGMENT).depth_test(true).antialias(true);
        let ctx = ProgramContext::activate(HeadlessDevice::new(), &config, &HOST, &signal);

        let state = ctx.device().render_state().unwrap();
        assert!(state.depth_test);
        assert!(state.antialias);
    }

    #[test]
    fn compile_failure_disables_the_context() {
        let signal = ResizeSignal::new();
        let config = ProgramConfig::new("this is not wgsl {", FRAGMENT);
        let mut ctx = ProgramContext::activate(HeadlessDevice::new(), &config, &HOST, &signal);

        assert_eq!(ctx.program(), None);
        assert!(matches!(ctx.error(), Some(ProgramError::Compile { .. })));
        assert!(!ctx.is_subscribed());
        assert_eq!(signal.listener_count(), 0);

        signal.emit();
        assert_eq!(ctx.poll_resize(&HOST), None);
        assert!(!ctx.render(&Scene::new().attribute(points(10))));
        assert!(ctx.device().draws().is_empty());
        assert_eq!(ctx.device().count(|c| matches!(c, Command::CreateBuffer(_))), 0);
    }

    // ── Drawing ───────────────────────────────────────────────────────────

    #[test]
    fn no_vertex_count_means_no_draws() {
        let (mut ctx, _signal) = activate();
        let scene = Scene::new().uniform(UniformDecl::new("u_time", UniformKind::Float, 1.0f32));

        for _ in 0..10 {
            assert!(!ctx.render(&scene));
        }
        assert_eq!(ctx.vertex_count(), None);
        assert!(ctx.device().draws().is_empty());
    }

    #[test]
    fn empty_main_attribute_draws_nothing() {
        let (mut ctx, _signal) = activate();
        let scene = Scene::new().attribute(points(0));

        for _ in 0..3 {
            assert!(!ctx.render(&scene));
        }
        assert_eq!(ctx.vertex_count(), Some(0));
        assert!(ctx.device().draws().is_empty());
    }

    #[test]
    fn main_attribute_drives_the_draw_range() {
        let (mut ctx, _signal) = activate();

        assert!(ctx.render(&Scene::new().attribute(points(100))));
        assert_eq!(ctx.vertex_count(), Some(100));

        let draws = ctx.device().draws();
        assert_eq!(draws.len(), 1);
        assert_eq!((draws[0].first, draws[0].count), (0, 100));
        assert_eq!(draws[0].program, ctx.program());
    }

    #[test]
    fn one_draw_per_render() {
        let (mut ctx, _signal) = activate();
        let scene = Scene::new().attribute(points(4));

        for _ in 0..5 {
            ctx.render(&scene);
        }
        assert_eq!(ctx.device().draws().len(), 5);
        assert_eq!(ctx.device().count(|c| matches!(c, Command::BufferData { .. })), 1);
    }

    // ── Reconciliation ────────────────────────────────────────────────────

    #[test]
    fn bindings_attach_once_across_frames() {
        let (mut ctx, _signal) = activate();

        for frame in 0..4 {
            let scene = Scene::new()
                .uniform(UniformDecl::new("u_time", UniformKind::Float, frame as f32))
                .attribute(points(2))
                .attribute(AttributeDecl::new("a_color", vec![1.0f32; 8]).with_size(4));
            ctx.render(&scene);
        }

        let device = ctx.device();
        assert_eq!(device.count(|c| matches!(c, Command::ResolveUniform { .. })), 1);
        assert_eq!(device.count(|c| matches!(c, Command::ResolveAttribute { .. })), 2);
        assert_eq!(device.count(|c| matches!(c, Command::CreateBuffer(_))), 2);
        let program = ctx.program().unwrap();
        assert_eq!(device.uniform(program, "u_time"), Some(&UniformValue::Float(3.0)));
    }

    #[test]
    fn camera_uploads_projection_for_current_stage() {
        let (mut ctx, _signal) = activate();
        let scene = Scene::new().camera(CameraParams::orthographic());

        ctx.render(&scene);
        let program = ctx.program().unwrap();
        let Some(UniformValue::Mat4(m)) = ctx.device().uniform(program, PROJECTION_UNIFORM) else {
            panic!("projection not uploaded");
        };
        assert_eq!(m[0], 2.0 / 800.0);
        assert_eq!(ctx.projection(), Some(m));
    }

    #[test]
    fn textures_show_placeholder_until_loaded() {
        let (ctx, _signal) = activate();
        let mut ctx = ctx.with_image_loader(StalledLoader::default());
        let scene = Scene::new()
            .attribute(points(1))
            .texture(TextureDecl::new("sprite.png"));

        ctx.render(&scene);
        ctx.render(&scene);

        let binding = ctx.texture(0).unwrap();
        assert_eq!(binding.state(), TextureState::Loading);
        let texture = ctx.device().texture(binding.texture()).unwrap();
        assert!(texture.image.as_ref().unwrap().is_fully_transparent());
        assert_eq!(ctx.device().texture_count(), 1);
        assert_eq!(ctx.device().draws().len(), 2);
    }

    // ── Resizing ──────────────────────────────────────────────────────────

    #[test]
    fn resize_follows_the_signal() {
        let signal = ResizeSignal::new();
        let host = MutableHost {
            size: Cell::new((400.0, 300.0)),
            dpr: 1.5,
        };
        let mut ctx = ProgramContext::activate(
            HeadlessDevice::new(),
            &ProgramConfig::new(VERTEX, FRAGMENT),
            &host,
            &signal,
        );
        ctx.poll_resize(&host);

        host.size.set((200.0, 100.0));
        assert_eq!(ctx.poll_resize(&host), None);

        signal.emit();
        let event = ctx.poll_resize(&host).unwrap();
        assert_eq!(event.stage, Stage::new(300.0, 150.0));
        assert_eq!(ctx.device().surface_size(), (300, 150));
    }

    #[test]
    fn resize_before_first_poll_is_applied() {
        let signal = ResizeSignal::new();
        let host = MutableHost {
            size: Cell::new((400.0, 300.0)),
            dpr: 1.0,
        };
        let mut ctx = ProgramContext::activate(
            HeadlessDevice::new(),
            &ProgramConfig::new(VERTEX, FRAGMENT),
            &host,
            &signal,
        );

        host.size.set((200.0, 100.0));
        signal.emit();

        let event = ctx.poll_resize(&host).unwrap();
        assert_eq!((event.logical_width, event.logical_height), (200.0, 100.0));
        assert_eq!(event.stage, Stage::new(200.0, 100.0));
        assert_eq!(ctx.stage(), Stage::new(200.0, 100.0));
        assert_eq!(ctx.device().surface_size(), (200, 100));
        assert_eq!(ctx.poll_resize(&host), None);
    }

    #[test]
    fn repeated_resize_is_idempotent() {
        let (mut ctx, signal) = activate();
        ctx.poll_resize(&HOST);
        let program = ctx.program();

        signal.emit();
        let first = ctx.poll_resize(&HOST).unwrap();
        signal.emit();
        let second = ctx.poll_resize(&HOST).unwrap();

        assert_eq!(first, second);
        assert_eq!(ctx.stage(), first.stage);
        assert_eq!(ctx.program(), program);
        assert_eq!(ctx.device().program_count(), 1);
    }

    #[test]
    fn dropping_the_context_deregisters_its_listener() {
        let (ctx, signal) = activate();
        assert_eq!(signal.listener_count(), 1);
        drop(ctx);
        assert_eq!(signal.listener_count(), 0);
    }
}
