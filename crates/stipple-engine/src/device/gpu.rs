use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::ColorRgba;
use crate::image::ImageData;

use super::program::{FALLBACK_VERTEX_BYTES, GpuProgram, PipelineKey, VertexInput};
use super::surface::{
    FrameTargets, apply_resize, choose_alpha_mode, choose_surface_format, map_surface_error,
};
use super::{
    AttribIndex, BufferId, Device, Filter, ProgramError, ProgramId, RenderState, Sampling,
    SurfaceErrorAction, TextureId, UniformLocation, UniformValue, Wrap,
};

const MSAA_SAMPLES: u32 = 4;

/// Initialization parameters for the GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO is broadly supported and paces frames to the display refresh.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface. A hint only.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

#[derive(Default)]
struct VertexBuffer {
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
    /// Bytes currently holding data.
    len: u64,
}

struct GpuTexture {
    unit: u32,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

/// Stand-ins for resources a program declares but nothing has bound yet.
struct Fallbacks {
    vertex: wgpu::Buffer,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

/// [`Device`] backed by wgpu and a window surface.
///
/// Commands that only change state are recorded immediately. Each
/// `draw_points` call renders and presents one frame: the pass clears to the
/// current clear color, applies the viewport and draws with the current
/// program.
pub struct WgpuDevice<'w> {
    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; the owner must ensure the
    /// window outlives the device.
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    msaa_supported: bool,

    state: RenderState,
    targets: FrameTargets,
    programs: Vec<GpuProgram>,
    current: Option<ProgramId>,
    buffers: Vec<VertexBuffer>,
    /// Vertex input location → (buffer, floats per vertex).
    attributes: BTreeMap<u32, (BufferId, u32)>,
    textures: Vec<GpuTexture>,
    fallbacks: Fallbacks,

    viewport: (u32, u32),
    clear_color: ColorRgba,
    lost: bool,
}

impl<'w> WgpuDevice<'w> {
    /// Creates a device bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Surface lifetime is tied to `window` via `'w`.
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("stipple device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        // Validation errors surface through the log instead of aborting.
        device.on_uncaptured_error(Arc::new(|err: wgpu::Error| {
            log::error!("wgpu: {err}");
        }));

        let caps = surface.get_capabilities(&adapter);
        let format =
            choose_surface_format(&caps, init.prefer_srgb).context("no supported surface formats")?;
        let msaa_supported = adapter
            .get_texture_format_features(format)
            .flags
            .sample_count_supported(MSAA_SAMPLES);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode: choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        let fallbacks = Fallbacks {
            vertex: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("stipple fallback vertex"),
                contents: &[0u8; FALLBACK_VERTEX_BYTES as usize],
                usage: wgpu::BufferUsages::VERTEX,
            }),
            view: upload_texture(&device, &queue, &ImageData::transparent_pixel()),
            sampler: create_sampler(&device, Sampling::default()),
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            msaa_supported,
            state: RenderState::default(),
            targets: FrameTargets::default(),
            programs: Vec::new(),
            current: None,
            buffers: Vec::new(),
            attributes: BTreeMap::new(),
            textures: Vec::new(),
            fallbacks,
            viewport: (size.width, size.height),
            clear_color: ColorRgba::transparent(),
            lost: false,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// True once a surface error left the device unusable.
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    fn sample_count(&self) -> u32 {
        if self.state.antialias && self.msaa_supported {
            MSAA_SAMPLES
        } else {
            1
        }
    }

    fn invalidate_bind_groups(&mut self) {
        for program in &mut self.programs {
            program.invalidate_bind_groups();
        }
    }

    fn handle_surface_error(&mut self, err: wgpu::SurfaceError) {
        let action = map_surface_error(&self.surface, &self.device, &self.config, self.size, &err);
        match action {
            SurfaceErrorAction::Fatal => {
                log::error!("surface error is fatal: {err}");
                self.lost = true;
            }
            SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                log::debug!("skipping frame after surface error: {err}");
            }
        }
    }
}

impl Device for WgpuDevice<'_> {
    fn configure(&mut self, state: &RenderState) {
        if state.antialias && !self.msaa_supported {
            log::warn!("{MSAA_SAMPLES}x multisampling unsupported for {:?}", self.config.format);
        }
        self.state = *state;
    }

    fn create_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, ProgramError> {
        let program = GpuProgram::compile(&self.device, vertex, fragment)?;
        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(program);
        Ok(id)
    }

    fn use_program(&mut self, program: ProgramId) {
        if self.programs.get(program.0 as usize).is_some() {
            self.current = Some(program);
        }
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let (slot, _) = self.programs.get(program.0 as usize)?.interface.uniform(name)?;
        Some(UniformLocation {
            program,
            slot: slot as u32,
        })
    }

    fn write_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        if let Some(program) = self.programs.get(location.program.0 as usize) {
            program.write_uniform(&self.queue, location.slot, value);
        }
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<AttribIndex> {
        let attr = self.programs.get(program.0 as usize)?.interface.attribute(name)?;
        Some(AttribIndex(attr.location))
    }

    fn create_buffer(&mut self) -> BufferId {
        self.buffers.push(VertexBuffer::default());
        BufferId(self.buffers.len() as u32 - 1)
    }

    fn bind_attribute(&mut self, buffer: BufferId, index: AttribIndex, size: u32) {
        if (buffer.0 as usize) < self.buffers.len() && (1..=4).contains(&size) {
            self.attributes.insert(index.0, (buffer, size));
        }
    }

    fn buffer_data(&mut self, buffer: BufferId, data: &[f32]) {
        let Some(vb) = self.buffers.get_mut(buffer.0 as usize) else {
            return;
        };
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let len = bytes.len() as u64;

        if len > vb.capacity || vb.buffer.is_none() {
            let capacity = len.next_power_of_two().max(64);
            vb.buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("stipple vertex buffer"),
                size: capacity,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            vb.capacity = capacity;
        }
        if let (Some(b), true) = (&vb.buffer, len > 0) {
            self.queue.write_buffer(b, 0, bytes);
        }
        vb.len = len;
    }

    fn create_texture(&mut self, unit: u32) -> TextureId {
        self.textures.push(GpuTexture {
            unit,
            view: upload_texture(&self.device, &self.queue, &ImageData::transparent_pixel()),
            sampler: create_sampler(&self.device, Sampling::default()),
        });
        self.invalidate_bind_groups();
        TextureId(self.textures.len() as u32 - 1)
    }

    fn texture_image(&mut self, texture: TextureId, image: &ImageData) {
        let Some(t) = self.textures.get_mut(texture.0 as usize) else {
            return;
        };
        t.view = upload_texture(&self.device, &self.queue, image);
        self.invalidate_bind_groups();
    }

    fn texture_sampling(&mut self, texture: TextureId, sampling: Sampling) {
        let Some(t) = self.textures.get_mut(texture.0 as usize) else {
            return;
        };
        t.sampler = create_sampler(&self.device, sampling);
        self.invalidate_bind_groups();
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            PhysicalSize::new(width, height),
        );
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn set_clear_color(&mut self, color: ColorRgba) {
        self.clear_color = color;
    }

    fn draw_points(&mut self, first: u32, count: u32) {
        if self.lost || self.size.width == 0 || self.size.height == 0 {
            return;
        }
        let Some(id) = self.current else { return };

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                self.handle_surface_error(err);
                return;
            }
        };

        let sample_count = self.sample_count();
        let Some(program) = self.programs.get_mut(id.0 as usize) else {
            return;
        };

        // Feed every declared input and clamp the range to the shortest buffer.
        let mut declared: Vec<u32> = program.interface.attributes.iter().map(|a| a.location).collect();
        declared.sort_unstable();
        let mut inputs = Vec::with_capacity(declared.len());
        let mut slices = Vec::with_capacity(declared.len());
        let mut available = u32::MAX;
        for location in declared {
            let bound = self.attributes.get(&location).and_then(|&(buffer, size)| {
                let vb = self.buffers.get(buffer.0 as usize)?;
                let b = vb.buffer.as_ref().filter(|_| vb.len > 0)?;
                Some((b.slice(..vb.len), size, vb.len))
            });
            match bound {
                Some((slice, size, len)) => {
                    available = available.min((len / (4 * size as u64)) as u32);
                    inputs.push(VertexInput::Bound { location, size });
                    slices.push(slice);
                }
                None => {
                    if self.attributes.contains_key(&location) {
                        available = 0;
                    }
                    inputs.push(VertexInput::Fallback { location });
                    slices.push(self.fallbacks.vertex.slice(..));
                }
            }
        }
        let count = count.min(available.saturating_sub(first));

        self.targets
            .ensure(&self.device, &self.config, sample_count, self.state.depth_test);
        program.ensure_pipeline(
            &self.device,
            PipelineKey {
                inputs,
                format: self.config.format,
                sample_count,
                state: self.state,
            },
        );

        let views: Vec<&wgpu::TextureView> = (0..program.interface.textures.len() as u32)
            .map(|unit| {
                self.textures
                    .iter()
                    .rev()
                    .find(|t| t.unit == unit)
                    .map_or(&self.fallbacks.view, |t| &t.view)
            })
            .collect();
        let samplers: Vec<&wgpu::Sampler> = (0..program.interface.samplers.len() as u32)
            .map(|unit| {
                self.textures
                    .iter()
                    .rev()
                    .find(|t| t.unit == unit)
                    .map_or(&self.fallbacks.sampler, |t| &t.sampler)
            })
            .collect();
        program.ensure_bind_groups(&self.device, &views, &samplers);

        let Some(pipeline) = program.pipeline() else { return };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("stipple frame encoder"),
            });

        {
            let (target, resolve_target) = match self.targets.msaa() {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("stipple point pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: self.targets.depth().map(|depth| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view: depth,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Discard,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let (vw, vh) = (
                self.viewport.0.min(self.config.width),
                self.viewport.1.min(self.config.height),
            );
            if vw > 0 && vh > 0 {
                rpass.set_viewport(0.0, 0.0, vw as f32, vh as f32, 0.0, 1.0);
            }

            rpass.set_pipeline(pipeline);
            for (index, group) in program.bind_groups().iter().enumerate() {
                rpass.set_bind_group(index as u32, group, &[]);
            }
            for (slot, slice) in slices.iter().enumerate() {
                rpass.set_vertex_buffer(slot as u32, *slice);
            }
            if count > 0 {
                rpass.draw(first..first + count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, image: &ImageData) -> wgpu::TextureView {
    let placeholder;
    let image = if image.width == 0 || image.height == 0 {
        placeholder = ImageData::transparent_pixel();
        &placeholder
    } else {
        image
    };

    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("stipple texture"),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_sampler(device: &wgpu::Device, sampling: Sampling) -> wgpu::Sampler {
    let filter = |f: Filter| match f {
        Filter::Nearest => wgpu::FilterMode::Nearest,
        Filter::Linear => wgpu::FilterMode::Linear,
    };
    let address = |w: Wrap| match w {
        Wrap::Repeat => wgpu::AddressMode::Repeat,
        Wrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    };

    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("stipple sampler"),
        address_mode_u: address(sampling.wrap_s),
        address_mode_v: address(sampling.wrap_t),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter(sampling.mag_filter),
        min_filter: filter(sampling.min_filter),
        ..Default::default()
    })
}
