use super::surface::DEPTH_FORMAT;
use super::{ProgramError, RenderState, ShaderInterface, ShaderStage, UniformKind, UniformValue};

// ── Uniform packing ───────────────────────────────────────────────────────

/// Uniform buffer size for `kind`. Never below 16 bytes.
pub(crate) fn uniform_size(kind: UniformKind) -> u64 {
    let raw = match kind {
        UniformKind::Int | UniformKind::Float => 4,
        UniformKind::Vec2 => 8,
        UniformKind::Vec3 => 12,
        UniformKind::Vec4 | UniformKind::Mat2 => 16,
        UniformKind::Mat3 => 48,
        UniformKind::Mat4 => 64,
    };
    raw.max(16)
}

/// Packs a value into uniform address space layout.
///
/// `mat3x3<f32>` columns are `vec3` with 16-byte alignment, so each column
/// gets one padding float.
pub(crate) fn pack_uniform(value: &UniformValue) -> Vec<u8> {
    let mut bytes = match value {
        UniformValue::Int(v) => bytemuck::bytes_of(v).to_vec(),
        UniformValue::Mat3(m) => {
            let mut padded = [0.0f32; 12];
            for col in 0..3 {
                padded[col * 4..col * 4 + 3].copy_from_slice(&m[col * 3..col * 3 + 3]);
            }
            bytemuck::cast_slice(&padded).to_vec()
        }
        other => bytemuck::cast_slice(other.as_floats()).to_vec(),
    };
    bytes.resize(uniform_size(value.kind()) as usize, 0);
    bytes
}

// ── Vertex layout ─────────────────────────────────────────────────────────

/// How one shader vertex input is fed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum VertexInput {
    /// A bound buffer with `size` floats per vertex.
    Bound { location: u32, size: u32 },
    /// Nothing bound; reads zeros from the shared fallback buffer.
    Fallback { location: u32 },
}

pub(crate) const FALLBACK_VERTEX_BYTES: u64 = 16;

/// Everything a compiled pipeline depends on besides the program itself.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PipelineKey {
    pub(crate) inputs: Vec<VertexInput>,
    pub(crate) format: wgpu::TextureFormat,
    pub(crate) sample_count: u32,
    pub(crate) state: RenderState,
}

// ── Program ───────────────────────────────────────────────────────────────

/// A linked program with its uniform storage, bind groups and pipeline.
pub(crate) struct GpuProgram {
    pub(crate) interface: ShaderInterface,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    group_layouts: Vec<wgpu::BindGroupLayout>,
    layout: wgpu::PipelineLayout,
    /// One buffer per entry of `interface.uniforms`.
    uniform_buffers: Vec<wgpu::Buffer>,
    bind_groups: Vec<wgpu::BindGroup>,
    bind_groups_stale: bool,
    pipeline: Option<(PipelineKey, wgpu::RenderPipeline)>,
}

impl GpuProgram {
    pub(crate) fn compile(
        device: &wgpu::Device,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, ProgramError> {
        let interface = ShaderInterface::reflect(vertex_src, fragment_src)?;
        let vertex = compile_stage(device, vertex_src, ShaderStage::Vertex)?;
        let fragment = compile_stage(device, fragment_src, ShaderStage::Fragment)?;

        let group_count = interface.max_group().map_or(0, |g| g + 1);
        let group_layouts: Vec<wgpu::BindGroupLayout> = (0..group_count)
            .map(|group| create_group_layout(device, &interface, group))
            .collect();
        let layout_refs: Vec<&wgpu::BindGroupLayout> = group_layouts.iter().collect();
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("stipple pipeline layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        let uniform_buffers = interface
            .uniforms
            .iter()
            .map(|u| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(u.name.as_str()),
                    size: u.kind.map_or(16, uniform_size),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        Ok(Self {
            interface,
            vertex,
            fragment,
            group_layouts,
            layout,
            uniform_buffers,
            bind_groups: Vec::new(),
            bind_groups_stale: true,
            pipeline: None,
        })
    }

    pub(crate) fn write_uniform(&self, queue: &wgpu::Queue, slot: u32, value: &UniformValue) {
        let Some(uniform) = self.interface.uniforms.get(slot as usize) else {
            return;
        };
        let Some(value) = uniform.kind.and_then(|k| value.coerce(k)) else {
            log::debug!("dropping {} write to uniform {:?}", value.kind(), uniform.name);
            return;
        };
        if let Some(buffer) = self.uniform_buffers.get(slot as usize) {
            queue.write_buffer(buffer, 0, &pack_uniform(&value));
        }
    }

    pub(crate) fn invalidate_bind_groups(&mut self) {
        self.bind_groups_stale = true;
    }

    /// Rebuilds bind groups if a texture or sampler changed since the last draw.
    ///
    /// `views[k]` and `samplers[k]` back the k-th texture and sampler slot.
    pub(crate) fn ensure_bind_groups(
        &mut self,
        device: &wgpu::Device,
        views: &[&wgpu::TextureView],
        samplers: &[&wgpu::Sampler],
    ) {
        if !self.bind_groups_stale {
            return;
        }

        let mut groups = Vec::with_capacity(self.group_layouts.len());
        for (group, layout) in self.group_layouts.iter().enumerate() {
            let group = group as u32;
            let mut entries = Vec::new();
            for (u, buffer) in self.interface.uniforms.iter().zip(&self.uniform_buffers) {
                if u.group == group {
                    entries.push(wgpu::BindGroupEntry {
                        binding: u.binding,
                        resource: buffer.as_entire_binding(),
                    });
                }
            }
            for (t, view) in self.interface.textures.iter().zip(views) {
                if t.group == group {
                    entries.push(wgpu::BindGroupEntry {
                        binding: t.binding,
                        resource: wgpu::BindingResource::TextureView(view),
                    });
                }
            }
            for (s, sampler) in self.interface.samplers.iter().zip(samplers) {
                if s.group == group {
                    entries.push(wgpu::BindGroupEntry {
                        binding: s.binding,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    });
                }
            }

            groups.push(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("stipple bind group"),
                layout,
                entries: &entries,
            }));
        }

        self.bind_groups = groups;
        self.bind_groups_stale = false;
    }

    pub(crate) fn bind_groups(&self) -> &[wgpu::BindGroup] {
        &self.bind_groups
    }

    /// Rebuilds the pipeline when `key` differs from the one it was built for.
    pub(crate) fn ensure_pipeline(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.pipeline.as_ref().is_some_and(|(k, _)| *k == key) {
            return;
        }
        let pipeline = self.build_pipeline(device, &key);
        self.pipeline = Some((key, pipeline));
    }

    pub(crate) fn pipeline(&self) -> Option<&wgpu::RenderPipeline> {
        self.pipeline.as_ref().map(|(_, p)| p)
    }

    fn build_pipeline(&self, device: &wgpu::Device, key: &PipelineKey) -> wgpu::RenderPipeline {
        log::debug!("building point pipeline for {} vertex inputs", key.inputs.len());

        let attributes: Vec<[wgpu::VertexAttribute; 1]> = key
            .inputs
            .iter()
            .map(|input| {
                let (location, format) = match *input {
                    VertexInput::Bound { location, size } => (location, float_format(size)),
                    VertexInput::Fallback { location } => (location, wgpu::VertexFormat::Float32x4),
                };
                [wgpu::VertexAttribute {
                    format,
                    offset: 0,
                    shader_location: location,
                }]
            })
            .collect();

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = key
            .inputs
            .iter()
            .zip(&attributes)
            .map(|(input, attrs)| match *input {
                VertexInput::Bound { size, .. } => wgpu::VertexBufferLayout {
                    array_stride: 4 * size as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: attrs,
                },
                VertexInput::Fallback { .. } => wgpu::VertexBufferLayout {
                    array_stride: FALLBACK_VERTEX_BYTES,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: attrs,
                },
            })
            .collect();

        let blend = key.state.additive_blend.then_some(additive_blend());
        let depth_stencil = key.state.depth_test.then(|| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("stipple point pipeline"),
            layout: Some(&self.layout),
            vertex: wgpu::VertexState {
                module: &self.vertex,
                entry_point: Some(self.interface.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.fragment,
                entry_point: Some(self.interface.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: key.state.cull_back_faces.then_some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: wgpu::MultisampleState {
                count: key.sample_count,
                ..Default::default()
            },
            multiview_mask: None,
            cache: None,
        })
    }
}

fn compile_stage(
    device: &wgpu::Device,
    src: &str,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule, ProgramError> {
    let label = match stage {
        ShaderStage::Vertex => "stipple vertex shader",
        ShaderStage::Fragment => "stipple fragment shader",
    };
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(src.into()),
    });

    let info = pollster::block_on(module.get_compilation_info());
    let errors: Vec<String> = info
        .messages
        .iter()
        .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
        .map(|m| match &m.location {
            Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
            None => m.message.clone(),
        })
        .collect();

    if errors.is_empty() {
        Ok(module)
    } else {
        Err(ProgramError::compile(stage, errors.join("\n")))
    }
}

fn create_group_layout(
    device: &wgpu::Device,
    interface: &ShaderInterface,
    group: u32,
) -> wgpu::BindGroupLayout {
    let visibility = wgpu::ShaderStages::VERTEX_FRAGMENT;

    let uniforms = interface
        .uniforms
        .iter()
        .filter(|u| u.group == group)
        .map(|u| wgpu::BindGroupLayoutEntry {
            binding: u.binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
    let textures = interface
        .textures
        .iter()
        .filter(|t| t.group == group)
        .map(|t| wgpu::BindGroupLayoutEntry {
            binding: t.binding,
            visibility,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
    let samplers = interface
        .samplers
        .iter()
        .filter(|s| s.group == group)
        .map(|s| wgpu::BindGroupLayoutEntry {
            binding: s.binding,
            visibility,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });

    let entries: Vec<wgpu::BindGroupLayoutEntry> = uniforms.chain(textures).chain(samplers).collect();
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("stipple bind group layout"),
        entries: &entries,
    })
}

fn float_format(size: u32) -> wgpu::VertexFormat {
    match size {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

/// `src * src_alpha + dst`.
fn additive_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    #[test]
    fn scalars_are_padded_to_sixteen_bytes() {
        let bytes = pack_uniform(&UniformValue::Float(1.5));
        assert_eq!(bytes.len(), 16);
        assert_eq!(floats(&bytes), vec![1.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn ints_keep_their_bit_pattern() {
        let bytes = pack_uniform(&UniformValue::Int(-7));
        assert_eq!(i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), -7);
    }

    #[test]
    fn mat3_columns_are_padded() {
        let m = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let bytes = pack_uniform(&UniformValue::Mat3(m));
        assert_eq!(bytes.len(), 48);
        assert_eq!(
            floats(&bytes),
            vec![1.0, 2.0, 3.0, 0.0, 4.0, 5.0, 6.0, 0.0, 7.0, 8.0, 9.0, 0.0]
        );
    }

    #[test]
    fn mat4_is_copied_verbatim() {
        let mut m = [0.0f32; 16];
        for (i, v) in m.iter_mut().enumerate() {
            *v = i as f32;
        }
        assert_eq!(floats(&pack_uniform(&UniformValue::Mat4(m))), m.to_vec());
    }

    #[test]
    fn buffer_sizes_match_packing() {
        for value in [
            UniformValue::Vec2([0.0; 2]),
            UniformValue::Vec3([0.0; 3]),
            UniformValue::Mat2([0.0; 4]),
            UniformValue::Mat4([0.0; 16]),
        ] {
            assert_eq!(pack_uniform(&value).len() as u64, uniform_size(value.kind()));
        }
    }
}
