use std::collections::HashMap;

use crate::coords::ColorRgba;
use crate::image::ImageData;

use super::{
    AttribIndex, BufferId, Device, ProgramError, ProgramId, RenderState, Sampling, ShaderInterface,
    TextureId, UniformLocation, UniformValue,
};

/// One recorded device command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Configure(RenderState),
    CreateProgram(ProgramId),
    UseProgram(ProgramId),
    ResolveUniform { name: String, found: bool },
    WriteUniform { location: UniformLocation, value: UniformValue },
    ResolveAttribute { name: String, found: bool },
    CreateBuffer(BufferId),
    BindAttribute { buffer: BufferId, index: AttribIndex, size: u32 },
    BufferData { buffer: BufferId, len: usize },
    CreateTexture { texture: TextureId, unit: u32 },
    TextureImage { texture: TextureId, width: u32, height: u32 },
    TextureSampling { texture: TextureId, sampling: Sampling },
    ResizeSurface { width: u32, height: u32 },
    SetViewport { width: u32, height: u32 },
    SetClearColor(ColorRgba),
    DrawPoints(DrawCall),
}

/// A recorded draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub program: Option<ProgramId>,
    pub first: u32,
    pub count: u32,
}

/// Texture state as last uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessTexture {
    pub unit: u32,
    pub image: Option<ImageData>,
    pub sampling: Sampling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttributeBinding {
    buffer: BufferId,
    size: u32,
}

struct HeadlessProgram {
    interface: ShaderInterface,
    uniforms: HashMap<u32, UniformValue>,
}

/// A device that executes nothing and remembers everything.
///
/// Programs are checked with the same interface scanner the wgpu backend
/// uses, so compile and link failures and name resolution behave alike.
#[derive(Default)]
pub struct HeadlessDevice {
    commands: Vec<Command>,
    render_state: Option<RenderState>,
    programs: Vec<HeadlessProgram>,
    current: Option<ProgramId>,
    buffers: Vec<Vec<f32>>,
    attributes: HashMap<u32, AttributeBinding>,
    textures: Vec<HeadlessTexture>,
    surface_size: (u32, u32),
    viewport: (u32, u32),
    clear_color: ColorRgba,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of recorded commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::DrawPoints(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    pub fn render_state(&self) -> Option<RenderState> {
        self.render_state
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.current
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn interface(&self, program: ProgramId) -> Option<&ShaderInterface> {
        self.program(program).map(|p| &p.interface)
    }

    /// Last value written to the uniform called `name`.
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<&UniformValue> {
        let p = self.program(program)?;
        let (slot, _) = p.interface.uniform(name)?;
        p.uniforms.get(&(slot as u32))
    }

    pub fn buffer(&self, buffer: BufferId) -> Option<&[f32]> {
        self.buffers.get(buffer.0 as usize).map(Vec::as_slice)
    }

    /// Buffer and component count bound at vertex input `location`.
    pub fn attribute(&self, location: u32) -> Option<(BufferId, u32)> {
        self.attributes.get(&location).map(|a| (a.buffer, a.size))
    }

    pub fn texture(&self, texture: TextureId) -> Option<&HeadlessTexture> {
        self.textures.get(texture.0 as usize)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn clear_color(&self) -> ColorRgba {
        self.clear_color
    }

    fn program(&self, program: ProgramId) -> Option<&HeadlessProgram> {
        self.programs.get(program.0 as usize)
    }
}

impl Device for HeadlessDevice {
    fn configure(&mut self, state: &RenderState) {
        self.render_state = Some(*state);
        self.commands.push(Command::Configure(*state));
    }

    fn create_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, ProgramError> {
        let interface = ShaderInterface::reflect(vertex, fragment)?;
        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(HeadlessProgram {
            interface,
            uniforms: HashMap::new(),
        });
        self.commands.push(Command::CreateProgram(id));
        Ok(id)
    }

    fn use_program(&mut self, program: ProgramId) {
        if self.program(program).is_some() {
            self.current = Some(program);
            self.commands.push(Command::UseProgram(program));
        }
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let location = self
            .program(program)
            .and_then(|p| p.interface.uniform(name))
            .map(|(slot, _)| UniformLocation {
                program,
                slot: slot as u32,
            });
        self.commands.push(Command::ResolveUniform {
            name: name.to_string(),
            found: location.is_some(),
        });
        location
    }

    fn write_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        let Some(p) = self.programs.get_mut(location.program.0 as usize) else {
            return;
        };
        let Some(slot) = p.interface.uniforms.get(location.slot as usize) else {
            return;
        };
        let Some(value) = slot.kind.and_then(|k| value.coerce(k)) else {
            log::debug!("dropping {} write to uniform {:?}", value.kind(), slot.name);
            return;
        };

        p.uniforms.insert(location.slot, value.clone());
        self.commands.push(Command::WriteUniform { location, value });
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<AttribIndex> {
        let index = self
            .program(program)
            .and_then(|p| p.interface.attribute(name))
            .map(|a| AttribIndex(a.location));
        self.commands.push(Command::ResolveAttribute {
            name: name.to_string(),
            found: index.is_some(),
        });
        index
    }

    fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(Vec::new());
        self.commands.push(Command::CreateBuffer(id));
        id
    }

    fn bind_attribute(&mut self, buffer: BufferId, index: AttribIndex, size: u32) {
        if self.buffer(buffer).is_none() || !(1..=4).contains(&size) {
            return;
        }
        self.attributes.insert(index.0, AttributeBinding { buffer, size });
        self.commands.push(Command::BindAttribute { buffer, index, size });
    }

    fn buffer_data(&mut self, buffer: BufferId, data: &[f32]) {
        let Some(slot) = self.buffers.get_mut(buffer.0 as usize) else {
            return;
        };
        slot.clear();
        slot.extend_from_slice(data);
        self.commands.push(Command::BufferData {
            buffer,
            len: data.len(),
        });
    }

    fn create_texture(&mut self, unit: u32) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(HeadlessTexture {
            unit,
            image: None,
            sampling: Sampling::default(),
        });
        self.commands.push(Command::CreateTexture { texture: id, unit });
        id
    }

    fn texture_image(&mut self, texture: TextureId, image: &ImageData) {
        let Some(t) = self.textures.get_mut(texture.0 as usize) else {
            return;
        };
        t.image = Some(image.clone());
        self.commands.push(Command::TextureImage {
            texture,
            width: image.width,
            height: image.height,
        });
    }

    fn texture_sampling(&mut self, texture: TextureId, sampling: Sampling) {
        let Some(t) = self.textures.get_mut(texture.0 as usize) else {
            return;
        };
        t.sampling = sampling;
        self.commands.push(Command::TextureSampling { texture, sampling });
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface_size = (width, height);
        self.commands.push(Command::ResizeSurface { width, height });
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.commands.push(Command::SetViewport { width, height });
    }

    fn set_clear_color(&mut self, color: ColorRgba) {
        self.clear_color = color;
        self.commands.push(Command::SetClearColor(color));
    }

    fn draw_points(&mut self, first: u32, count: u32) {
        self.commands.push(Command::DrawPoints(DrawCall {
            program: self.current,
            first,
            count,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
        @group(0) @binding(0) var<uniform> u_size: f32;

        @vertex
        fn vs_main(@location(0) a_position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(a_position * u_size, 1.0);
        }
    "#;

    const FS: &str = r#"
        @group(0) @binding(1) var<uniform> u_color: vec4<f32>;

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return u_color;
        }
    "#;

    fn device_with_program() -> (HeadlessDevice, ProgramId) {
        let mut device = HeadlessDevice::new();
        let program = device.create_program(VS, FS).expect("program links");
        device.use_program(program);
        (device, program)
    }

    // ── Programs ──────────────────────────────────────────────────────────

    #[test]
    fn create_program_reports_compile_failure() {
        let mut device = HeadlessDevice::new();
        let err = device.create_program("fn nope() {}", FS).unwrap_err();
        assert!(matches!(err, ProgramError::Compile { .. }));
        assert_eq!(device.program_count(), 0);
    }

    #[test]
    fn draws_record_current_program() {
        let (mut device, program) = device_with_program();
        device.draw_points(0, 12);
        assert_eq!(
            device.draws(),
            vec![DrawCall {
                program: Some(program),
                first: 0,
                count: 12
            }]
        );
    }

    // ── Uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn uniform_locations_resolve_by_name() {
        let (mut device, program) = device_with_program();
        assert!(device.uniform_location(program, "u_color").is_some());
        assert!(device.uniform_location(program, "u_missing").is_none());
    }

    #[test]
    fn uniform_writes_are_coerced_to_the_slot_shape() {
        let (mut device, program) = device_with_program();
        let loc = device.uniform_location(program, "u_size").unwrap();

        device.write_uniform(loc, &UniformValue::Int(2));
        assert_eq!(device.uniform(program, "u_size"), Some(&UniformValue::Float(2.0)));
    }

    #[test]
    fn mismatched_uniform_writes_are_dropped() {
        let (mut device, program) = device_with_program();
        let loc = device.uniform_location(program, "u_color").unwrap();

        device.write_uniform(loc, &UniformValue::Vec2([1.0, 2.0]));
        assert_eq!(device.uniform(program, "u_color"), None);
        assert_eq!(device.count(|c| matches!(c, Command::WriteUniform { .. })), 0);
    }

    // ── Buffers & textures ────────────────────────────────────────────────

    #[test]
    fn buffer_data_replaces_content() {
        let mut device = HeadlessDevice::new();
        let buf = device.create_buffer();
        device.buffer_data(buf, &[1.0, 2.0, 3.0]);
        device.buffer_data(buf, &[4.0]);
        assert_eq!(device.buffer(buf), Some(&[4.0][..]));
    }

    #[test]
    fn bind_attribute_rejects_bad_sizes() {
        let mut device = HeadlessDevice::new();
        let buf = device.create_buffer();
        device.bind_attribute(buf, AttribIndex(0), 5);
        assert_eq!(device.attribute(0), None);

        device.bind_attribute(buf, AttribIndex(0), 3);
        assert_eq!(device.attribute(0), Some((buf, 3)));
    }

    #[test]
    fn textures_start_empty_with_default_sampling() {
        let mut device = HeadlessDevice::new();
        let tex = device.create_texture(0);
        let t = device.texture(tex).unwrap();
        assert_eq!(t.image, None);
        assert_eq!(t.sampling, Sampling::default());
    }
}
