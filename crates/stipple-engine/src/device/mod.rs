//! Graphics device boundary.
//!
//! [`Device`] is the command surface the program context and bindings talk
//! to. It is deliberately GL-shaped: handles are resolved by name once, then
//! written to by value. Resolution failures come back as `None` and every
//! write against a missing handle is simply never issued.
//!
//! Two implementations live here:
//! - [`HeadlessDevice`] records every command in memory
//! - [`WgpuDevice`] drives a window surface through wgpu

mod error;
mod gpu;
mod headless;
mod interface;
mod program;
mod surface;
mod types;

pub use error::{ProgramError, ShaderStage, SurfaceErrorAction};
pub use gpu::{GpuInit, WgpuDevice};
pub use headless::{Command, DrawCall, HeadlessDevice, HeadlessTexture};
pub use interface::{AttributeSlot, ResourceSlot, ShaderInterface, UniformSlot};
pub use types::{
    AttribIndex, BufferId, Filter, ProgramId, RenderState, Sampling, TextureId, UniformKind,
    UniformLocation, UniformValue, UnknownUniformKind, Wrap,
};

use crate::coords::ColorRgba;
use crate::image::ImageData;

/// Commands a program context issues against the graphics API.
///
/// Every method is infallible except program creation. Writes addressed to
/// handles the device does not know are ignored.
pub trait Device {
    /// Applies fixed-function state. Called once, before program creation.
    fn configure(&mut self, state: &RenderState);

    /// Compiles both stages and links them.
    fn create_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, ProgramError>;

    /// Makes `program` current for subsequent draws.
    fn use_program(&mut self, program: ProgramId);

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn write_uniform(&mut self, location: UniformLocation, value: &UniformValue);

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<AttribIndex>;

    fn create_buffer(&mut self) -> BufferId;

    /// Binds `buffer` to the vertex input at `index`, `size` floats per vertex.
    fn bind_attribute(&mut self, buffer: BufferId, index: AttribIndex, size: u32);

    /// Replaces the whole content of `buffer`.
    fn buffer_data(&mut self, buffer: BufferId, data: &[f32]);

    /// Allocates a texture bound to the `unit`-th texture slot of the current program.
    fn create_texture(&mut self, unit: u32) -> TextureId;

    /// Replaces the whole content of `texture`.
    fn texture_image(&mut self, texture: TextureId, image: &ImageData);

    fn texture_sampling(&mut self, texture: TextureId, sampling: Sampling);

    /// Resizes the backing surface, in device pixels.
    fn resize_surface(&mut self, width: u32, height: u32);

    fn set_viewport(&mut self, width: u32, height: u32);

    fn set_clear_color(&mut self, color: ColorRgba);

    /// Draws `count` points starting at vertex `first` with the current program.
    fn draw_points(&mut self, first: u32, count: u32);
}
