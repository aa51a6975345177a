//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and wires them to a program
//! context on the wgpu device.

mod host;
mod runtime;

pub use host::WindowHost;
pub use runtime::{Runtime, RuntimeConfig};
