//! Stipple engine crate.
//!
//! Declarative shader programs for point rendering: a program context keeps
//! uniforms, vertex attributes, textures and a camera projection in sync with
//! a [`program::Scene`] and draws it once per frame.
//!
//! The GPU is reached through the [`device::Device`] trait. [`device::WgpuDevice`]
//! draws to a window; [`device::HeadlessDevice`] records commands instead.

pub mod bindings;
pub mod camera;
pub mod coords;
pub mod core;
pub mod device;
pub mod host;
pub mod image;
pub mod logging;
pub mod math;
pub mod program;
pub mod time;
pub mod window;
