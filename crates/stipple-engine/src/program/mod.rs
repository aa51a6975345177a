//! Program context and the declarations it reconciles.
//!
//! A [`ProgramContext`] owns the device and the linked program. Each frame
//! the application hands it a [`Scene`]: uniforms and attributes matched by
//! name, textures by position, plus an optional camera. Bindings attach the
//! first time a declaration appears and only write when its value changes.

mod config;
mod context;
mod scene;

pub use config::ProgramConfig;
pub use context::{ProgramContext, ResizeEvent};
pub use scene::{AttributeDecl, Scene, TextureDecl, UniformDecl};
