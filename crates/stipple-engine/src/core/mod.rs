//! Core engine-facing contracts.
//!
//! The stable interface between the runtime (platform loop) and the
//! application: resize notifications in, one declared [`Scene`] per frame out.
//!
//! [`Scene`]: crate::program::Scene

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
