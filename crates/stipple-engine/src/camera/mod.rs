//! Camera parameters and view-projection construction.
//!
//! `build_projection` is a pure function of `(Stage, CameraParams)`.
//! `ProjectionCache` memoizes it on that input pair so unrelated frames do not
//! recompute (or re-upload) the matrix.

mod cache;
mod params;
mod projection;

pub use cache::ProjectionCache;
pub use params::CameraParams;
pub use projection::{build_projection, look_at, orthographic, perspective, WORLD_UP};
