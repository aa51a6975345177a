//! Vector and matrix algebra.
//!
//! Plain arrays, no state. Matrices are 4×4, stored column-major in a flat
//! `[f32; 16]` (`m[col * 4 + row]`), which is also the layout uploaded to
//! `mat4x4<f32>` uniforms without transposition.

mod mat4;
mod vec3;

pub use mat4::{IDENTITY, Mat4, inverse, multiply, transform_point};
pub use vec3::{Vec3, cross, normalize, subtract};
