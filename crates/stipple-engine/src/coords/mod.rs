//! Size and color records shared between the program context and devices.
//!
//! Canonical space for sizes is device pixels, origin top-left, +Y down.

mod color;
mod stage;

pub use color::ColorRgba;
pub use stage::Stage;
