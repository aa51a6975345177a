//! Image loading boundary.
//!
//! Texture bindings issue exactly one load per lifetime through an
//! [`ImageLoader`] and poll the returned [`PendingImage`] from the render
//! thread. Decoding itself may run elsewhere; completion only becomes visible
//! when the owner polls.

mod data;
mod loader;

pub use data::ImageData;
pub use loader::{
    FileImageLoader, ImageLoadError, ImageLoader, ImagePoll, ImageSender, PendingImage,
};
