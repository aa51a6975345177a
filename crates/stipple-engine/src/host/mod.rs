//! The element a program context renders into.
//!
//! A [`Host`] reports the logical size of the drawing area and the device
//! pixel ratio. [`ResizeSignal`] tells subscribers that those values changed.

mod signal;

pub use signal::{ResizeSignal, ResizeSubscription};

/// Sizing source for a program context.
pub trait Host {
    /// Size of the drawing area in logical pixels.
    fn logical_size(&self) -> (f32, f32);

    /// Device pixels per logical pixel.
    fn device_pixel_ratio(&self) -> f32;
}

/// A host with fixed dimensions, for tools and tests.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FixedHost {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl FixedHost {
    pub const fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }
}

impl Host for FixedHost {
    fn logical_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }
}
