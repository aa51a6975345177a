/// Drawable size in device pixels.
///
/// Produced by the program context on every resize (`logical size × device
/// pixel ratio`) and consumed by the projection builder. Values are kept
/// unrounded; the backing surface itself is sized to the nearest integers.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Stage {
    pub width: f32,
    pub height: f32,
}

impl Stage {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Derives the device-pixel stage from a logical size and pixel ratio.
    #[inline]
    pub fn from_logical(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self::new(width * device_pixel_ratio, height * device_pixel_ratio)
    }

    /// Integer surface size, as allocated on the device.
    ///
    /// Rounds to the nearest pixel so a logical size derived from a physical
    /// one maps back onto it despite float error.
    #[inline]
    pub fn surface_size(self) -> (u32, u32) {
        (self.width.max(0.0).round() as u32, self.height.max(0.0).round() as u32)
    }

    #[inline]
    pub fn aspect(self) -> f32 {
        self.width / self.height
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}
