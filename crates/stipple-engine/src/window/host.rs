use winit::window::Window;

use crate::host::Host;

/// Exposes a window's inner area as a [`Host`].
#[derive(Debug, Copy, Clone)]
pub struct WindowHost<'a>(pub &'a Window);

impl Host for WindowHost<'_> {
    fn logical_size(&self) -> (f32, f32) {
        let logical: winit::dpi::LogicalSize<f64> =
            self.0.inner_size().to_logical(self.0.scale_factor());
        (logical.width as f32, logical.height as f32)
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.0.scale_factor() as f32
    }
}
