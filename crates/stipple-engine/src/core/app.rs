use winit::event::WindowEvent;

use crate::program::ResizeEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called after each applied resize, including the one at activation.
    fn on_resize(&mut self, event: &ResizeEvent) {
        let _ = event;
    }

    /// Called for window events.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per driven frame, before the scene is rendered.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;
}
