use crate::device::RenderState;

/// Everything a program context needs at activation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramConfig {
    /// Request a multisampled surface.
    pub antialias: bool,
    pub depth_test: bool,
    /// WGSL source holding the `@vertex` entry point.
    pub vertex_source: String,
    /// WGSL source holding the `@fragment` entry point.
    pub fragment_source: String,
}

impl ProgramConfig {
    pub fn new(vertex_source: impl Into<String>, fragment_source: impl Into<String>) -> Self {
        Self {
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            ..Self::default()
        }
    }

    pub fn antialias(mut self, enabled: bool) -> Self {
        self.antialias = enabled;
        self
    }

    pub fn depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = enabled;
        self
    }

    /// Fixed-function state: additive blending and back-face culling are
    /// always on.
    pub fn render_state(&self) -> RenderState {
        RenderState {
            antialias: self.antialias,
            depth_test: self.depth_test,
            ..RenderState::default()
        }
    }
}
