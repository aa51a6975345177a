use crate::math::Vec3;

/// Declarative camera description.
///
/// `fov` is the vertical field of view in degrees. `near`, `far`, `position`
/// and `target` are ignored when `perspective` is `false`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraParams {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub perspective: bool,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near: 1.0,
            far: 10_000.0,
            position: [0.0, 0.0, 100.0],
            target: [0.0, 0.0, 0.0],
            perspective: true,
        }
    }
}

impl CameraParams {
    /// Pixel-space orthographic camera (top-left origin).
    pub fn orthographic() -> Self {
        Self {
            perspective: false,
            ..Self::default()
        }
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees;
        self
    }

    pub fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = [x, y, z];
        self
    }

    pub fn looking_at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.target = [x, y, z];
        self
    }
}
