use crate::camera::{CameraParams, ProjectionCache};
use crate::coords::Stage;
use crate::device::{Device, ProgramId, UniformKind, UniformValue};
use crate::math::Mat4;

use super::UniformBinding;

/// Uniform the view-projection matrix is written to.
pub const PROJECTION_UNIFORM: &str = "u_projection";

/// Keeps `u_projection` in step with the camera and the stage.
///
/// The matrix is rebuilt and uploaded only when either input changed.
#[derive(Debug, Clone)]
pub struct CameraBinding {
    cache: ProjectionCache,
    uniform: UniformBinding,
}

impl CameraBinding {
    pub fn attach<D: Device + ?Sized>(device: &mut D, program: ProgramId) -> Self {
        Self {
            cache: ProjectionCache::new(),
            uniform: UniformBinding::attach(device, program, PROJECTION_UNIFORM, UniformKind::Mat4),
        }
    }

    /// Returns whether the matrix was recomputed.
    pub fn update<D: Device + ?Sized>(
        &mut self,
        device: &mut D,
        stage: Stage,
        camera: &CameraParams,
    ) -> bool {
        let (matrix, changed) = self.cache.resolve(stage, camera);
        if changed {
            self.uniform.update(device, &UniformValue::Mat4(matrix));
        }
        changed
    }

    pub fn matrix(&self) -> Option<&Mat4> {
        self.cache.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::fixtures::linked_device;
    use crate::camera::build_projection;
    use crate::device::Command;

    #[test]
    fn uploads_projection_on_first_update() {
        let (mut device, program) = linked_device();
        let mut binding = CameraBinding::attach(&mut device, program);
        let stage = Stage::new(600.0, 600.0);
        let camera = CameraParams::default();

        assert!(binding.update(&mut device, stage, &camera));
        let expected = build_projection(stage, &camera);
        assert_eq!(
            device.uniform(program, PROJECTION_UNIFORM),
            Some(&UniformValue::Mat4(expected))
        );
    }

    #[test]
    fn stable_inputs_do_not_reupload() {
        let (mut device, program) = linked_device();
        let mut binding = CameraBinding::attach(&mut device, program);
        let stage = Stage::new(800.0, 600.0);
        let camera = CameraParams::default();

        binding.update(&mut device, stage, &camera);
        for _ in 0..5 {
            assert!(!binding.update(&mut device, stage, &camera));
        }
        assert_eq!(device.count(|c| matches!(c, Command::WriteUniform { .. })), 1);
    }

    #[test]
    fn stage_change_recomputes() {
        let (mut device, program) = linked_device();
        let mut binding = CameraBinding::attach(&mut device, program);
        let camera = CameraParams::orthographic();

        binding.update(&mut device, Stage::new(800.0, 600.0), &camera);
        assert!(binding.update(&mut device, Stage::new(1024.0, 768.0), &camera));
        assert_eq!(binding.matrix().map(|m| m[0]), Some(2.0 / 1024.0));
    }
}
