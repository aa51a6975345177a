use crate::coords::Stage;
use crate::math::Mat4;

use super::{build_projection, CameraParams};

/// Memoized view-projection matrix.
///
/// Keyed by the exact `(Stage, CameraParams)` pair the current matrix was
/// built from. A lookup with an equal key returns the stored matrix untouched.
#[derive(Debug, Clone, Default)]
pub struct ProjectionCache {
    key: Option<(Stage, CameraParams)>,
    matrix: Option<Mat4>,
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the matrix for the given inputs and whether it was recomputed.
    pub fn resolve(&mut self, stage: Stage, camera: &CameraParams) -> (Mat4, bool) {
        let key = (stage, *camera);
        if let (Some(cached), Some(matrix)) = (&self.key, self.matrix) {
            if *cached == key {
                return (matrix, false);
            }
        }

        let matrix = build_projection(stage, camera);
        self.key = Some(key);
        self.matrix = Some(matrix);
        (matrix, true)
    }

    /// Most recently computed matrix, if any.
    pub fn current(&self) -> Option<&Mat4> {
        self.matrix.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_resolve_computes() {
        let mut cache = ProjectionCache::new();
        assert!(cache.current().is_none());

        let (_, changed) = cache.resolve(Stage::new(800.0, 600.0), &CameraParams::default());
        assert!(changed);
        assert!(cache.current().is_some());
    }

    #[test]
    fn identical_inputs_reuse_previous_matrix() {
        let mut cache = ProjectionCache::new();
        let stage = Stage::new(800.0, 600.0);
        let camera = CameraParams::default();

        let (first, _) = cache.resolve(stage, &camera);
        let (second, changed) = cache.resolve(stage, &camera);
        assert!(!changed);
        assert_eq!(first, second);
    }

    #[test]
    fn any_input_change_recomputes() {
        let mut cache = ProjectionCache::new();
        let stage = Stage::new(800.0, 600.0);
        let camera = CameraParams::default();
        cache.resolve(stage, &camera);

        assert!(cache.resolve(Stage::new(801.0, 600.0), &camera).1);
        let moved = camera.looking_at(0.0, 1.0, 0.0);
        assert!(cache.resolve(Stage::new(801.0, 600.0), &moved).1);
        assert!(!cache.resolve(Stage::new(801.0, 600.0), &moved).1);
        assert!(cache.resolve(Stage::new(801.0, 600.0), &CameraParams::orthographic()).1);
    }
}
