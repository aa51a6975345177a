use crate::coords::Stage;
use crate::math::{self, Mat4, Vec3};

use super::CameraParams;

/// World-up used for the look-at basis.
pub const WORLD_UP: Vec3 = [0.0, 1.0, 0.0];

/// Builds the view-projection matrix for `camera` on a surface of size `stage`.
///
/// Perspective cameras compose `perspective(..) ∘ inverse(look_at(..))`.
/// Orthographic cameras map `[0, width] × [0, height]` to clip space with Y
/// flipped, ignoring every other parameter.
///
/// Degenerate input (`position == target`, zero height, an up vector parallel
/// to the view direction) produces non-finite or degenerate matrices; it never
/// panics.
pub fn build_projection(stage: Stage, camera: &CameraParams) -> Mat4 {
    if !camera.perspective {
        return orthographic(stage);
    }

    let projection = perspective(camera.fov, stage.aspect(), camera.near, camera.far);
    let basis = look_at(camera.position, camera.target);
    math::multiply(&projection, &math::inverse(&basis))
}

/// Right-handed perspective projection (`fov` in degrees).
#[rustfmt::skip]
pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = (std::f32::consts::FRAC_PI_2 - fov.to_radians() / 2.0).tan();
    let range_inv = 1.0 / (near - far);

    [
        f / aspect, 0.0, 0.0,                            0.0,
        0.0,        f,   0.0,                            0.0,
        0.0,        0.0, (near + far) * range_inv,      -1.0,
        0.0,        0.0, near * far * range_inv * 2.0,   0.0,
    ]
}

/// Camera-to-world basis looking from `position` towards `target`.
///
/// The camera's local +Z points away from the target.
#[rustfmt::skip]
pub fn look_at(position: Vec3, target: Vec3) -> Mat4 {
    let z = math::normalize(math::subtract(position, target));
    let x = math::normalize(math::cross(WORLD_UP, z));
    let y = math::normalize(math::cross(z, x));

    [
        x[0],        x[1],        x[2],        0.0,
        y[0],        y[1],        y[2],        0.0,
        z[0],        z[1],        z[2],        0.0,
        position[0], position[1], position[2], 1.0,
    ]
}

/// Pixel-space orthographic projection with top-left origin.
#[rustfmt::skip]
pub fn orthographic(stage: Stage) -> Mat4 {
    [
        2.0 / stage.width, 0.0,                 0.0, 0.0,
        0.0,              -2.0 / stage.height,  0.0, 0.0,
        0.0,               0.0,                 1.0, 0.0,
       -1.0,               1.0,                 0.0, 1.0,
    ]
}
