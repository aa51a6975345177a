//! Resource bindings.
//!
//! Each binding resolves its device handle once, when it attaches to a
//! linked program, and afterwards only writes values. A binding whose name
//! did not resolve keeps a `None` handle and its writes are never issued.

mod attribute;
mod camera;
mod texture;
mod uniform;

pub use attribute::AttributeBinding;
pub use camera::{CameraBinding, PROJECTION_UNIFORM};
pub use texture::{TextureBinding, TextureState};
pub use uniform::UniformBinding;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::device::{Device, HeadlessDevice, ProgramId};

    pub(crate) const VERTEX: &str = r#"
        @group(0) @binding(0) var<uniform> u_projection: mat4x4<f32>;
        @group(0) @binding(1) var<uniform> u_time: f32;
        @group(0) @binding(2) var<uniform> u_tint: vec3<f32>;
        @group(0) @binding(3) var<uniform> u_frame: i32;

        struct VertexOut {
            @builtin(position) position: vec4<f32>,
            @location(0) color: vec4<f32>,
        }

        @vertex
        fn vs_main(@location(0) a_position: vec3<f32>, @location(1) a_color: vec4<f32>) -> VertexOut {
            var out: VertexOut;
            out.position = u_projection * vec4<f32>(a_position, 1.0);
            out.color = a_color * vec4<f32>(u_tint, 1.0) * u_time;
            return out;
        }
    "#;

    pub(crate) const FRAGMENT: &str = r#"
        @group(1) @binding(0) var t_sprite: texture_2d<f32>;
        @group(1) @binding(1) var s_sprite: sampler;

        @fragment
        fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
            return color * textureSample(t_sprite, s_sprite, vec2<f32>(0.5, 0.5));
        }
    "#;

    pub(crate) fn linked_device() -> (HeadlessDevice, ProgramId) {
        let mut device = HeadlessDevice::new();
        let program = device
            .create_program(VERTEX, FRAGMENT)
            .expect("fixture program links");
        device.use_program(program);
        (device, program)
    }
}
