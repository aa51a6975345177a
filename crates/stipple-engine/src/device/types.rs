use std::fmt;
use std::str::FromStr;

// ── Handles ───────────────────────────────────────────────────────────────

/// A linked program on a device.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(pub(crate) u32);

/// A vertex buffer on a device.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(pub(crate) u32);

/// A 2D texture on a device.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub(crate) u32);

/// A resolved uniform slot within one program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    pub(crate) program: ProgramId,
    pub(crate) slot: u32,
}

/// A resolved vertex input location.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttribIndex(pub(crate) u32);

impl AttribIndex {
    #[inline]
    pub fn location(self) -> u32 {
        self.0
    }
}

// ── Uniform shapes ────────────────────────────────────────────────────────

/// The eight uniform shapes a binding can declare.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl UniformKind {
    /// Number of scalar components a value of this kind carries.
    pub const fn components(self) -> usize {
        match self {
            UniformKind::Int | UniformKind::Float => 1,
            UniformKind::Vec2 => 2,
            UniformKind::Vec3 => 3,
            UniformKind::Vec4 | UniformKind::Mat2 => 4,
            UniformKind::Mat3 => 9,
            UniformKind::Mat4 => 16,
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            UniformKind::Int => "int",
            UniformKind::Float => "float",
            UniformKind::Vec2 => "vec2",
            UniformKind::Vec3 => "vec3",
            UniformKind::Vec4 => "vec4",
            UniformKind::Mat2 => "mat2",
            UniformKind::Mat3 => "mat3",
            UniformKind::Mat4 => "mat4",
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A type tag outside `int|float|vec2|vec3|vec4|mat2|mat3|mat4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUniformKind(pub String);

impl fmt::Display for UnknownUniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown uniform type tag {:?}", self.0)
    }
}

impl std::error::Error for UnknownUniformKind {}

impl FromStr for UniformKind {
    type Err = UnknownUniformKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "int" => UniformKind::Int,
            "float" => UniformKind::Float,
            "vec2" => UniformKind::Vec2,
            "vec3" => UniformKind::Vec3,
            "vec4" => UniformKind::Vec4,
            "mat2" => UniformKind::Mat2,
            "mat3" => UniformKind::Mat3,
            "mat4" => UniformKind::Mat4,
            other => return Err(UnknownUniformKind(other.to_string())),
        })
    }
}

/// A uniform value. Matrices are column-major.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat2(_) => UniformKind::Mat2,
            UniformValue::Mat3(_) => UniformKind::Mat3,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// Float components in declaration order; empty for `Int`.
    pub fn as_floats(&self) -> &[f32] {
        match self {
            UniformValue::Int(_) => &[],
            UniformValue::Float(v) => std::slice::from_ref(v),
            UniformValue::Vec2(v) => v,
            UniformValue::Vec3(v) => v,
            UniformValue::Vec4(v) | UniformValue::Mat2(v) => v,
            UniformValue::Mat3(v) => v,
            UniformValue::Mat4(v) => v,
        }
    }

    /// Reshapes this value for a slot of `kind`.
    ///
    /// Scalars convert between `int` and `float`; vectors and matrices accept
    /// any value with the same component count. Anything else is `None`.
    pub fn coerce(&self, kind: UniformKind) -> Option<UniformValue> {
        if self.kind() == kind {
            return Some(self.clone());
        }

        match (kind, self) {
            (UniformKind::Int, UniformValue::Float(v)) => return Some(UniformValue::Int(*v as i32)),
            (UniformKind::Float, UniformValue::Int(v)) => return Some(UniformValue::Float(*v as f32)),
            (UniformKind::Int | UniformKind::Float, _) => return None,
            _ => {}
        }

        let f = self.as_floats();
        if f.len() != kind.components() {
            return None;
        }
        Some(match kind {
            UniformKind::Vec2 => UniformValue::Vec2([f[0], f[1]]),
            UniformKind::Vec3 => UniformValue::Vec3([f[0], f[1], f[2]]),
            UniformKind::Vec4 => UniformValue::Vec4([f[0], f[1], f[2], f[3]]),
            UniformKind::Mat2 => UniformValue::Mat2([f[0], f[1], f[2], f[3]]),
            UniformKind::Mat3 => UniformValue::Mat3(f.try_into().ok()?),
            UniformKind::Mat4 => UniformValue::Mat4(f.try_into().ok()?),
            UniformKind::Int | UniformKind::Float => return None,
        })
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<[f32; 9]> for UniformValue {
    fn from(v: [f32; 9]) -> Self {
        UniformValue::Mat3(v)
    }
}

impl From<[f32; 16]> for UniformValue {
    fn from(v: [f32; 16]) -> Self {
        UniformValue::Mat4(v)
    }
}

// ── Fixed-function state ──────────────────────────────────────────────────

/// Fixed-function state applied once when a program context activates.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderState {
    /// Multisampled color target.
    pub antialias: bool,
    /// Additive blending: `src * src_alpha + dst`.
    pub additive_blend: bool,
    pub cull_back_faces: bool,
    pub depth_test: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            antialias: false,
            additive_blend: true,
            cull_back_faces: true,
            depth_test: false,
        }
    }
}

// ── Texture sampling ──────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Wrap {
    Repeat,
    ClampToEdge,
}

/// Texture filtering and addressing.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Sampling {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
}

impl Sampling {
    /// Linear filtering, clamped at the edges. Applied once an image loads.
    pub const LINEAR_CLAMP: Sampling = Sampling {
        min_filter: Filter::Linear,
        mag_filter: Filter::Linear,
        wrap_s: Wrap::ClampToEdge,
        wrap_t: Wrap::ClampToEdge,
    };
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            min_filter: Filter::Nearest,
            mag_filter: Filter::Linear,
            wrap_s: Wrap::Repeat,
            wrap_t: Wrap::Repeat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_from_str() {
        for kind in [
            UniformKind::Int,
            UniformKind::Float,
            UniformKind::Vec2,
            UniformKind::Vec3,
            UniformKind::Vec4,
            UniformKind::Mat2,
            UniformKind::Mat3,
            UniformKind::Mat4,
        ] {
            assert_eq!(kind.tag().parse::<UniformKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "vec5".parse::<UniformKind>().unwrap_err();
        assert_eq!(err, UnknownUniformKind("vec5".into()));
    }

    #[test]
    fn coerce_converts_scalars() {
        assert_eq!(UniformValue::Float(2.9).coerce(UniformKind::Int), Some(UniformValue::Int(2)));
        assert_eq!(UniformValue::Int(3).coerce(UniformKind::Float), Some(UniformValue::Float(3.0)));
    }

    #[test]
    fn coerce_reinterprets_same_component_count() {
        let v = UniformValue::Vec4([1.0, 0.0, 0.0, 1.0]);
        assert_eq!(v.coerce(UniformKind::Mat2), Some(UniformValue::Mat2([1.0, 0.0, 0.0, 1.0])));
    }

    #[test]
    fn coerce_rejects_shape_mismatch() {
        assert_eq!(UniformValue::Vec3([0.0; 3]).coerce(UniformKind::Vec4), None);
        assert_eq!(UniformValue::Vec2([0.0; 2]).coerce(UniformKind::Float), None);
        assert_eq!(UniformValue::Int(1).coerce(UniformKind::Mat4), None);
    }
}
