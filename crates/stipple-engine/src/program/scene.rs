use std::rc::Rc;

use crate::bindings::AttributeBinding;
use crate::camera::CameraParams;
use crate::device::{UniformKind, UniformValue, UnknownUniformKind};

/// A uniform declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDecl {
    pub name: String,
    pub kind: UniformKind,
    pub value: UniformValue,
}

impl UniformDecl {
    pub fn new(name: impl Into<String>, kind: UniformKind, value: impl Into<UniformValue>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }

    /// Declares a uniform from a type tag such as `"vec3"` or `"mat4"`.
    pub fn tagged(
        name: impl Into<String>,
        tag: &str,
        value: impl Into<UniformValue>,
    ) -> Result<Self, UnknownUniformKind> {
        Ok(Self::new(name, tag.parse()?, value))
    }
}

/// A vertex attribute declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl {
    pub name: String,
    /// Floats per vertex.
    pub size: u32,
    pub value: Rc<[f32]>,
    /// Whether this attribute decides how many points are drawn.
    pub main: bool,
}

impl AttributeDecl {
    pub fn new(name: impl Into<String>, value: impl Into<Rc<[f32]>>) -> Self {
        Self {
            name: name.into(),
            size: AttributeBinding::DEFAULT_SIZE,
            value: value.into(),
            main: false,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn main(mut self) -> Self {
        self.main = true;
        self
    }
}

/// A texture declaration. `None` keeps the transparent placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureDecl {
    pub source: Option<String>,
}

impl TextureDecl {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// One frame's declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub uniforms: Vec<UniformDecl>,
    pub attributes: Vec<AttributeDecl>,
    pub textures: Vec<TextureDecl>,
    pub camera: Option<CameraParams>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(mut self, decl: UniformDecl) -> Self {
        self.uniforms.push(decl);
        self
    }

    pub fn attribute(mut self, decl: AttributeDecl) -> Self {
        self.attributes.push(decl);
        self
    }

    pub fn texture(mut self, decl: TextureDecl) -> Self {
        self.textures.push(decl);
        self
    }

    pub fn camera(mut self, camera: CameraParams) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Replaces the value of a declared uniform. Returns `false` if no
    /// uniform with that name is declared.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> bool {
        match self.uniforms.iter_mut().find(|decl| decl.name == name) {
            Some(decl) => {
                decl.value = value.into();
                true
            }
            None => false,
        }
    }
}
