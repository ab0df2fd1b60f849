use std::collections::BTreeMap;

use glam::Vec4;
use lakeside_assets::ShaderHandle;
use lakeside_common::{RenderStage, TextureHandle};

/// Name of the main (diffuse) texture slot.
pub const MAIN_TEXTURE: &str = "diffuse";

/// A shader plus the named inputs bound when drawing with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    shader: ShaderHandle,
    textures: BTreeMap<String, TextureHandle>,
    floats: BTreeMap<String, f32>,
    vectors: BTreeMap<String, Vec4>,
}

impl Material {
    pub fn new(shader: ShaderHandle) -> Self {
        Self {
            shader,
            textures: BTreeMap::new(),
            floats: BTreeMap::new(),
            vectors: BTreeMap::new(),
        }
    }

    pub fn shader(&self) -> &ShaderHandle {
        &self.shader
    }

    /// Whether the bound shader declares `shader_type`.
    pub fn supports(&self, shader_type: &RenderStage) -> bool {
        self.shader.supports(shader_type)
    }

    pub fn set_main_texture(&mut self, texture: TextureHandle) {
        self.set_texture(MAIN_TEXTURE, texture);
    }

    pub fn set_texture(&mut self, name: &str, texture: TextureHandle) {
        self.textures.insert(name.to_string(), texture);
    }

    pub fn texture(&self, name: &str) -> Option<TextureHandle> {
        self.textures.get(name).copied()
    }

    pub fn textures(&self) -> &BTreeMap<String, TextureHandle> {
        &self.textures
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    /// Unset floats read as 0.
    pub fn float(&self, name: &str) -> f32 {
        self.floats.get(name).copied().unwrap_or(0.0)
    }

    pub fn floats(&self) -> &BTreeMap<String, f32> {
        &self.floats
    }

    pub fn set_vector4(&mut self, name: &str, value: Vec4) {
        self.vectors.insert(name.to_string(), value);
    }

    pub fn vector4(&self, name: &str) -> Option<Vec4> {
        self.vectors.get(name).copied()
    }
}
