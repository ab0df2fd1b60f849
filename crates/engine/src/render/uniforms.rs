use std::collections::BTreeMap;

use glam::Vec4;

/// Uniform name of the pipeline-wide clip plane.
pub const CLIP_PLANE: &str = "clipPlane";

/// The plane that disables clipping.
pub const NULL_PLANE: Vec4 = Vec4::ZERO;

/// Pipeline-wide uniforms consumed by every draw until changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uniforms {
    vectors: BTreeMap<String, Vec4>,
    floats: BTreeMap<String, f32>,
}

impl Uniforms {
    pub fn set_vector4(&mut self, name: &str, value: Vec4) {
        self.vectors.insert(name.to_string(), value);
    }

    pub fn vector4(&self, name: &str) -> Option<Vec4> {
        self.vectors.get(name).copied()
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    /// Current clip plane; the null plane when none is set.
    pub fn clip_plane(&self) -> Vec4 {
        self.vector4(CLIP_PLANE).unwrap_or(NULL_PLANE)
    }
}
