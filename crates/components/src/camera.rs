use glam::Mat4;
use lakeside_common::Transform;
use lakeside_engine::render::CameraBinding;
use lakeside_engine::{Component, ComponentKey, Engines};
use serde::{Deserialize, Serialize};

/// Perspective parameters of a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Perspective {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Perspective {
    fn default() -> Self {
        Self {
            fov_y: 70.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Perspective {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }
}

/// Makes its owner the main camera for every frame it registers.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    perspective: Perspective,
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(Perspective::default())
    }
}

impl Camera {
    pub fn perspective(perspective: Perspective) -> Self {
        Self {
            perspective,
            projection: perspective.matrix(),
        }
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Follow a framebuffer resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.perspective.aspect = aspect;
        self.projection = self.perspective.matrix();
    }
}

impl Component for Camera {
    fn add_to_engine(&self, key: ComponentKey, _transform: &Transform, engines: &mut Engines) {
        engines.rendering.set_main_camera(CameraBinding {
            object: key.object,
            projection: self.projection,
        });
    }
}
