use glam::Vec3;
use lakeside_common::Transform;
use lakeside_engine::render::DirectionalLightState;
use lakeside_engine::{Component, ComponentKey, Engines};

/// A light shining along its owner's forward vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 0.5,
        }
    }
}

impl Component for DirectionalLight {
    fn add_to_engine(&self, _key: ComponentKey, transform: &Transform, engines: &mut Engines) {
        engines.rendering.add_light(DirectionalLightState {
            direction: transform.forward(),
            color: self.color,
            intensity: self.intensity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use lakeside_engine::render::{Pipeline, RecordingBackend};
    use lakeside_engine::{EngineConfig, GameObject, Scene};

    #[test]
    fn direction_reaches_uniforms() {
        let mut engines = Engines::new(Box::new(RecordingBackend::new()), EngineConfig::default());
        let mut scene = Scene::new();
        let rotation = Quat::from_rotation_x(-65f32.to_radians());
        scene.spawn(
            GameObject::new("sun")
                .with_transform(Transform {
                    rotation,
                    ..Transform::default()
                })
                .with_component(DirectionalLight::default()),
        );
        scene.add_to_engine(&mut engines);
        engines.render_frame(&mut scene, 0.016);

        let uniforms = engines.rendering.uniforms();
        let direction = uniforms.vector4("directionalLight.direction").unwrap();
        assert_eq!(direction.truncate(), rotation * Vec3::NEG_Z);
        assert_eq!(uniforms.float("directionalLight.intensity"), Some(0.5));
    }
}
