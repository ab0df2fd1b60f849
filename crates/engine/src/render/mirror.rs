use std::ops::{Deref, DerefMut};

use lakeside_common::{EngineError, GameObjectId, Transform, invert_pitch};

use crate::scene::Scene;

/// A camera mirrored across the horizontal plane `y = surface_y`.
///
/// While the guard lives the camera sits `2 * (y - surface_y)` lower with its
/// pitch inverted. Dropping the guard writes the saved transform back, so the
/// camera is restored exactly on every exit path.
pub struct MirroredCamera<'a> {
    scene: &'a mut Scene,
    camera: GameObjectId,
    saved: Transform,
}

impl<'a> MirroredCamera<'a> {
    pub fn new(scene: &'a mut Scene, camera: GameObjectId, surface_y: f32) -> Result<Self, EngineError> {
        let Some(transform) = scene.transform_mut(camera) else {
            return Err(EngineError::configuration(
                "MirroredCamera",
                format!("camera object {camera} is not in the scene"),
            ));
        };
        let saved = *transform;
        transform.position.y -= 2.0 * (saved.position.y - surface_y);
        transform.rotation = invert_pitch(saved.rotation);
        Ok(Self {
            scene,
            camera,
            saved,
        })
    }

    /// The camera transform from before mirroring.
    pub fn saved(&self) -> &Transform {
        &self.saved
    }
}

impl Deref for MirroredCamera<'_> {
    type Target = Scene;

    fn deref(&self) -> &Scene {
        self.scene
    }
}

impl DerefMut for MirroredCamera<'_> {
    fn deref_mut(&mut self) -> &mut Scene {
        self.scene
    }
}

impl Drop for MirroredCamera<'_> {
    fn drop(&mut self) {
        if let Some(transform) = self.scene.transform_mut(self.camera) {
            *transform = self.saved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_object::GameObject;
    use glam::{Quat, Vec3};

    fn camera_scene(position: Vec3, pitch: f32) -> (Scene, GameObjectId) {
        let mut scene = Scene::new();
        let transform = Transform {
            position,
            rotation: Quat::from_rotation_x(pitch),
            scale: Vec3::ONE,
        };
        let id = scene.spawn(GameObject::new("camera").with_transform(transform));
        (scene, id)
    }

    #[test]
    fn mirrors_and_restores() {
        let (mut scene, id) = camera_scene(Vec3::new(3.0, 10.0, -2.0), -0.4);
        let before = *scene.transform(id).unwrap();
        {
            let mirrored = MirroredCamera::new(&mut scene, id, 0.0).unwrap();
            let during = mirrored.transform(id).unwrap();
            assert_eq!(during.position, Vec3::new(3.0, -10.0, -2.0));
            assert!((during.pitch() - 0.4).abs() < 1e-5);
        }
        assert_eq!(*scene.transform(id).unwrap(), before);
    }

    #[test]
    fn mirrors_around_raised_surface() {
        let (mut scene, id) = camera_scene(Vec3::new(0.0, 7.0, 0.0), 0.0);
        let mirrored = MirroredCamera::new(&mut scene, id, 2.0).unwrap();
        assert_eq!(mirrored.transform(id).unwrap().position.y, -3.0);
    }

    #[test]
    fn missing_camera_is_configuration_error() {
        let mut scene = Scene::new();
        let err = MirroredCamera::new(&mut scene, GameObjectId::new(), 0.0).err().unwrap();
        assert!(matches!(err, EngineError::Configuration { .. }));
    }
}
