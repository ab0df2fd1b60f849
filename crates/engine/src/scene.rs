use std::collections::BTreeMap;

use lakeside_common::{GameObjectId, Transform};

use crate::component::{Component, ComponentKey};
use crate::game_object::GameObject;
use crate::render::Engines;

/// Arena of game objects.
///
/// Objects are owned here and addressed by [`GameObjectId`]; components refer
/// to their owner by id, never by pointer. Iteration follows spawn order.
#[derive(Debug, Default)]
pub struct Scene {
    objects: BTreeMap<GameObjectId, GameObject>,
    order: Vec<GameObjectId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a game object. Returns its id.
    pub fn spawn(&mut self, object: GameObject) -> GameObjectId {
        let id = object.id();
        tracing::debug!(object = %id, name = object.name(), "game object spawned");
        if self.objects.insert(id, object).is_none() {
            self.order.push(id);
        }
        id
    }

    /// Remove a game object, destroying all of its components.
    pub fn despawn(&mut self, id: GameObjectId) -> bool {
        let removed = self.objects.remove(&id).is_some();
        if removed {
            self.order.retain(|o| *o != id);
            tracing::debug!(object = %id, "game object despawned");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: GameObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    pub fn transform(&self, id: GameObjectId) -> Option<&Transform> {
        self.objects.get(&id).map(GameObject::transform)
    }

    pub fn transform_mut(&mut self, id: GameObjectId) -> Option<&mut Transform> {
        self.objects.get_mut(&id).map(GameObject::transform_mut)
    }

    pub fn component<T: Component>(&self, id: GameObjectId) -> Option<&T> {
        self.objects.get(&id).and_then(GameObject::component::<T>)
    }

    pub fn component_mut<T: Component>(&mut self, id: GameObjectId) -> Option<&mut T> {
        self.objects
            .get_mut(&id)
            .and_then(GameObject::component_mut::<T>)
    }

    /// Objects in spawn order.
    pub fn objects(&self) -> impl Iterator<Item = &GameObject> + '_ {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Update every object in spawn order.
    pub fn update_all(&mut self, delta_time: f32) {
        for id in &self.order {
            if let Some(object) = self.objects.get_mut(id) {
                object.update(delta_time);
            }
        }
    }

    /// Register every object's components for the current frame.
    pub fn add_to_engine(&self, engines: &mut Engines) {
        for object in self.objects() {
            object.add_to_engine(engines);
        }
    }

    /// Borrow a component out of its slot, together with its owner's transform.
    ///
    /// While taken, the component is invisible to lookups and nested passes.
    pub(crate) fn take_component(
        &mut self,
        key: ComponentKey,
    ) -> Option<(Box<dyn Component>, Transform)> {
        let object = self.objects.get_mut(&key.object)?;
        let component = object.take_component(key.component)?;
        Some((component, *object.transform()))
    }

    /// Put a taken component back. If its owner was despawned meanwhile the
    /// component is dropped.
    pub(crate) fn restore_component(&mut self, key: ComponentKey, component: Box<dyn Component>) {
        let restored = self
            .objects
            .get_mut(&key.object)
            .is_some_and(|object| object.restore_component(key.component, component));
        if !restored {
            tracing::debug!(object = %key.object, "owner gone, component dropped after render");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    struct Mover(Vec3);

    impl Component for Mover {
        fn update(&mut self, _key: ComponentKey, transform: &mut Transform, delta_time: f32) {
            transform.position += self.0 * delta_time;
        }
    }

    #[test]
    fn spawn_and_despawn() {
        let mut scene = Scene::new();
        let id = scene.spawn(GameObject::new("a"));
        assert_eq!(scene.len(), 1);
        assert!(scene.get(id).is_some());
        assert!(scene.despawn(id));
        assert!(!scene.despawn(id));
        assert!(scene.is_empty());
    }

    #[test]
    fn objects_iterate_in_spawn_order() {
        let mut scene = Scene::new();
        let names = ["camera", "light", "terrain", "water"];
        for name in names {
            scene.spawn(GameObject::new(name));
        }
        let order: Vec<&str> = scene.objects().map(GameObject::name).collect();
        assert_eq!(order, names);
    }

    #[test]
    fn update_all_moves_objects() {
        let mut scene = Scene::new();
        let id = scene.spawn(GameObject::new("mover").with_component(Mover(Vec3::Y)));
        scene.update_all(2.0);
        assert_eq!(scene.transform(id).unwrap().position, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn restore_after_despawn_drops_component() {
        let mut scene = Scene::new();
        let mut object = GameObject::new("mover");
        let component = object.add_component(Mover(Vec3::X));
        let id = scene.spawn(object);
        let key = ComponentKey { object: id, component };
        let (taken, transform) = scene.take_component(key).unwrap();
        assert_eq!(transform, Transform::default());
        scene.despawn(id);
        scene.restore_component(key, taken);
        assert!(scene.get(id).is_none());
    }
}
