use lakeside_common::{ComponentId, GameObjectId, Transform};

use crate::component::{Component, ComponentKey};
use crate::render::Engines;

struct ComponentSlot {
    id: ComponentId,
    /// `None` while the component is borrowed out for rendering.
    component: Option<Box<dyn Component>>,
}

/// Composition root: a transform plus an ordered list of components.
///
/// Components are updated and registered in attach order. Dropping a game
/// object drops all of its components.
pub struct GameObject {
    id: GameObjectId,
    name: String,
    transform: Transform,
    slots: Vec<ComponentSlot>,
    next_component: u32,
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("transform", &self.transform)
            .field("components", &self.slots.len())
            .finish()
    }
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GameObjectId::new(),
            name: name.into(),
            transform: Transform::default(),
            slots: Vec::new(),
            next_component: 0,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder form of [`GameObject::add_component`].
    pub fn with_component(mut self, component: impl Component) -> Self {
        self.add_component(component);
        self
    }

    pub fn id(&self) -> GameObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Attach a component and run its `init` hook.
    pub fn add_component(&mut self, component: impl Component) -> ComponentId {
        self.add_boxed(Box::new(component))
    }

    pub fn add_boxed(&mut self, mut component: Box<dyn Component>) -> ComponentId {
        let id = ComponentId(self.next_component);
        self.next_component += 1;
        let key = ComponentKey {
            object: self.id,
            component: id,
        };
        component.init(key, &mut self.transform);
        tracing::trace!(
            object = %self.id,
            component = component.type_name(),
            "component attached"
        );
        self.slots.push(ComponentSlot {
            id,
            component: Some(component),
        });
        id
    }

    /// Detach and destroy a component. Returns false if it was not attached.
    pub fn remove_component(&mut self, id: ComponentId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != id);
        before != self.slots.len()
    }

    pub fn component_count(&self) -> usize {
        self.slots.len()
    }

    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.slots.iter().map(|slot| slot.id)
    }

    /// First attached component of type `T`.
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.slots.iter().find_map(|slot| {
            slot.component
                .as_deref()
                .and_then(|c| c.as_any().downcast_ref::<T>())
        })
    }

    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.slots.iter_mut().find_map(|slot| {
            slot.component
                .as_deref_mut()
                .and_then(|c| c.as_any_mut().downcast_mut::<T>())
        })
    }

    /// Update every component in attach order.
    pub fn update(&mut self, delta_time: f32) {
        for slot in &mut self.slots {
            if let Some(component) = slot.component.as_mut() {
                let key = ComponentKey {
                    object: self.id,
                    component: slot.id,
                };
                component.update(key, &mut self.transform, delta_time);
            }
        }
    }

    /// Register every component with the pipelines for this frame.
    pub fn add_to_engine(&self, engines: &mut Engines) {
        for slot in &self.slots {
            if let Some(component) = slot.component.as_ref() {
                let key = ComponentKey {
                    object: self.id,
                    component: slot.id,
                };
                component.add_to_engine(key, &self.transform, engines);
            }
        }
    }

    pub(crate) fn take_component(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .and_then(|slot| slot.component.take())
    }

    pub(crate) fn restore_component(&mut self, id: ComponentId, component: Box<dyn Component>) -> bool {
        match self.slots.iter_mut().find(|slot| slot.id == id) {
            Some(slot) if slot.component.is_none() => {
                slot.component = Some(component);
                true
            }
            _ => false,
        }
    }
}
