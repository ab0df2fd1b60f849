use std::any::Any;

use lakeside_common::{ComponentId, EngineError, GameObjectId, Transform};

use crate::render::{Engines, RenderContext};

/// Addresses one component inside a scene for the duration of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey {
    pub object: GameObjectId,
    pub component: ComponentId,
}

/// Downcasting support, implemented for every `'static` type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of behaviour attached to exactly one [`GameObject`](crate::GameObject).
///
/// Every hook has a no-op default; a component overrides only the capabilities
/// it has. Rendering is a separate capability exposed through
/// [`Component::as_renderable`], so the pipeline dispatches on "is renderable"
/// rather than on a type hierarchy.
///
/// A component is moved into its owner when attached, so it cannot belong to
/// two game objects; [`Component::init`] runs once, right after attachment,
/// and receives the key that names the component and its owner from then on.
pub trait Component: AsAny + 'static {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Called once after the component is attached to its owner.
    fn init(&mut self, _key: ComponentKey, _transform: &mut Transform) {}

    /// Advance component-local state. May mutate the owner's transform.
    fn update(&mut self, _key: ComponentKey, _transform: &mut Transform, _delta_time: f32) {}

    /// Register with the pipelines for the current frame only.
    fn add_to_engine(&self, _key: ComponentKey, _transform: &Transform, _engines: &mut Engines) {}

    fn as_renderable(&mut self) -> Option<&mut dyn Renderable> {
        None
    }
}

/// Render capability: issue draw calls for the pass described by `ctx`.
///
/// Implementations must return without side effects when their shader does not
/// declare the pass's shader type (see [`RenderContext::supports`]).
pub trait Renderable {
    fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), EngineError>;
}
