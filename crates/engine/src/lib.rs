//! Scene composition and the multi-pass rendering pipeline.
//!
//! Game objects own their components; the [`Scene`] owns the game objects.
//! Every frame, components re-register with the pipelines through
//! [`Component::add_to_engine`], and the pipelines draw only what registered
//! for that frame.
//!
//! # Invariants
//! - A component belongs to exactly one game object.
//! - Exactly one render target is bound at a time; nested passes restore the
//!   previous target when they end.
//! - The clip plane is the null plane outside of a clipped pass.

mod component;
mod config;
mod game_object;
pub mod render;
mod scene;

pub use component::{AsAny, Component, ComponentKey, Renderable};
pub use config::{ConfigError, EngineConfig};
pub use game_object::GameObject;
pub use render::{Engines, FrameStats, Pipeline, RenderContext, RenderingEngine};
pub use scene::Scene;

pub fn crate_info() -> &'static str {
    "lakeside-engine v0.1.0"
}
