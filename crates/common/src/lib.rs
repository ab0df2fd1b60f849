//! Shared types for the lakeside engine crates.

mod error;
mod stage;
mod types;

pub use error::EngineError;
pub use stage::RenderStage;
pub use types::{
    ComponentId, GameObjectId, MeshHandle, TextureHandle, Transform, invert_pitch,
};

pub fn crate_info() -> &'static str {
    "lakeside-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }

    #[test]
    fn configuration_error_message() {
        let err = EngineError::configuration("water", "no main camera");
        assert_eq!(
            err.to_string(),
            "configuration error in water: no main camera"
        );
    }
}
