//! Concrete components built on the engine: terrain, water, GUI text,
//! camera and directional light.

mod camera;
mod gui_text;
mod light;
mod terrain;
mod water;

pub use camera::{Camera, Perspective};
pub use gui_text::{FONT_SHADER, FontType, GuiText, TextLayout, layout_text};
pub use light::DirectionalLight;
pub use terrain::{
    TERRAIN_SHADER, TerrainGeometry, TerrainMesh, TerrainSettings, TerrainTextures, generate,
};
pub use water::{
    WATER_SHADER, WaterMesh, WaterSettings, reflection_plane, refraction_plane, water_quad,
};

pub fn crate_info() -> &'static str {
    "lakeside-components v0.1.0"
}
