use std::path::{Path, PathBuf};

use lakeside_components::{Perspective, TerrainSettings, WaterSettings};
use lakeside_engine::EngineConfig;
use serde::{Deserialize, Serialize};

/// Everything needed to build the demo scene, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub engine: EngineConfig,
    pub terrain: TerrainSettings,
    pub water: WaterSettings,
    pub camera: Perspective,
    pub camera_position: [f32; 3],
    pub water_level: f32,
    /// Directory heightmaps are decoded from. Without one, the demo
    /// generates its heightmap.
    pub asset_root: Option<PathBuf>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            terrain: TerrainSettings::default(),
            water: WaterSettings {
                width: 256.0,
                height: 256.0,
                ..WaterSettings::default()
            },
            camera: Perspective::default(),
            camera_position: [128.0, 40.0, 300.0],
            water_level: 8.0,
            asset_root: None,
        }
    }
}

impl SceneConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)
            .map_err(|err| anyhow::anyhow!("{}: {err}", path.display()))?;
        Ok(config)
    }
}
