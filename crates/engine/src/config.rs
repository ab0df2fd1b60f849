use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors from loading or saving configuration files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window framebuffer width in pixels.
    pub width: u32,
    /// Window framebuffer height in pixels.
    pub height: u32,
    pub clear_color: [f32; 4],
    /// Panic in debug builds when a pass leaks a clip plane or unbalances the
    /// target stack. The pipeline force-resets either way.
    pub strict_invariants: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            strict_invariants: cfg!(debug_assertions),
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let config = EngineConfig {
            width: 640,
            height: 480,
            ..EngineConfig::default()
        };
        config.save(tmp.path()).unwrap();
        assert_eq!(EngineConfig::load(tmp.path()).unwrap(), config);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "width": 800 }"#).unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 1080);
    }
}
