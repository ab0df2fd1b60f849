//! Asset collaborator: textures, shaders and heightmaps by name.
//!
//! The engine consumes assets through handles and never manages loading or
//! eviction itself. A failed lookup is surfaced once and cached as a degraded
//! state (placeholder texture, stage-less shader) instead of being retried
//! every frame.

mod heightmap;
mod shader;

pub use heightmap::Heightmap;
pub use shader::ShaderHandle;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use lakeside_common::TextureHandle;

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("heightmap {width}x{height} needs {} samples, got {samples}", .width * .height)]
    InvalidHeightmap {
        width: usize,
        height: usize,
        samples: usize,
    },
}

/// Narrow interface the engine uses to resolve assets.
pub trait AssetProvider {
    /// Resolve a texture by name. Unknown names yield [`TextureHandle::PLACEHOLDER`].
    fn texture(&mut self, name: &str) -> TextureHandle;

    /// Resolve a shader by name. Unknown names yield a shader declaring no stages.
    fn shader(&mut self, name: &str) -> ShaderHandle;

    /// Decode a heightmap image by name.
    fn heightmap(&mut self, name: &str) -> Result<Heightmap, AssetError>;
}

/// Name-indexed asset registry, optionally backed by a directory on disk.
///
/// Textures and shaders must be registered up front; heightmaps are looked up
/// among registered ones first and then decoded from `root/<name>`.
#[derive(Debug)]
pub struct AssetStore {
    root: Option<PathBuf>,
    textures: BTreeMap<String, TextureHandle>,
    shaders: BTreeMap<String, ShaderHandle>,
    heightmaps: BTreeMap<String, Heightmap>,
    missing: BTreeSet<String>,
    next_texture: u64,
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetStore {
    pub fn new() -> Self {
        Self {
            root: None,
            textures: BTreeMap::new(),
            shaders: BTreeMap::new(),
            heightmaps: BTreeMap::new(),
            missing: BTreeSet::new(),
            next_texture: 1,
        }
    }

    /// A store that decodes heightmaps from files under `root`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: Some(root.as_ref().to_path_buf()),
            ..Self::new()
        }
    }

    /// Register a texture name and return its handle. Idempotent per name.
    pub fn register_texture(&mut self, name: &str) -> TextureHandle {
        if let Some(handle) = self.textures.get(name) {
            return *handle;
        }
        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(name.to_string(), handle);
        self.missing.remove(name);
        handle
    }

    /// Register a shader with the stages it declares.
    pub fn register_shader<I, S>(&mut self, name: &str, stages: I) -> ShaderHandle
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let shader = ShaderHandle::new(name, stages);
        self.shaders.insert(name.to_string(), shader.clone());
        self.missing.remove(name);
        shader
    }

    pub fn register_heightmap(&mut self, name: &str, heightmap: Heightmap) {
        self.heightmaps.insert(name.to_string(), heightmap);
    }

    /// Names that failed to resolve so far.
    pub fn missing(&self) -> &BTreeSet<String> {
        &self.missing
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn report_missing(&mut self, kind: &str, name: &str) {
        if self.missing.insert(name.to_string()) {
            tracing::warn!(kind, asset = name, "asset not found, using placeholder");
        }
    }
}

impl AssetProvider for AssetStore {
    fn texture(&mut self, name: &str) -> TextureHandle {
        match self.textures.get(name) {
            Some(handle) => *handle,
            None => {
                self.report_missing("texture", name);
                TextureHandle::PLACEHOLDER
            }
        }
    }

    fn shader(&mut self, name: &str) -> ShaderHandle {
        match self.shaders.get(name) {
            Some(shader) => shader.clone(),
            None => {
                self.report_missing("shader", name);
                let shader = ShaderHandle::new(name, std::iter::empty::<&str>());
                self.shaders.insert(name.to_string(), shader.clone());
                shader
            }
        }
    }

    fn heightmap(&mut self, name: &str) -> Result<Heightmap, AssetError> {
        if let Some(map) = self.heightmaps.get(name) {
            return Ok(map.clone());
        }
        let Some(root) = &self.root else {
            return Err(AssetError::NotFound(name.to_string()));
        };
        let path = root.join(name);
        if !path.exists() {
            return Err(AssetError::NotFound(path.display().to_string()));
        }
        let map = Heightmap::load(&path)?;
        tracing::debug!(
            asset = name,
            width = map.width(),
            height = map.height(),
            "heightmap decoded"
        );
        self.heightmaps.insert(name.to_string(), map.clone());
        Ok(map)
    }
}

pub fn crate_info() -> &'static str {
    "lakeside-assets v0.1.0"
}
