use glam::Vec3;
use lakeside_assets::{AssetProvider, Heightmap};
use lakeside_common::{EngineError, MeshHandle, Transform};
use lakeside_engine::render::{Material, MeshData, Vertex};
use lakeside_engine::{Component, ComponentKey, Engines, RenderContext, Renderable, RenderingEngine};
use lakeside_physics::{Physics, StaticMesh, StaticMeshId};
use serde::{Deserialize, Serialize};

pub const TERRAIN_SHADER: &str = "terrain/terrain";

/// Texture names bound by the terrain material: three diffuse/normal pairs
/// and the two masks blending them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainTextures {
    pub tex1: String,
    pub tex1_normal: String,
    pub tex2: String,
    pub tex2_normal: String,
    pub layer1: String,
    pub tex3: String,
    pub tex3_normal: String,
    pub layer2: String,
}

impl Default for TerrainTextures {
    fn default() -> Self {
        Self {
            tex1: "grass.png".into(),
            tex1_normal: "grass_normal.png".into(),
            tex2: "rock.png".into(),
            tex2_normal: "rock_normal.png".into(),
            layer1: "layer1.png".into(),
            tex3: "snow.png".into(),
            tex3_normal: "snow_normal.png".into(),
            layer2: "layer2.png".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    pub heightmap: String,
    /// World-space extent along X.
    pub width: f32,
    /// World-space extent along Z.
    pub height: f32,
    /// Multiplier applied to each `[0, 255]` sample. Not validated.
    pub strength: f32,
    pub textures: TerrainTextures,
    pub specular_intensity: f32,
    pub specular_power: f32,
    pub displacement_scale: f32,
    pub displacement_offset: f32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            heightmap: "heightmap.png".into(),
            width: 256.0,
            height: 256.0,
            strength: 0.1,
            textures: TerrainTextures::default(),
            specular_intensity: 0.5,
            specular_power: 32.0,
            displacement_scale: 0.0,
            displacement_offset: 0.0,
        }
    }
}

/// Render and collision data built from the same grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainGeometry {
    pub mesh: MeshData,
    pub collision: StaticMesh,
}

impl TerrainGeometry {
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }
}

fn grid_coordinate(index: usize, count: usize) -> f32 {
    if count > 1 {
        index as f32 / (count - 1) as f32
    } else {
        0.0
    }
}

/// Build the terrain grid for `heightmap`.
///
/// Vertex `(i, j)` lives at index `i * H + j`. Every cell with `i > 0` and
/// `j > 0` emits two triangles, `2 * (W - 1) * (H - 1)` in total. The
/// collision mesh carries the same positions and indices.
pub fn generate(heightmap: &Heightmap, width: f32, height: f32, strength: f32) -> TerrainGeometry {
    let (w, h) = (heightmap.width(), heightmap.height());
    let mut vertices = Vec::with_capacity(w * h);
    let mut indices = Vec::with_capacity(6 * w.saturating_sub(1) * h.saturating_sub(1));
    let index = |i: usize, j: usize| (i * h + j) as u32;

    for i in 0..w {
        for j in 0..h {
            let u = grid_coordinate(i, w);
            let v = grid_coordinate(j, h);
            let y = heightmap.sample(i, j) * strength;
            vertices.push(Vertex::new([u * width, y, v * height], [u, v]));

            if i == 0 || j == 0 {
                continue;
            }
            indices.extend_from_slice(&[
                index(i, j),
                index(i, j - 1),
                index(i - 1, j - 1),
                index(i - 1, j - 1),
                index(i - 1, j),
                index(i, j),
            ]);
        }
    }

    let collision = StaticMesh {
        vertices: vertices.iter().map(|v| Vec3::from(v.position)).collect(),
        indices: indices.clone(),
    };
    TerrainGeometry {
        mesh: MeshData::new(vertices, indices),
        collision,
    }
}

/// Heightmap-driven terrain whose collision surface always matches what is
/// drawn.
#[derive(Debug)]
pub struct TerrainMesh {
    settings: TerrainSettings,
    heightmap: Heightmap,
    material: Material,
    geometry: TerrainGeometry,
    mesh: Option<MeshHandle>,
    physics_mesh: Option<StaticMeshId>,
    error: Option<EngineError>,
}

impl TerrainMesh {
    /// Resolve the heightmap and textures, then generate the mesh and submit
    /// its collision surface.
    ///
    /// A missing heightmap is reported and yields an empty terrain with no
    /// collision surface.
    pub fn new(
        settings: TerrainSettings,
        assets: &mut dyn AssetProvider,
        physics: &mut dyn Physics,
        engine: &mut RenderingEngine,
    ) -> Self {
        let mut error = None;
        let heightmap = match assets.heightmap(&settings.heightmap) {
            Ok(map) => map,
            Err(err) => {
                let err = EngineError::configuration(
                    "TerrainMesh",
                    format!("heightmap {}: {err}", settings.heightmap),
                );
                tracing::error!(%err, "terrain built without a heightmap");
                error = Some(err);
                Heightmap::empty()
            }
        };
        let material = terrain_material(&settings, assets);
        let mut terrain = Self {
            settings,
            heightmap,
            material,
            geometry: TerrainGeometry::default(),
            mesh: None,
            physics_mesh: None,
            error,
        };
        terrain.regenerate(physics, engine);
        terrain
    }

    /// Rebuild the mesh from the current heightmap and resubmit the collision
    /// surface. Generating twice from the same heightmap yields the same mesh.
    pub fn regenerate(&mut self, physics: &mut dyn Physics, engine: &mut RenderingEngine) {
        let geometry = generate(
            &self.heightmap,
            self.settings.width,
            self.settings.height,
            self.settings.strength,
        );
        if geometry.is_empty() && !self.heightmap.is_empty() {
            let err = EngineError::geometry(
                "TerrainMesh",
                format!(
                    "{}x{} heightmap has no cells",
                    self.heightmap.width(),
                    self.heightmap.height()
                ),
            );
            tracing::warn!(%err, "terrain has zero triangles");
            self.error.get_or_insert(err);
        }

        if let Some(old) = self.physics_mesh.take() {
            physics.remove_static_mesh(old);
        }
        if let Some(old) = self.mesh.take() {
            engine.release_mesh(old);
        }
        if !geometry.is_empty() {
            let id = physics.submit_static_mesh(geometry.collision.clone());
            tracing::debug!(
                mesh = id.0,
                triangles = geometry.triangle_count(),
                "terrain collision submitted"
            );
            self.physics_mesh = Some(id);
            self.mesh = Some(engine.upload_mesh(&geometry.mesh));
        }
        self.geometry = geometry;
    }

    /// Swap in a new heightmap and regenerate.
    pub fn set_heightmap(
        &mut self,
        heightmap: Heightmap,
        physics: &mut dyn Physics,
        engine: &mut RenderingEngine,
    ) {
        self.heightmap = heightmap;
        self.error = None;
        self.regenerate(physics, engine);
    }

    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    pub fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    pub fn geometry(&self) -> &TerrainGeometry {
        &self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn physics_mesh(&self) -> Option<StaticMeshId> {
        self.physics_mesh
    }

    /// The error reported while building, if any.
    pub fn error(&self) -> Option<&EngineError> {
        self.error.as_ref()
    }
}

fn terrain_material(settings: &TerrainSettings, assets: &mut dyn AssetProvider) -> Material {
    let textures = &settings.textures;
    let mut material = Material::new(assets.shader(TERRAIN_SHADER));
    material.set_main_texture(assets.texture(&textures.tex1));
    material.set_float("specularIntensity", settings.specular_intensity);
    material.set_float("specularPower", settings.specular_power);
    for (slot, name) in [
        ("normalMap", &textures.tex1_normal),
        ("tex2", &textures.tex2),
        ("tex2Nrm", &textures.tex2_normal),
        ("layer1", &textures.layer1),
        ("tex3", &textures.tex3),
        ("tex3Nrm", &textures.tex3_normal),
        ("layer2", &textures.layer2),
    ] {
        material.set_texture(slot, assets.texture(name));
    }
    material.set_float("dispMapScale", settings.displacement_scale);
    material.set_float("dispMapBias", settings.displacement_offset);
    material
}

impl Component for TerrainMesh {
    fn add_to_engine(&self, key: ComponentKey, _transform: &Transform, engines: &mut Engines) {
        engines.rendering.add_to_engine(key);
    }

    fn as_renderable(&mut self) -> Option<&mut dyn Renderable> {
        Some(self)
    }
}

impl Renderable for TerrainMesh {
    fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), EngineError> {
        let Some(mesh) = self.mesh else {
            return Ok(());
        };
        if ctx.supports(&self.material) {
            ctx.draw(mesh, &self.material);
        }
        Ok(())
    }
}
