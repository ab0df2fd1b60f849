use glam::Vec4;
use lakeside_assets::AssetProvider;
use lakeside_common::{EngineError, MeshHandle, RenderStage, TextureHandle, Transform};
use lakeside_engine::render::{Material, MeshData, MirroredCamera, Pipeline};
use lakeside_engine::render::{RenderTextureDesc, Vertex};
use lakeside_engine::{Component, ComponentKey, Engines, RenderContext, Renderable, RenderingEngine};
use serde::{Deserialize, Serialize};

pub const WATER_SHADER: &str = "water/water";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterSettings {
    pub width: f32,
    pub height: f32,
    pub water_color: [f32; 4],
    /// Added to the move factor per second.
    pub wave_speed: f32,
    pub wave_strength: f32,
    pub refractive_power: f32,
    pub dudv_tiling: f32,
    pub dudv_map: String,
    pub normal_map: String,
    /// Size of the reflection and refraction targets.
    pub target_width: u32,
    pub target_height: u32,
}

impl Default for WaterSettings {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            water_color: [0.0, 0.3, 0.5, 1.0],
            wave_speed: 0.01,
            wave_strength: 0.02,
            refractive_power: 0.5,
            dudv_tiling: 6.0,
            dudv_map: "dudvMap.png".into(),
            normal_map: "matchingNormalMap.png".into(),
            target_width: 960,
            target_height: 540,
        }
    }
}

/// Clip plane keeping what lies above a surface at `surface_y`.
pub fn reflection_plane(surface_y: f32) -> Vec4 {
    Vec4::new(0.0, 1.0, 0.0, -(surface_y + 0.1))
}

/// Clip plane keeping what lies below a surface at `surface_y`.
pub fn refraction_plane(surface_y: f32) -> Vec4 {
    Vec4::new(0.0, -1.0, 0.0, surface_y + 0.5)
}

/// The flat quad drawn for a `width` by `height` surface.
pub fn water_quad(width: f32, height: f32) -> MeshData {
    MeshData::new(
        vec![
            Vertex::new([0.0, 0.0, 0.0], [1.0, 0.0]),
            Vertex::new([0.0, 0.0, height], [1.0, 1.0]),
            Vertex::new([width, 0.0, height], [0.0, 1.0]),
            Vertex::new([width, 0.0, 0.0], [0.0, 0.0]),
        ],
        vec![2, 0, 1, 3, 0, 2],
    )
}

/// Planar water rendered from a reflection and a refraction of the scene.
///
/// Every default pass re-renders both textures before the quad is drawn;
/// nothing is cached across frames. The surface sits at its owner's Y.
#[derive(Debug)]
pub struct WaterMesh {
    settings: WaterSettings,
    material: Material,
    mesh: MeshHandle,
    reflection: TextureHandle,
    refraction: TextureHandle,
    refraction_depth: TextureHandle,
    move_factor: f32,
}

impl WaterMesh {
    pub fn new(
        settings: WaterSettings,
        assets: &mut dyn AssetProvider,
        engine: &mut RenderingEngine,
    ) -> Self {
        let mesh = engine.upload_mesh(&water_quad(settings.width, settings.height));
        let (w, h) = (settings.target_width, settings.target_height);
        let reflection = engine.create_render_texture(&RenderTextureDesc::color(w, h));
        let refraction = engine.create_render_texture(&RenderTextureDesc::color(w, h));
        let refraction_depth = engine.create_render_texture(&RenderTextureDesc::depth(w, h));

        let mut material = Material::new(assets.shader(WATER_SHADER));
        material.set_main_texture(assets.texture(&settings.dudv_map));
        material.set_float("specularIntensity", 3.0);
        material.set_float("specularPower", 32.0);
        material.set_texture("normalMap", assets.texture(&settings.normal_map));
        material.set_texture("reflectionTexture", reflection);
        material.set_texture("refractionTexture", refraction);
        material.set_texture("refractionTextureDepth", refraction_depth);
        material.set_float("moveFactor", 0.0);
        material.set_float("waveStrength", settings.wave_strength);
        material.set_float("refractivePower", settings.refractive_power);
        material.set_float("tiling", settings.dudv_tiling);
        material.set_vector4("waterColor", Vec4::from(settings.water_color));

        Self {
            settings,
            material,
            mesh,
            reflection,
            refraction,
            refraction_depth,
            move_factor: 0.0,
        }
    }

    pub fn settings(&self) -> &WaterSettings {
        &self.settings
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn move_factor(&self) -> f32 {
        self.move_factor
    }

    pub fn reflection_texture(&self) -> TextureHandle {
        self.reflection
    }

    pub fn refraction_texture(&self) -> TextureHandle {
        self.refraction
    }

    pub fn refraction_depth_texture(&self) -> TextureHandle {
        self.refraction_depth
    }
}

impl Component for WaterMesh {
    fn add_to_engine(&self, key: ComponentKey, _transform: &Transform, engines: &mut Engines) {
        engines.rendering.add_to_engine(key);
    }

    fn as_renderable(&mut self) -> Option<&mut dyn Renderable> {
        Some(self)
    }
}

impl Renderable for WaterMesh {
    fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), EngineError> {
        if ctx.pass.stage.is_mirror_pass() || !ctx.supports(&self.material) {
            return Ok(());
        }
        let delta_time = ctx.pass.delta_time;
        let surface_y = ctx.transform.position.y;
        let label = ctx.pipeline.label();
        let Some(engine) = ctx.pipeline.as_rendering_engine() else {
            return Err(EngineError::configuration(
                "WaterMesh",
                format!("rendered by the {label} pipeline, which has no camera or clip planes"),
            ));
        };
        let Some(camera) = engine.main_camera() else {
            return Err(EngineError::configuration("WaterMesh", "no main camera registered"));
        };

        {
            let mut mirrored = MirroredCamera::new(ctx.scene, camera.object, surface_y)?;
            let mut clipped = engine.clip_plane_scope(reflection_plane(surface_y));
            clipped.render_object(&mut mirrored, self.reflection, delta_time, RenderStage::REFLECT, false);
        }
        {
            let mut clipped = engine.clip_plane_scope(refraction_plane(surface_y));
            clipped.render_object(ctx.scene, self.refraction, delta_time, RenderStage::REFRACT, false);
            clipped.render_object(
                ctx.scene,
                self.refraction_depth,
                delta_time,
                RenderStage::REFRACT,
                false,
            );
        }

        self.move_factor += self.settings.wave_speed * delta_time;
        self.material.set_float("moveFactor", self.move_factor);

        ctx.pipeline.backend_mut().set_blending(true);
        ctx.draw(self.mesh, &self.material);
        ctx.pipeline.backend_mut().set_blending(false);
        Ok(())
    }
}
