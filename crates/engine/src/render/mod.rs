//! The rendering pipelines and their collaborators.

mod backend;
mod context;
mod gui;
mod material;
mod mesh;
mod mirror;
mod pipeline;
mod recording;
mod uniforms;

pub use backend::{
    Attachment, DrawCall, GraphicsBackend, PixelFormat, RenderTarget, RenderTextureDesc,
    TextureFilter,
};
pub use context::{CameraBinding, PassInfo, Pipeline, RenderContext};
pub use gui::GuiRenderingEngine;
pub use material::{MAIN_TEXTURE, Material};
pub use mesh::{MeshData, Vertex};
pub use mirror::MirroredCamera;
pub use pipeline::{ClipPlaneScope, DirectionalLightState, FrameStats, RenderingEngine, TargetScope};
pub use recording::{BackendCommand, CommandLog, DrawRecord, RecordingBackend};
pub use uniforms::{CLIP_PLANE, NULL_PLANE, Uniforms};

use crate::config::EngineConfig;
use crate::scene::Scene;

/// Owner of both pipelines; components register into whichever they draw in.
pub struct Engines {
    pub rendering: RenderingEngine,
    pub gui: GuiRenderingEngine,
}

impl Engines {
    pub fn new(backend: Box<dyn GraphicsBackend>, config: EngineConfig) -> Self {
        Self {
            rendering: RenderingEngine::new(backend, config),
            gui: GuiRenderingEngine::new(),
        }
    }

    /// Render the scene pipeline, then the GUI overlay on top of it.
    pub fn render_frame(&mut self, scene: &mut Scene, delta_time: f32) -> FrameStats {
        let mut stats = self.rendering.render_frame(scene, delta_time);
        stats.gui_draw_calls = self
            .gui
            .render_frame(self.rendering.backend_mut(), scene, delta_time);
        stats
    }

    pub fn present(&mut self) {
        self.rendering.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentKey, Renderable};
    use crate::game_object::GameObject;
    use glam::Vec4;
    use lakeside_assets::ShaderHandle;
    use lakeside_common::{EngineError, MeshHandle, RenderStage, TextureHandle, Transform};

    struct Quad {
        material: Material,
        gui: bool,
    }

    impl Quad {
        fn new(stages: &[&str]) -> Self {
            Self {
                material: Material::new(ShaderHandle::new("basic", stages)),
                gui: false,
            }
        }
    }

    impl Component for Quad {
        fn add_to_engine(&self, key: ComponentKey, _transform: &Transform, engines: &mut Engines) {
            if self.gui {
                engines.gui.add_to_engine(key);
            } else {
                engines.rendering.add_to_engine(key);
            }
        }

        fn as_renderable(&mut self) -> Option<&mut dyn Renderable> {
            Some(self)
        }
    }

    impl Renderable for Quad {
        fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), EngineError> {
            if ctx.supports(&self.material) {
                ctx.draw(MeshHandle(1), &self.material);
            }
            Ok(())
        }
    }

    /// Renders the scene into a texture before drawing itself.
    struct Probe {
        material: Material,
        target: TextureHandle,
        stage: RenderStage,
    }

    impl Component for Probe {
        fn add_to_engine(&self, key: ComponentKey, _transform: &Transform, engines: &mut Engines) {
            engines.rendering.add_to_engine(key);
        }

        fn as_renderable(&mut self) -> Option<&mut dyn Renderable> {
            Some(self)
        }
    }

    impl Renderable for Probe {
        fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), EngineError> {
            if ctx.pass.stage.is_mirror_pass() {
                return Ok(());
            }
            let delta_time = ctx.pass.delta_time;
            let Some(engine) = ctx.pipeline.as_rendering_engine() else {
                return Err(EngineError::configuration("Probe", "needs the scene pipeline"));
            };
            engine.render_object(ctx.scene, self.target, delta_time, self.stage.clone(), false);
            if ctx.supports(&self.material) {
                ctx.draw(MeshHandle(2), &self.material);
            }
            Ok(())
        }
    }

    /// Leaves an extra target bound whenever it is drawn into a mirror pass.
    struct LeakyTarget {
        target: TextureHandle,
    }

    impl Component for LeakyTarget {
        fn add_to_engine(&self, key: ComponentKey, _transform: &Transform, engines: &mut Engines) {
            engines.rendering.add_to_engine(key);
        }

        fn as_renderable(&mut self) -> Option<&mut dyn Renderable> {
            Some(self)
        }
    }

    impl Renderable for LeakyTarget {
        fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), EngineError> {
            if !ctx.pass.stage.is_mirror_pass() {
                return Ok(());
            }
            if let Some(engine) = ctx.pipeline.as_rendering_engine() {
                std::mem::forget(engine.push_target(RenderTarget::Texture(self.target)));
            }
            Ok(())
        }
    }

    fn engines() -> (Engines, CommandLog) {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let config = EngineConfig {
            strict_invariants: false,
            ..EngineConfig::default()
        };
        (Engines::new(Box::new(backend), config), log)
    }

    fn frame(engines: &mut Engines, scene: &mut Scene) -> FrameStats {
        scene.add_to_engine(engines);
        engines.render_frame(scene, 0.016)
    }

    #[test]
    fn default_stage_draws_into_window() {
        let (mut engines, log) = engines();
        let mut scene = Scene::new();
        scene.spawn(GameObject::new("quad").with_component(Quad::new(&["default"])));

        let stats = frame(&mut engines, &mut scene);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.draws_in(&RenderStage::DEFAULT), 1);
        let draws = log.draws();
        assert_eq!(draws[0].target, RenderTarget::Window);
        assert_eq!(draws[0].clip_plane, NULL_PLANE);
    }

    #[test]
    fn unsupported_stage_contributes_nothing() {
        for stage in ["reflect", "refract", "shadow", "Custom"] {
            let (mut engines, log) = engines();
            let mut scene = Scene::new();
            scene.spawn(GameObject::new("quad").with_component(Quad::new(&["default"])));
            let target = engines
                .rendering
                .create_render_texture(&RenderTextureDesc::color(64, 64));
            scene.add_to_engine(&mut engines);

            log.clear();
            engines
                .rendering
                .render_object(&mut scene, target, 0.016, RenderStage::new(stage), false);
            assert!(log.draws().is_empty(), "stage {stage} drew");
        }
    }

    #[test]
    fn default_shader_type_in_nested_pass() {
        let (mut engines, log) = engines();
        let mut scene = Scene::new();
        scene.spawn(GameObject::new("quad").with_component(Quad::new(&["default"])));
        let target = engines
            .rendering
            .create_render_texture(&RenderTextureDesc::color(64, 64));
        scene.add_to_engine(&mut engines);

        engines
            .rendering
            .render_object(&mut scene, target, 0.016, RenderStage::REFLECT, true);
        let draws = log.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].stage, "reflect");
        assert_eq!(draws[0].shader_type, "default");
        assert_eq!(draws[0].target, RenderTarget::Texture(target));
    }

    #[test]
    fn nested_targets_restore_in_lifo_order() {
        let (mut engines, log) = engines();
        let mut scene = Scene::new();
        scene.spawn(GameObject::new("quad").with_component(Quad::new(&["default", "reflect"])));
        let outer = engines
            .rendering
            .create_render_texture(&RenderTextureDesc::color(32, 32));
        let inner = engines
            .rendering
            .create_render_texture(&RenderTextureDesc::depth(32, 32));
        scene.add_to_engine(&mut engines);

        {
            let mut scope = engines.rendering.push_target(RenderTarget::Texture(outer));
            assert_eq!(scope.current_target(), RenderTarget::Texture(outer));
            for _ in 0..3 {
                scope.render_object(&mut scene, inner, 0.016, RenderStage::REFLECT, false);
                assert_eq!(scope.current_target(), RenderTarget::Texture(outer));
                assert_eq!(scope.target_depth(), 1);
            }
        }
        assert_eq!(engines.rendering.current_target(), RenderTarget::Window);
        assert_eq!(engines.rendering.target_depth(), 0);
        assert_eq!(log.binds().last(), Some(&RenderTarget::Window));
        assert!(
            log.draws()
                .iter()
                .all(|draw| draw.target == RenderTarget::Texture(inner))
        );
    }

    #[test]
    fn nested_pass_skips_the_component_that_started_it() {
        let (mut engines, log) = engines();
        let mut scene = Scene::new();
        let target = engines
            .rendering
            .create_render_texture(&RenderTextureDesc::color(64, 64));
        scene.spawn(GameObject::new("quad").with_component(Quad::new(&["default", "reflect"])));
        scene.spawn(GameObject::new("probe").with_component(Probe {
            material: Material::new(ShaderHandle::new("probe", ["default", "reflect"])),
            target,
            stage: RenderStage::REFLECT,
        }));

        let stats = frame(&mut engines, &mut scene);
        assert_eq!(stats.nested_passes, 1);
        assert_eq!(stats.draws_in(&RenderStage::REFLECT), 1);
        assert_eq!(stats.draws_in(&RenderStage::DEFAULT), 2);
        let reflect: Vec<_> = log.draws().into_iter().filter(|d| d.stage == "reflect").collect();
        assert_eq!(reflect[0].mesh, MeshHandle(1));
        assert_eq!(engines.rendering.current_target(), RenderTarget::Window);
    }

    #[test]
    fn clip_plane_scope_resets_on_drop() {
        let (mut engines, _log) = engines();
        let plane = Vec4::new(0.0, 1.0, 0.0, -0.1);
        {
            let scope = engines.rendering.clip_plane_scope(plane);
            assert_eq!(scope.uniforms().clip_plane(), plane);
        }
        assert_eq!(engines.rendering.uniforms().clip_plane(), NULL_PLANE);
    }

    #[test]
    fn leaked_clip_plane_is_force_reset() {
        let (mut engines, _log) = engines();
        let mut scene = Scene::new();
        engines
            .rendering
            .set_vector4(CLIP_PLANE, Vec4::new(0.0, -1.0, 0.0, 0.5));

        let stats = engines.render_frame(&mut scene, 0.016);
        assert_eq!(stats.invariant_violations, 1);
        assert_eq!(engines.rendering.uniforms().clip_plane(), NULL_PLANE);
    }

    #[test]
    fn unbalanced_nested_target_is_counted() {
        let (mut engines, _log) = engines();
        let mut scene = Scene::new();
        let outer = engines
            .rendering
            .create_render_texture(&RenderTextureDesc::color(8, 8));
        let inner = engines
            .rendering
            .create_render_texture(&RenderTextureDesc::color(8, 8));
        scene.spawn(GameObject::new("leaky").with_component(LeakyTarget { target: inner }));
        scene.spawn(GameObject::new("probe").with_component(Probe {
            material: Material::new(ShaderHandle::new("probe", ["default"])),
            target: outer,
            stage: RenderStage::REFLECT,
        }));

        let stats = frame(&mut engines, &mut scene);
        assert_eq!(stats.nested_passes, 1);
        assert_eq!(stats.invariant_violations, 1);
        assert_eq!(engines.rendering.target_depth(), 0);
        assert_eq!(engines.rendering.current_target(), RenderTarget::Window);
    }

    #[test]
    fn light_uniforms_go_dark_without_a_light() {
        let (mut engines, _log) = engines();
        let mut scene = Scene::new();
        engines.rendering.add_light(DirectionalLightState {
            direction: glam::Vec3::new(0.0, -1.0, 1.0),
            color: glam::Vec3::ONE,
            intensity: 0.7,
        });
        engines.render_frame(&mut scene, 0.016);
        let uniforms = engines.rendering.uniforms();
        assert_eq!(uniforms.float("directionalLight.intensity"), Some(0.7));
        assert_eq!(uniforms.vector4("directionalLight.color"), Some(Vec4::ONE));

        engines.render_frame(&mut scene, 0.016);
        let uniforms = engines.rendering.uniforms();
        assert_eq!(uniforms.float("directionalLight.intensity"), Some(0.0));
        assert_eq!(
            uniforms.vector4("directionalLight.color"),
            Some(Vec4::new(0.0, 0.0, 0.0, 1.0))
        );
    }

    #[test]
    fn registration_lasts_one_frame() {
        let (mut engines, _log) = engines();
        let mut scene = Scene::new();
        let id = scene.spawn(GameObject::new("quad").with_component(Quad::new(&["default"])));

        assert_eq!(frame(&mut engines, &mut scene).draw_calls, 1);
        assert_eq!(engines.render_frame(&mut scene, 0.016).draw_calls, 0);

        scene.add_to_engine(&mut engines);
        scene.despawn(id);
        let stats = engines.render_frame(&mut scene, 0.016);
        assert_eq!(stats.registered, 1);
        assert_eq!(stats.draw_calls, 0);
    }

    #[test]
    fn gui_registrations_are_separate() {
        let (mut engines, log) = engines();
        let mut scene = Scene::new();
        let mut overlay = Quad::new(&["default"]);
        overlay.gui = true;
        scene.spawn(GameObject::new("overlay").with_component(overlay));
        scene.spawn(GameObject::new("quad").with_component(Quad::new(&["default"])));

        let stats = frame(&mut engines, &mut scene);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.gui_draw_calls, 1);
        assert!(engines.gui.registered().is_empty());
        let draws = log.draws();
        assert!(!draws[0].blending);
        assert!(draws[1].blending);
    }

    #[test]
    fn capability_mismatch_skips_only_that_component() {
        let (mut engines, log) = engines();
        let mut scene = Scene::new();
        let target = engines
            .rendering
            .create_render_texture(&RenderTextureDesc::color(8, 8));
        let probe = scene.spawn(GameObject::new("probe").with_component(Probe {
            material: Material::new(ShaderHandle::new("probe", ["default"])),
            target,
            stage: RenderStage::REFLECT,
        }));
        let mut overlay = Quad::new(&["default"]);
        overlay.gui = true;
        scene.spawn(GameObject::new("overlay").with_component(overlay));

        // The GUI pipeline cannot run nested passes.
        let component = scene.get(probe).unwrap().component_ids().next().unwrap();
        engines.gui.add_to_engine(ComponentKey {
            object: probe,
            component,
        });
        let stats = frame(&mut engines, &mut scene);

        assert_eq!(stats.gui_draw_calls, 1);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(log.draws().len(), 2);
        assert!(scene.component::<Probe>(probe).is_some());
    }

    #[test]
    fn stats_display() {
        let mut stats = FrameStats {
            frame: 3,
            draw_calls: 2,
            ..FrameStats::default()
        };
        stats.draws_by_stage.insert("default".into(), 2);
        assert_eq!(
            stats.to_string(),
            "frame=3 registered=0 draws=2 nested_passes=0 default=2 gui=0"
        );
    }
}
