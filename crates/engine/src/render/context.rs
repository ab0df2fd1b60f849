use glam::{Mat4, Vec3};
use lakeside_common::{GameObjectId, MeshHandle, RenderStage, Transform};

use super::backend::{DrawCall, GraphicsBackend, RenderTarget};
use super::material::Material;
use super::pipeline::RenderingEngine;
use super::uniforms::Uniforms;
use crate::component::ComponentKey;
use crate::scene::Scene;

/// The camera registered for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBinding {
    pub object: GameObjectId,
    pub projection: Mat4,
}

/// Tags describing the pass a component is asked to render in.
#[derive(Debug, Clone, PartialEq)]
pub struct PassInfo {
    /// Shader variant to bind; components skip the pass if their shader does
    /// not declare it.
    pub shader_type: RenderStage,
    /// The pass being rendered (`default`, `reflect`, `refract`, ...).
    pub stage: RenderStage,
    pub delta_time: f32,
}

impl PassInfo {
    /// The top-level pass into the window.
    pub fn frame(delta_time: f32) -> Self {
        Self {
            shader_type: RenderStage::DEFAULT,
            stage: RenderStage::DEFAULT,
            delta_time,
        }
    }

    /// A nested pass into an off-screen target.
    pub fn nested(stage: RenderStage, is_default: bool, delta_time: f32) -> Self {
        let shader_type = if is_default {
            RenderStage::DEFAULT
        } else {
            stage.clone()
        };
        Self {
            shader_type,
            stage,
            delta_time,
        }
    }
}

/// What a component can see of the pipeline it renders into.
///
/// Only [`RenderingEngine`] offers camera mirroring, clip planes and nested
/// passes; components needing those ask for it through
/// [`Pipeline::as_rendering_engine`] and report a configuration error when it
/// is absent.
pub trait Pipeline {
    fn label(&self) -> &'static str;

    fn backend_mut(&mut self) -> &mut dyn GraphicsBackend;

    fn uniforms(&self) -> &Uniforms;

    fn current_target(&self) -> RenderTarget;

    fn main_camera(&self) -> Option<CameraBinding>;

    /// Forward a draw to the backend and account for it.
    fn submit(&mut self, call: &DrawCall<'_>);

    fn as_rendering_engine(&mut self) -> Option<&mut RenderingEngine> {
        None
    }
}

/// Per-component view of a pass: the pipeline, the rest of the scene, the
/// owner's transform and the pass tags.
pub struct RenderContext<'a> {
    pub pipeline: &'a mut dyn Pipeline,
    pub scene: &'a mut Scene,
    pub transform: Transform,
    pub pass: &'a PassInfo,
}

impl RenderContext<'_> {
    /// Capability filter: does `material`'s shader declare this pass's shader type?
    pub fn supports(&self, material: &Material) -> bool {
        material.supports(&self.pass.shader_type)
    }

    /// Draw `mesh` with `material` at the owner's transform.
    ///
    /// The camera is read from the scene at draw time, so a mirrored camera is
    /// seen by every draw issued while it is mirrored.
    pub fn draw(&mut self, mesh: MeshHandle, material: &Material) {
        let (view_projection, camera_position) = self
            .pipeline
            .main_camera()
            .and_then(|camera| {
                self.scene
                    .transform(camera.object)
                    .map(|t| (camera.projection * t.view_matrix(), t.position))
            })
            .unwrap_or((Mat4::IDENTITY, Vec3::ZERO));
        let call = DrawCall {
            mesh,
            material,
            shader_type: &self.pass.shader_type,
            stage: &self.pass.stage,
            model: self.transform.matrix(),
            view_projection,
            camera_position,
            clip_plane: self.pipeline.uniforms().clip_plane(),
            target: self.pipeline.current_target(),
        };
        self.pipeline.submit(&call);
    }
}

/// Render every listed component once for `pass`.
///
/// Each component is taken out of its slot while it renders, so a component
/// that triggers a nested pass never sees itself in that pass.
pub(crate) fn draw_components(
    pipeline: &mut dyn Pipeline,
    scene: &mut Scene,
    list: &[ComponentKey],
    pass: &PassInfo,
) {
    for key in list {
        let Some((mut component, transform)) = scene.take_component(*key) else {
            continue;
        };
        if let Some(renderable) = component.as_renderable() {
            let mut ctx = RenderContext {
                pipeline: &mut *pipeline,
                scene: &mut *scene,
                transform,
                pass,
            };
            if let Err(err) = renderable.render(&mut ctx) {
                tracing::error!(
                    component = component.type_name(),
                    stage = %pass.stage,
                    pipeline = pipeline.label(),
                    %err,
                    "render contribution skipped"
                );
            }
        }
        scene.restore_component(*key, component);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_pass_shader_type() {
        let pass = PassInfo::nested(RenderStage::REFLECT, false, 0.1);
        assert_eq!(pass.shader_type, RenderStage::REFLECT);
        let pass = PassInfo::nested(RenderStage::REFLECT, true, 0.1);
        assert_eq!(pass.shader_type, RenderStage::DEFAULT);
        assert_eq!(pass.stage, RenderStage::REFLECT);
    }
}
