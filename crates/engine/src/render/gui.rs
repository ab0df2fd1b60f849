use super::backend::{DrawCall, GraphicsBackend, RenderTarget};
use super::context::{CameraBinding, PassInfo, Pipeline, draw_components};
use super::uniforms::Uniforms;
use crate::component::ComponentKey;
use crate::scene::Scene;

/// Screen-space overlay pipeline with its own per-frame registration list.
///
/// Draws straight into the window after the scene, with blending enabled and
/// no camera.
#[derive(Debug, Default)]
pub struct GuiRenderingEngine {
    render_list: Vec<ComponentKey>,
    uniforms: Uniforms,
}

impl GuiRenderingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_to_engine(&mut self, key: ComponentKey) {
        if !self.render_list.contains(&key) {
            self.render_list.push(key);
        }
    }

    pub fn registered(&self) -> &[ComponentKey] {
        &self.render_list
    }

    pub fn uniforms_mut(&mut self) -> &mut Uniforms {
        &mut self.uniforms
    }

    /// Draw this frame's registrations and clear the list. Returns the number
    /// of draw calls issued.
    pub fn render_frame(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        scene: &mut Scene,
        delta_time: f32,
    ) -> usize {
        let _span = tracing::debug_span!("render_gui", registered = self.render_list.len()).entered();
        let list = std::mem::take(&mut self.render_list);
        if list.is_empty() {
            return 0;
        }
        backend.bind_target(RenderTarget::Window);
        backend.set_blending(true);
        let mut pass = GuiPass {
            backend: &mut *backend,
            uniforms: &self.uniforms,
            draw_calls: 0,
        };
        draw_components(&mut pass, scene, &list, &PassInfo::frame(delta_time));
        let draw_calls = pass.draw_calls;
        backend.set_blending(false);
        draw_calls
    }
}

/// The GUI pipeline for the duration of one frame, borrowing the scene
/// pipeline's backend.
struct GuiPass<'a> {
    backend: &'a mut dyn GraphicsBackend,
    uniforms: &'a Uniforms,
    draw_calls: usize,
}

impl Pipeline for GuiPass<'_> {
    fn label(&self) -> &'static str {
        "gui"
    }

    fn backend_mut(&mut self) -> &mut dyn GraphicsBackend {
        &mut *self.backend
    }

    fn uniforms(&self) -> &Uniforms {
        self.uniforms
    }

    fn current_target(&self) -> RenderTarget {
        RenderTarget::Window
    }

    fn main_camera(&self) -> Option<CameraBinding> {
        None
    }

    fn submit(&mut self, call: &DrawCall<'_>) {
        self.draw_calls += 1;
        self.backend.draw(call);
    }
}
