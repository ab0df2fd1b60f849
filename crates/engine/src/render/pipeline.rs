use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use glam::{Vec3, Vec4};
use lakeside_common::{EngineError, MeshHandle, RenderStage, TextureHandle};

use super::backend::{DrawCall, GraphicsBackend, RenderTarget, RenderTextureDesc};
use super::context::{CameraBinding, PassInfo, Pipeline, draw_components};
use super::mesh::MeshData;
use super::uniforms::{CLIP_PLANE, NULL_PLANE, Uniforms};
use crate::component::ComponentKey;
use crate::config::EngineConfig;
use crate::scene::Scene;

/// Light state registered for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLightState {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl DirectionalLightState {
    pub const NONE: Self = Self {
        direction: Vec3::NEG_Y,
        color: Vec3::ZERO,
        intensity: 0.0,
    };
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub registered: usize,
    pub draw_calls: usize,
    pub draws_by_stage: BTreeMap<String, usize>,
    pub gui_draw_calls: usize,
    pub nested_passes: usize,
    pub invariant_violations: usize,
}

impl FrameStats {
    pub fn draws_in(&self, stage: &RenderStage) -> usize {
        self.draws_by_stage
            .get(&stage.as_str().to_ascii_lowercase())
            .copied()
            .unwrap_or(0)
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "frame={} registered={} draws={} nested_passes={}",
            self.frame, self.registered, self.draw_calls, self.nested_passes
        )?;
        for (stage, count) in &self.draws_by_stage {
            write!(f, " {stage}={count}")?;
        }
        write!(f, " gui={}", self.gui_draw_calls)?;
        if self.invariant_violations > 0 {
            write!(f, " invariant_violations={}", self.invariant_violations)?;
        }
        Ok(())
    }
}

/// The multi-pass scene pipeline.
///
/// # Invariants
/// - Exactly one target is bound at any instant; nested passes push and pop it
///   in strict LIFO order.
/// - The clip plane is the null plane outside of a clipped pass.
/// - The render list holds only this frame's registrations.
pub struct RenderingEngine {
    backend: Box<dyn GraphicsBackend>,
    config: EngineConfig,
    uniforms: Uniforms,
    render_list: Vec<ComponentKey>,
    main_camera: Option<CameraBinding>,
    lights: Vec<DirectionalLightState>,
    /// Bound targets above the window framebuffer.
    targets: Vec<RenderTarget>,
    stats: FrameStats,
    frame: u64,
}

impl RenderingEngine {
    pub fn new(backend: Box<dyn GraphicsBackend>, config: EngineConfig) -> Self {
        Self {
            backend,
            config,
            uniforms: Uniforms::default(),
            render_list: Vec::new(),
            main_camera: None,
            lights: Vec::new(),
            targets: Vec::new(),
            stats: FrameStats::default(),
            frame: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn backend(&self) -> &dyn GraphicsBackend {
        self.backend.as_ref()
    }

    /// Register a renderable component for the current frame.
    pub fn add_to_engine(&mut self, key: ComponentKey) {
        if !self.render_list.contains(&key) {
            self.render_list.push(key);
        }
    }

    pub fn registered(&self) -> &[ComponentKey] {
        &self.render_list
    }

    pub fn set_main_camera(&mut self, camera: CameraBinding) {
        self.main_camera = Some(camera);
    }

    pub fn add_light(&mut self, light: DirectionalLightState) {
        self.lights.push(light);
    }

    pub fn set_vector4(&mut self, name: &str, value: Vec4) {
        self.uniforms.set_vector4(name, value);
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.uniforms.set_float(name, value);
    }

    pub fn upload_mesh(&mut self, mesh: &MeshData) -> MeshHandle {
        let handle = self.backend.upload_mesh(mesh);
        tracing::debug!(
            mesh = handle.0,
            vertices = mesh.vertices.len(),
            triangles = mesh.triangle_count(),
            "mesh uploaded"
        );
        handle
    }

    pub fn release_mesh(&mut self, mesh: MeshHandle) {
        self.backend.release_mesh(mesh);
        tracing::trace!(mesh = mesh.0, "mesh released");
    }

    pub fn create_render_texture(&mut self, desc: &RenderTextureDesc) -> TextureHandle {
        self.backend.create_render_texture(desc)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.backend.resize(width, height);
    }

    pub fn present(&mut self) {
        self.backend.present();
    }

    /// Number of targets pushed above the window framebuffer.
    pub fn target_depth(&self) -> usize {
        self.targets.len()
    }

    /// Statistics of the frame in progress (or the last one, between frames).
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Render one frame into the window from this frame's registrations.
    ///
    /// The render list, camera and lights are cleared afterwards; components
    /// must register again before the next frame.
    pub fn render_frame(&mut self, scene: &mut Scene, delta_time: f32) -> FrameStats {
        let _span = tracing::info_span!("render_frame", frame = self.frame).entered();
        self.stats = FrameStats {
            frame: self.frame,
            registered: self.render_list.len(),
            ..FrameStats::default()
        };
        if self.main_camera.is_none() {
            tracing::warn!("no main camera registered, drawing with identity view");
        }
        self.apply_lights();

        self.backend.bind_target(RenderTarget::Window);
        self.backend.clear(self.config.clear_color);
        let list = self.render_list.clone();
        draw_components(self, scene, &list, &PassInfo::frame(delta_time));

        let violations = self.enforce_invariants();
        self.stats.invariant_violations += violations.len();

        self.render_list.clear();
        self.main_camera = None;
        self.lights.clear();
        self.frame += 1;
        tracing::debug!(stats = %self.stats, "frame rendered");
        self.stats.clone()
    }

    /// Render every registered component into `target` for `stage`, then
    /// restore the previously bound target.
    pub fn render_object(
        &mut self,
        scene: &mut Scene,
        target: TextureHandle,
        delta_time: f32,
        stage: RenderStage,
        is_default: bool,
    ) {
        let _span = tracing::debug_span!("render_object", stage = %stage, target = target.0).entered();
        let pass = PassInfo::nested(stage, is_default, delta_time);
        let mut scope = self.push_target(RenderTarget::Texture(target));
        scope.stats.nested_passes += 1;
        let list = scope.render_list.clone();
        draw_components(&mut *scope, scene, &list, &pass);
    }

    /// Bind `target` until the returned guard drops.
    pub fn push_target(&mut self, target: RenderTarget) -> TargetScope<'_> {
        self.targets.push(target);
        self.backend.bind_target(target);
        self.backend.clear(self.config.clear_color);
        let depth = self.targets.len();
        TargetScope {
            engine: self,
            depth,
            target,
        }
    }

    /// Apply `plane` as the clip plane until the returned guard drops, then
    /// reset it to the null plane.
    pub fn clip_plane_scope(&mut self, plane: Vec4) -> ClipPlaneScope<'_> {
        self.uniforms.set_vector4(CLIP_PLANE, plane);
        ClipPlaneScope { engine: self }
    }

    /// Bind the first registered light; with none registered, bind a dark one
    /// so a despawned light stops lighting the scene.
    fn apply_lights(&mut self) {
        let light = self.lights.first().copied().unwrap_or(DirectionalLightState::NONE);
        self.uniforms
            .set_vector4("directionalLight.direction", light.direction.extend(0.0));
        self.uniforms
            .set_vector4("directionalLight.color", light.color.extend(1.0));
        self.uniforms
            .set_float("directionalLight.intensity", light.intensity);
    }

    fn pop_target(&mut self, depth: usize, expected: RenderTarget) {
        let top = self.targets.last().copied();
        if self.targets.len() != depth || top != Some(expected) {
            self.stats.invariant_violations += 1;
            self.report(EngineError::StateInvariant(format!(
                "target stack imbalance: expected {expected:?} at depth {depth}, found {top:?} at depth {}",
                self.targets.len()
            )));
        }
        self.targets.truncate(depth.saturating_sub(1));
        let previous = self.current_target();
        self.backend.bind_target(previous);
    }

    /// Force-reset leaked pass state. Returns what had to be reset.
    fn enforce_invariants(&mut self) -> Vec<EngineError> {
        let mut violations = Vec::new();
        let plane = self.uniforms.clip_plane();
        if plane != NULL_PLANE {
            violations.push(EngineError::StateInvariant(format!(
                "clip plane {plane:?} leaked past the end of the frame"
            )));
            self.uniforms.set_vector4(CLIP_PLANE, NULL_PLANE);
        }
        if !self.targets.is_empty() {
            violations.push(EngineError::StateInvariant(format!(
                "{} render targets still bound at the end of the frame",
                self.targets.len()
            )));
            self.targets.clear();
            self.backend.bind_target(RenderTarget::Window);
        }
        for violation in &violations {
            self.report(violation.clone());
        }
        violations
    }

    fn report(&self, violation: EngineError) {
        tracing::error!(%violation, "pipeline state force-reset");
        debug_assert!(!self.config.strict_invariants, "{violation}");
    }
}

impl Pipeline for RenderingEngine {
    fn label(&self) -> &'static str {
        "scene"
    }

    fn backend_mut(&mut self) -> &mut dyn GraphicsBackend {
        self.backend.as_mut()
    }

    fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    fn current_target(&self) -> RenderTarget {
        self.targets.last().copied().unwrap_or(RenderTarget::Window)
    }

    fn main_camera(&self) -> Option<CameraBinding> {
        self.main_camera
    }

    fn submit(&mut self, call: &DrawCall<'_>) {
        self.stats.draw_calls += 1;
        *self
            .stats
            .draws_by_stage
            .entry(call.stage.as_str().to_ascii_lowercase())
            .or_default() += 1;
        self.backend.draw(call);
    }

    fn as_rendering_engine(&mut self) -> Option<&mut RenderingEngine> {
        Some(self)
    }
}

/// Keeps a render target bound; restores the previous one on drop.
pub struct TargetScope<'a> {
    engine: &'a mut RenderingEngine,
    depth: usize,
    target: RenderTarget,
}

impl Deref for TargetScope<'_> {
    type Target = RenderingEngine;

    fn deref(&self) -> &RenderingEngine {
        self.engine
    }
}

impl DerefMut for TargetScope<'_> {
    fn deref_mut(&mut self) -> &mut RenderingEngine {
        self.engine
    }
}

impl Drop for TargetScope<'_> {
    fn drop(&mut self) {
        self.engine.pop_target(self.depth, self.target);
    }
}

/// Keeps a clip plane applied; resets it to the null plane on drop.
pub struct ClipPlaneScope<'a> {
    engine: &'a mut RenderingEngine,
}

impl Deref for ClipPlaneScope<'_> {
    type Target = RenderingEngine;

    fn deref(&self) -> &RenderingEngine {
        self.engine
    }
}

impl DerefMut for ClipPlaneScope<'_> {
    fn deref_mut(&mut self) -> &mut RenderingEngine {
        self.engine
    }
}

impl Drop for ClipPlaneScope<'_> {
    fn drop(&mut self) {
        self.engine.uniforms.set_vector4(CLIP_PLANE, NULL_PLANE);
    }
}
