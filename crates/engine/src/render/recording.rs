use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use glam::{Mat4, Vec3, Vec4};
use lakeside_common::{MeshHandle, TextureHandle};

use super::backend::{DrawCall, GraphicsBackend, RenderTarget, RenderTextureDesc};
use super::mesh::MeshData;

/// Render textures are numbered from here so they never collide with asset
/// texture ids.
const RENDER_TEXTURE_BASE: u64 = 1 << 32;

/// A draw call as the backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub mesh: MeshHandle,
    pub shader: String,
    pub shader_type: String,
    pub stage: String,
    pub target: RenderTarget,
    pub clip_plane: Vec4,
    pub camera_position: Vec3,
    pub model: Mat4,
    pub blending: bool,
    pub floats: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    UploadMesh {
        mesh: MeshHandle,
        vertices: usize,
        indices: usize,
    },
    ReleaseMesh(MeshHandle),
    CreateTexture {
        texture: TextureHandle,
        desc: RenderTextureDesc,
    },
    Bind(RenderTarget),
    Clear([f32; 4]),
    Blending(bool),
    Draw(DrawRecord),
    Resize {
        width: u32,
        height: u32,
    },
    Present,
}

/// Shared view of everything a [`RecordingBackend`] received.
#[derive(Debug, Clone, Default)]
pub struct CommandLog(Rc<RefCell<Vec<BackendCommand>>>);

impl CommandLog {
    pub fn commands(&self) -> Vec<BackendCommand> {
        self.0.borrow().clone()
    }

    pub fn draws(&self) -> Vec<DrawRecord> {
        self.0
            .borrow()
            .iter()
            .filter_map(|command| match command {
                BackendCommand::Draw(record) => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn binds(&self) -> Vec<RenderTarget> {
        self.0
            .borrow()
            .iter()
            .filter_map(|command| match command {
                BackendCommand::Bind(target) => Some(*target),
                _ => None,
            })
            .collect()
    }

    /// Meshes uploaded and not yet released.
    pub fn live_meshes(&self) -> usize {
        let commands = self.0.borrow();
        let uploaded = commands
            .iter()
            .filter(|command| matches!(command, BackendCommand::UploadMesh { .. }))
            .count();
        let released = commands
            .iter()
            .filter(|command| matches!(command, BackendCommand::ReleaseMesh(_)))
            .count();
        uploaded.saturating_sub(released)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, command: BackendCommand) {
        self.0.borrow_mut().push(command);
    }
}

/// Headless backend that records commands instead of executing them.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: CommandLog,
    next_mesh: u64,
    next_texture: u64,
    blending: bool,
    bound: Option<RenderTarget>,
    size: (u32, u32),
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle onto the command log that stays valid after the backend is
    /// boxed into a pipeline.
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    pub fn bound(&self) -> Option<RenderTarget> {
        self.bound
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

impl GraphicsBackend for RecordingBackend {
    fn upload_mesh(&mut self, mesh: &MeshData) -> MeshHandle {
        self.next_mesh += 1;
        let handle = MeshHandle(self.next_mesh);
        self.log.push(BackendCommand::UploadMesh {
            mesh: handle,
            vertices: mesh.vertices.len(),
            indices: mesh.indices.len(),
        });
        handle
    }

    fn release_mesh(&mut self, mesh: MeshHandle) {
        self.log.push(BackendCommand::ReleaseMesh(mesh));
    }

    fn create_render_texture(&mut self, desc: &RenderTextureDesc) -> TextureHandle {
        let texture = TextureHandle(RENDER_TEXTURE_BASE + self.next_texture);
        self.next_texture += 1;
        self.log.push(BackendCommand::CreateTexture {
            texture,
            desc: *desc,
        });
        texture
    }

    fn bind_target(&mut self, target: RenderTarget) {
        self.bound = Some(target);
        self.log.push(BackendCommand::Bind(target));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.log.push(BackendCommand::Clear(color));
    }

    fn set_blending(&mut self, enabled: bool) {
        self.blending = enabled;
        self.log.push(BackendCommand::Blending(enabled));
    }

    fn draw(&mut self, call: &DrawCall<'_>) {
        self.log.push(BackendCommand::Draw(DrawRecord {
            mesh: call.mesh,
            shader: call.material.shader().name().to_string(),
            shader_type: call.shader_type.as_str().to_string(),
            stage: call.stage.as_str().to_string(),
            target: call.target,
            clip_plane: call.clip_plane,
            camera_position: call.camera_position,
            model: call.model,
            blending: self.blending,
            floats: call.material.floats().clone(),
        }));
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.log.push(BackendCommand::Resize { width, height });
    }

    fn present(&mut self) {
        self.log.push(BackendCommand::Present);
    }
}
