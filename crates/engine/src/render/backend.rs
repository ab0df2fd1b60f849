use glam::{Mat4, Vec3, Vec4};
use lakeside_common::{MeshHandle, RenderStage, TextureHandle};
use serde::{Deserialize, Serialize};

use super::material::Material;
use super::mesh::MeshData;

/// Where draw calls land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// The window's default framebuffer.
    Window,
    /// An off-screen render texture.
    Texture(TextureHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    #[default]
    Rgba8,
    Depth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Attachment {
    #[default]
    Color,
    Depth,
}

/// Parameters of an off-screen render texture. Defaults to an RGBA,
/// linear-filtered colour target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderTextureDesc {
    pub width: u32,
    pub height: u32,
    pub filter: TextureFilter,
    pub format: PixelFormat,
    pub attachment: Attachment,
}

impl RenderTextureDesc {
    pub fn color(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: TextureFilter::default(),
            format: PixelFormat::Rgba8,
            attachment: Attachment::Color,
        }
    }

    /// Depth-only target bound to the depth attachment.
    pub fn depth(width: u32, height: u32) -> Self {
        Self {
            format: PixelFormat::Depth,
            attachment: Attachment::Depth,
            ..Self::color(width, height)
        }
    }

    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn is_color(&self) -> bool {
        self.format != PixelFormat::Depth
    }
}

/// Everything a backend needs to issue one draw.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub mesh: MeshHandle,
    pub material: &'a Material,
    pub shader_type: &'a RenderStage,
    pub stage: &'a RenderStage,
    pub model: Mat4,
    pub view_projection: Mat4,
    pub camera_position: Vec3,
    pub clip_plane: Vec4,
    pub target: RenderTarget,
}

/// The graphics collaborator. Shader compilation, uniform binding and buffer
/// management live behind this trait.
pub trait GraphicsBackend {
    fn upload_mesh(&mut self, mesh: &MeshData) -> MeshHandle;

    /// Free a mesh returned by [`GraphicsBackend::upload_mesh`]. The handle
    /// must not be drawn afterwards.
    fn release_mesh(&mut self, mesh: MeshHandle);

    fn create_render_texture(&mut self, desc: &RenderTextureDesc) -> TextureHandle;

    /// Make `target` the destination of subsequent draws.
    fn bind_target(&mut self, target: RenderTarget);

    /// Clear the currently bound target.
    fn clear(&mut self, color: [f32; 4]);

    fn set_blending(&mut self, enabled: bool);

    fn draw(&mut self, call: &DrawCall<'_>);

    fn resize(&mut self, width: u32, height: u32);

    /// Swap buffers.
    fn present(&mut self);
}
