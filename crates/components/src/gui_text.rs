use glam::{Vec2, Vec3};
use lakeside_assets::AssetProvider;
use lakeside_common::{EngineError, MeshHandle, TextureHandle, Transform};
use lakeside_engine::render::{Material, MeshData, Vertex};
use lakeside_engine::{Component, ComponentKey, Engines, RenderContext, Renderable, RenderingEngine};

pub const FONT_SHADER: &str = "font";

/// Glyphs per row and column of a font atlas.
const ATLAS_GRID: u32 = 16;

/// A monospaced bitmap font laid out as a 16x16 ASCII atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontType {
    pub atlas: TextureHandle,
    /// Horizontal advance per glyph, in multiples of the font size.
    pub advance: f32,
    /// Line spacing, in multiples of the font size.
    pub line_height: f32,
}

impl FontType {
    pub fn monospace(atlas: TextureHandle) -> Self {
        Self {
            atlas,
            advance: 0.5,
            line_height: 1.0,
        }
    }
}

/// Text laid out into glyph quads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    pub mesh: MeshData,
    pub lines: Vec<String>,
}

/// Break `text` into lines no wider than `max_line_length` (screen units),
/// wrapping between words, and emit one quad per visible glyph.
///
/// A word wider than a whole line gets a line of its own.
pub fn layout_text(
    text: &str,
    font: &FontType,
    font_size: f32,
    max_line_length: f32,
    centered: bool,
) -> TextLayout {
    let advance = font.advance * font_size;
    let line_height = font.line_height * font_size;
    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if !line.is_empty() && candidate as f32 * advance > max_line_length {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }

    let cell = 1.0 / ATLAS_GRID as f32;
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for (row, line) in lines.iter().enumerate() {
        let width = line.chars().count() as f32 * advance;
        let offset = if centered {
            (max_line_length - width) / 2.0
        } else {
            0.0
        };
        let top = -(row as f32) * line_height;
        for (column, glyph) in line.chars().enumerate() {
            if glyph == ' ' {
                continue;
            }
            let code = if glyph.is_ascii() { glyph as u32 } else { u32::from(b'?') };
            let u = (code % ATLAS_GRID) as f32 * cell;
            let v = (code / ATLAS_GRID) as f32 * cell;
            let left = offset + column as f32 * advance;
            let base = vertices.len() as u32;
            vertices.extend_from_slice(&[
                Vertex::new([left, top, 0.0], [u, v]),
                Vertex::new([left, top - line_height, 0.0], [u, v + cell]),
                Vertex::new([left + advance, top - line_height, 0.0], [u + cell, v + cell]),
                Vertex::new([left + advance, top, 0.0], [u + cell, v]),
            ]);
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
    }

    TextLayout {
        mesh: MeshData::new(vertices, indices),
        lines,
    }
}

/// Screen-space text drawn by the GUI pipeline.
#[derive(Debug)]
pub struct GuiText {
    text: String,
    font_size: f32,
    font: FontType,
    position: Vec2,
    max_line_length: f32,
    centered: bool,
    color: Vec3,
    material: Material,
    layout: TextLayout,
    mesh: Option<MeshHandle>,
}

impl GuiText {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        text: impl Into<String>,
        font_size: f32,
        font: FontType,
        position: Vec2,
        max_line_length: f32,
        centered: bool,
        assets: &mut dyn AssetProvider,
        engine: &mut RenderingEngine,
    ) -> Self {
        let mut material = Material::new(assets.shader(FONT_SHADER));
        material.set_main_texture(font.atlas);
        let mut gui_text = Self {
            text: text.into(),
            font_size,
            font,
            position,
            max_line_length,
            centered,
            color: Vec3::ZERO,
            material,
            layout: TextLayout::default(),
            mesh: None,
        };
        gui_text.rebuild(engine);
        gui_text
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text and rebuild its mesh.
    pub fn set_text(&mut self, text: impl Into<String>, engine: &mut RenderingEngine) {
        self.text = text.into();
        self.rebuild(engine);
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn font(&self) -> &FontType {
        &self.font
    }

    pub fn is_centered(&self) -> bool {
        self.centered
    }

    pub fn line_count(&self) -> usize {
        self.layout.lines.len()
    }

    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    fn rebuild(&mut self, engine: &mut RenderingEngine) {
        self.layout = layout_text(
            &self.text,
            &self.font,
            self.font_size,
            self.max_line_length,
            self.centered,
        );
        if let Some(previous) = self.mesh.take() {
            engine.release_mesh(previous);
        }
        self.mesh = (!self.layout.mesh.is_empty()).then(|| engine.upload_mesh(&self.layout.mesh));
    }
}

impl Component for GuiText {
    fn add_to_engine(&self, key: ComponentKey, _transform: &Transform, engines: &mut Engines) {
        engines.gui.add_to_engine(key);
    }

    fn as_renderable(&mut self) -> Option<&mut dyn Renderable> {
        Some(self)
    }
}

impl Renderable for GuiText {
    fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), EngineError> {
        if !ctx.supports(&self.material) {
            return Ok(());
        }
        let Some(mesh) = self.mesh else {
            return Ok(());
        };
        self.material.set_vector4("color", self.color.extend(1.0));
        self.material
            .set_vector4("translation", self.position.extend(0.0).extend(0.0));
        ctx.draw(mesh, &self.material);
        Ok(())
    }
}
