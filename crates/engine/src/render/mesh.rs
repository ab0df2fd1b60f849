use bytemuck::{Pod, Zeroable};

/// Interleaved vertex layout shared by the built-in meshes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }
}

/// CPU-side triangle mesh, uploaded through the graphics backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Raw vertex bytes as laid out for the GPU.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_views_match_layout() {
        let mesh = MeshData::new(
            vec![Vertex::new([0.0; 3], [0.0; 2]); 4],
            vec![2, 0, 1, 3, 0, 2],
        );
        assert_eq!(mesh.vertex_bytes().len(), 4 * 5 * 4);
        assert_eq!(mesh.index_bytes().len(), 6 * 4);
        assert_eq!(mesh.triangle_count(), 2);
    }
}
