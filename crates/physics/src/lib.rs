//! Physics collaborator: static mesh ingestion and raycasts.
//!
//! # Invariants
//! - A submitted static mesh is immutable; regeneration removes and resubmits.
//! - `step` runs once per frame, strictly before rendering.

mod world;

pub use world::StaticMeshWorld;

use glam::Vec3;

/// Identifier of a static mesh inside a physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaticMeshId(pub u64);

/// A static collision surface: positions plus triangle indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticMesh {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl StaticMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as vertex triples. Out-of-range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            Some([
                *self.vertices.get(tri[0] as usize)?,
                *self.vertices.get(tri[1] as usize)?,
                *self.vertices.get(tri[2] as usize)?,
            ])
        })
    }
}

/// Nearest intersection returned by a raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub location: Vec3,
    pub distance: f32,
    pub mesh: StaticMeshId,
}

/// The contract the engine consumes from a physics engine.
pub trait Physics {
    /// Ingest a one-shot static collision surface.
    fn submit_static_mesh(&mut self, mesh: StaticMesh) -> StaticMeshId;

    /// Remove a previously submitted surface. Returns false if unknown.
    fn remove_static_mesh(&mut self, id: StaticMeshId) -> bool;

    /// Nearest hit along `direction` from `origin` within `max_distance`.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;

    /// Advance the simulation.
    fn step(&mut self, delta_time: f32);
}

pub fn crate_info() -> &'static str {
    "lakeside-physics v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("physics"));
    }

    #[test]
    fn triangles_skip_bad_indices() {
        let mesh = StaticMesh {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Z],
            indices: vec![0, 1, 2, 0, 1, 9],
        };
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles().count(), 1);
    }
}
