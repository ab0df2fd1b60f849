use std::collections::BTreeMap;

use glam::Vec3;

use crate::{Physics, RayHit, StaticMesh, StaticMeshId};

/// Minimal in-process physics world holding static triangle meshes.
///
/// There is no dynamics solver; `step` only accumulates simulated time.
#[derive(Debug, Default)]
pub struct StaticMeshWorld {
    meshes: BTreeMap<StaticMeshId, StaticMesh>,
    next_id: u64,
    elapsed: f32,
    steps: u64,
}

impl StaticMeshWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, id: StaticMeshId) -> Option<&StaticMesh> {
        self.meshes.get(&id)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Physics for StaticMeshWorld {
    fn submit_static_mesh(&mut self, mesh: StaticMesh) -> StaticMeshId {
        let id = StaticMeshId(self.next_id);
        self.next_id += 1;
        tracing::debug!(
            id = id.0,
            vertices = mesh.vertices.len(),
            triangles = mesh.triangle_count(),
            "static mesh submitted"
        );
        self.meshes.insert(id, mesh);
        id
    }

    fn remove_static_mesh(&mut self, id: StaticMeshId) -> bool {
        self.meshes.remove(&id).is_some()
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let direction = direction.try_normalize()?;
        let mut best: Option<RayHit> = None;
        for (id, mesh) in &self.meshes {
            for tri in mesh.triangles() {
                let Some(t) = ray_triangle(origin, direction, tri) else {
                    continue;
                };
                if t > max_distance || best.is_some_and(|b| b.distance <= t) {
                    continue;
                }
                best = Some(RayHit {
                    location: origin + direction * t,
                    distance: t,
                    mesh: *id,
                });
            }
        }
        best
    }

    fn step(&mut self, delta_time: f32) {
        self.elapsed += delta_time;
        self.steps += 1;
    }
}

/// Möller–Trumbore intersection; returns the distance along the ray.
/// Both triangle windings are hit.
fn ray_triangle(origin: Vec3, direction: Vec3, [a, b, c]: [Vec3; 3]) -> Option<f32> {
    const EPSILON: f32 = 1e-7;
    let edge1 = b - a;
    let edge2 = c - a;
    let p = direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}
