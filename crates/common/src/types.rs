use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a game object in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameObjectId(pub Uuid);

impl GameObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GameObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.8}", &self.0.to_string()[..8])
    }
}

/// Identifier of a component, unique within its owning game object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u32);

/// A handle referencing a texture, either an asset or an off-screen render texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u64);

impl TextureHandle {
    /// Handed out for textures that failed to resolve.
    pub const PLACEHOLDER: Self = Self(0);
}

/// A handle referencing mesh data uploaded to the graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u64);

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Model matrix (scale, then rotate, then translate).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// World-to-view matrix for a camera placed at this transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Direction the transform looks along (-Z in local space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Pitch angle in radians (rotation about the local X axis).
    pub fn pitch(&self) -> f32 {
        let (_, pitch, _) = self.rotation.to_euler(EulerRot::YXZ);
        pitch
    }
}

/// Returns `rotation` with its pitch component negated, keeping yaw and roll.
///
/// Used to mirror a camera across a horizontal plane.
pub fn invert_pitch(rotation: Quat) -> Quat {
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_euler(EulerRot::YXZ, yaw, -pitch, roll)
}
