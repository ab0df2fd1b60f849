use std::borrow::Cow;
use std::hash::{Hash, Hasher};

/// Render stage tag scoping which shaders take part in a pass.
///
/// Stage names compare case-insensitively, so `"Reflect"` and `"reflect"` are
/// the same stage.
#[derive(Debug, Clone)]
pub struct RenderStage(Cow<'static, str>);

impl RenderStage {
    pub const DEFAULT: Self = Self(Cow::Borrowed("default"));
    pub const REFLECT: Self = Self(Cow::Borrowed("reflect"));
    pub const REFRACT: Self = Self(Cow::Borrowed("refract"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this stage renders into a water surface's own textures.
    pub fn is_mirror_pass(&self) -> bool {
        *self == Self::REFLECT || *self == Self::REFRACT
    }
}

impl Default for RenderStage {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl PartialEq for RenderStage {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for RenderStage {}

impl Hash for RenderStage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl std::fmt::Display for RenderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RenderStage {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
