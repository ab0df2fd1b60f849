use std::collections::BTreeSet;
use std::sync::Arc;

use lakeside_common::RenderStage;

/// Handle to a compiled shader, carrying the set of stages it declares.
///
/// Compilation and uniform binding belong to the graphics backend; the engine
/// only uses the name and the declared stage set for capability filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderHandle {
    name: Arc<str>,
    stages: Arc<BTreeSet<String>>,
}

impl ShaderHandle {
    pub fn new<I, S>(name: &str, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stages = stages
            .into_iter()
            .map(|s| s.as_ref().to_ascii_lowercase())
            .collect();
        Self {
            name: Arc::from(name),
            stages: Arc::new(stages),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stage names this shader declares support for (lowercase).
    pub fn declared_stages(&self) -> &BTreeSet<String> {
        &self.stages
    }

    pub fn supports(&self, stage: &RenderStage) -> bool {
        self.stages.contains(&stage.as_str().to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_declared_stages_only() {
        let shader = ShaderHandle::new("terrain/terrain", ["default", "Reflect"]);
        assert!(shader.supports(&RenderStage::DEFAULT));
        assert!(shader.supports(&RenderStage::REFLECT));
        assert!(!shader.supports(&RenderStage::REFRACT));
        assert_eq!(shader.declared_stages().len(), 2);
    }
}
