/// Error taxonomy shared by the engine crates.
///
/// None of these are fatal to a frame: the pipeline logs them and moves on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Missing asset or a pipeline/component capability mismatch.
    #[error("configuration error in {component}: {reason}")]
    Configuration {
        component: &'static str,
        reason: String,
    },
    /// Degenerate or empty geometry input.
    #[error("geometry error in {component}: {reason}")]
    Geometry {
        component: &'static str,
        reason: String,
    },
    /// A pipeline invariant was broken by a caller and had to be force-reset.
    #[error("state invariant violated: {0}")]
    StateInvariant(String),
}

impl EngineError {
    pub fn configuration(component: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            component,
            reason: reason.into(),
        }
    }

    pub fn geometry(component: &'static str, reason: impl Into<String>) -> Self {
        Self::Geometry {
            component,
            reason: reason.into(),
        }
    }
}
