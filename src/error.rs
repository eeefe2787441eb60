//! Error types for the scenario engine.
//!
//! The taxonomy mirrors how outcomes are classified: assertion timeouts are
//! disproved expectations (scenario Failed), while interaction, viewport, and
//! navigation faults are environment problems (scenario Errored).

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Error types for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// No selector candidate matched within the polling window
    #[error("no selector candidate matched: {0}")]
    ResolutionEmpty(String),

    /// Predicate never satisfied before the timeout elapsed
    #[error("assertion timed out after {timeout_ms} ms ({attempts} attempts): {last_observed}")]
    AssertionTimeout {
        timeout_ms: u64,
        attempts: u32,
        last_observed: String,
    },

    /// An interaction verb could not be applied to its target
    #[error("interaction fault: {0}")]
    InteractionFault(String),

    /// Viewport change did not settle within its bounded check
    #[error("viewport apply fault: {0}")]
    ViewportApplyFault(String),

    /// Navigation did not reach a ready surface
    #[error("navigation fault: {0}")]
    Navigation(String),

    /// A scenario definition could not be loaded or was invalid
    #[error("scenario load error: {0}")]
    ScenarioLoad(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Whether this error indicates a disproved assertion (scenario Failed)
    /// rather than an environment fault (scenario Errored).
    pub fn is_assertion_failure(&self) -> bool {
        matches!(
            self,
            EngineError::AssertionTimeout { .. } | EngineError::ResolutionEmpty(_)
        )
    }
}
