//! ui-probe - Declarative UI scenario engine.
//!
//! This crate provides:
//! - Prioritized-fallback selector resolution over a queryable UI surface
//! - Polling assertions with first-class timeout and interval configuration
//! - Viewport profiles applied with bounded settle-checks, never fixed sleeps
//! - Sequential scenario execution with strict abort-on-first-failure
//! - Run orchestration with failure isolation and a distinct "bug confirmed"
//!   status for scenarios that document known defects
//!
//! # Example
//!
//! ```rust
//! use ui_probe::orchestrator::Orchestrator;
//! use ui_probe::suite::kanban_suite;
//! use ui_probe::surface::demo_kanban_surface;
//!
//! let mut orchestrator =
//!     Orchestrator::new(Box::new(|| Ok(Box::new(demo_kanban_surface()))));
//! let summary = orchestrator.run(&kanban_suite());
//! assert!(!summary.is_failure());
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod resolve;
pub mod retry;
pub mod scenario;
pub mod selector;
pub mod suite;
pub mod surface;
pub mod viewport;

// Re-export error types
pub use error::{EngineError, EngineResult};

// Re-export selector types
pub use selector::{SelectorCandidate, TargetDescriptor};

// Re-export the retry engine
pub use retry::{Poll, RetryPolicy, wait_until};

// Re-export scenario types and the runner
pub use scenario::{
    Action, Assertion, AssertionCheck, OutcomeKind, RunResult, Scenario, ScenarioRunner,
    ScenarioStatus, Step,
};

// Re-export surface types and backends
pub use surface::{Element, ElementId, ElementSnapshot, MockSurface, Tree, UiSurface, ViewportSize};

// Re-export viewport control
pub use viewport::{ViewportController, ViewportProfile};

// Re-export orchestration
pub use orchestrator::{Orchestrator, RunSummary, SurfaceProvider};
