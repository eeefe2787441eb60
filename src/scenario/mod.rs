pub mod runner;
pub mod types;

pub use runner::{ScenarioRunner, ScenarioState};
pub use types::{
    Action, Assertion, AssertionCheck, FailureDetail, OutcomeKind, RunResult, Scenario,
    ScenarioStatus, Step,
};
