//! Run-level orchestration with failure isolation.
//!
//! The orchestrator owns the collection of results for one run: every
//! scenario gets a freshly provisioned surface, runs to its terminal
//! outcome, and hands its result over; one scenario's failure or fault never
//! stops the scenarios behind it.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::scenario::{RunResult, Scenario, ScenarioRunner, ScenarioStatus};
use crate::surface::UiSurface;

/// Provisions a fresh surface for each scenario
pub type SurfaceProvider = Box<dyn FnMut() -> EngineResult<Box<dyn UiSurface>>>;

/// Aggregate outcome of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub bugs_confirmed: usize,
    pub errors: usize,
    pub duration_ms: u64,

    /// Per-scenario results in execution order
    pub results: Vec<RunResult>,
}

impl RunSummary {
    /// The run fails overall iff any scenario Failed or Errored;
    /// BugConfirmed and Passed are both non-failing outcomes.
    pub fn is_failure(&self) -> bool {
        self.failed > 0 || self.errors > 0
    }

    /// Process exit code contract: 0 iff no failing scenario
    pub fn exit_code(&self) -> i32 {
        if self.is_failure() { 1 } else { 0 }
    }
}

/// Executes an ordered collection of scenarios against one UI surface
/// instance at a time
pub struct Orchestrator {
    provision: SurfaceProvider,
}

impl Orchestrator {
    /// Create an orchestrator around a fresh-surface callback
    pub fn new(provision: SurfaceProvider) -> Self {
        Self { provision }
    }

    /// Run every scenario in order, recording a result for each regardless
    /// of outcome.
    pub fn run(&mut self, scenarios: &[Scenario]) -> RunSummary {
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        tracing::info!(total = scenarios.len(), "run started");
        for scenario in scenarios {
            let result = self.run_one(scenario);
            match result.status {
                ScenarioStatus::Passed => {
                    tracing::info!(scenario = %scenario.id, "✓ passed ({} ms)", result.duration_ms);
                }
                ScenarioStatus::BugConfirmed => {
                    tracing::info!(scenario = %scenario.id, "✓ bug confirmed ({} ms)", result.duration_ms);
                }
                ScenarioStatus::Failed | ScenarioStatus::Error => {
                    let detail = result
                        .failure
                        .as_ref()
                        .map(|f| f.message.clone())
                        .unwrap_or_else(|| "no detail".to_string());
                    tracing::error!(scenario = %scenario.id, status = %result.status, "✗ {}", detail);
                }
            }
            results.push(result);
        }

        let summary = summarize(results, start.elapsed().as_millis() as u64);
        tracing::info!(
            passed = summary.passed,
            failed = summary.failed,
            bugs_confirmed = summary.bugs_confirmed,
            errors = summary.errors,
            "run finished ({} ms)",
            summary.duration_ms
        );
        summary
    }

    fn run_one(&mut self, scenario: &Scenario) -> RunResult {
        if let Err(err) = scenario.validate() {
            return error_result(scenario, format!("invalid scenario: {}", err));
        }
        let mut surface = match (self.provision)() {
            Ok(surface) => surface,
            Err(err) => {
                return error_result(scenario, format!("surface provisioning failed: {}", err));
            }
        };
        ScenarioRunner::new(surface.as_mut()).run(scenario)
    }
}

fn error_result(scenario: &Scenario, message: String) -> RunResult {
    RunResult {
        scenario_id: scenario.id.clone(),
        status: ScenarioStatus::Error,
        duration_ms: 0,
        failure: Some(crate::scenario::FailureDetail {
            step_index: 0,
            step: "(before first step)".to_string(),
            message,
            resolved_targets: None,
        }),
        finished_at: chrono::Utc::now(),
    }
}

fn summarize(results: Vec<RunResult>, duration_ms: u64) -> RunSummary {
    let count = |status: ScenarioStatus| results.iter().filter(|r| r.status == status).count();
    RunSummary {
        total: results.len(),
        passed: count(ScenarioStatus::Passed),
        failed: count(ScenarioStatus::Failed),
        bugs_confirmed: count(ScenarioStatus::BugConfirmed),
        errors: count(ScenarioStatus::Error),
        duration_ms,
        results,
    }
}
