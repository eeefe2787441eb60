//! Sequential scenario execution.
//!
//! A runner drives one scenario against one surface: steps run strictly in
//! order, the first unsatisfied step aborts the rest, and the viewport is
//! restored to the default profile on every exit path. Element handles are
//! never carried across steps; each step re-resolves its target because any
//! intervening action may have mutated the surface.

use std::time::Instant;

use chrono::Utc;

use crate::config;
use crate::error::{EngineError, EngineResult};
use crate::resolve::{self, Resolution};
use crate::retry::{self, Poll, RetryPolicy};
use crate::scenario::types::{
    Action, FailureDetail, OutcomeKind, RunResult, Scenario, ScenarioStatus, Step,
};
use crate::selector::{SelectorCandidate, TargetDescriptor};
use crate::surface::UiSurface;
use crate::viewport::{ViewportController, ViewportProfile};

/// Lifecycle of one scenario execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Errored,
}

/// Executes one scenario at a time against a surface
pub struct ScenarioRunner<'a> {
    surface: &'a mut dyn UiSurface,
    viewport: ViewportController,
    state: ScenarioState,
}

impl<'a> ScenarioRunner<'a> {
    /// Create a runner with the configured default viewport profile
    pub fn new(surface: &'a mut dyn UiSurface) -> Self {
        let default_profile = ViewportProfile::from_str(&config::get().defaults.viewport)
            .unwrap_or_else(|| ViewportProfile::new("desktop", 1920, 1080));
        Self::with_default_profile(surface, default_profile)
    }

    /// Create a runner with an explicit default viewport profile
    pub fn with_default_profile(
        surface: &'a mut dyn UiSurface,
        default_profile: ViewportProfile,
    ) -> Self {
        Self {
            surface,
            viewport: ViewportController::new(default_profile),
            state: ScenarioState::NotStarted,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ScenarioState {
        self.state
    }

    /// Run the scenario to completion and finalize its result.
    ///
    /// For KnownDefect scenarios the outcome is inverted at the reporting
    /// boundary: assertions check that the defect symptom persists, so a
    /// fully satisfied scenario is reported BugConfirmed, while a disproved
    /// assertion means the bug appears fixed and is reported Failed.
    pub fn run(&mut self, scenario: &Scenario) -> RunResult {
        let start = Instant::now();
        self.state = ScenarioState::Running;
        tracing::info!(scenario = %scenario.id, kind = ?scenario.outcome_kind, "scenario started");

        let mut failure = None;
        for (index, step) in scenario.steps.iter().enumerate() {
            tracing::debug!(scenario = %scenario.id, step = %step, index, "executing step");
            if let Err(err) = self.execute_step(step) {
                self.state = if err.is_assertion_failure() {
                    ScenarioState::Failed
                } else {
                    ScenarioState::Errored
                };
                failure = Some(FailureDetail {
                    step_index: index,
                    step: step.to_string(),
                    message: err.to_string(),
                    resolved_targets: last_resolution_detail(step, self.surface),
                });
                break;
            }
        }
        if failure.is_none() {
            self.state = ScenarioState::Succeeded;
        }

        // Release any scoped viewport override, whatever the outcome
        if let Err(err) = self.viewport.reset(self.surface) {
            tracing::warn!(scenario = %scenario.id, error = %err, "viewport reset failed");
        }

        let status = classify(scenario.outcome_kind, self.state, &mut failure);
        tracing::info!(scenario = %scenario.id, status = %status, "scenario finished");

        RunResult {
            scenario_id: scenario.id.clone(),
            status,
            duration_ms: start.elapsed().as_millis() as u64,
            failure,
            finished_at: Utc::now(),
        }
    }

    fn execute_step(&mut self, step: &Step) -> EngineResult<()> {
        match step {
            Step::Navigate { url } => self.navigate(url.as_deref()),
            Step::SetViewport { profile } => {
                let profile = ViewportProfile::from_str(profile).ok_or_else(|| {
                    EngineError::ViewportApplyFault(format!("unknown profile {:?}", profile))
                })?;
                self.viewport.apply(self.surface, &profile)
            }
            Step::Interact { target, action } => self.interact(target, action),
            Step::Assert { target, assertion } => {
                let surface = &*self.surface;
                retry::wait_until(assertion.policy(), || {
                    let resolution = resolve::resolve(surface, target, None);
                    Ok(match assertion.check.evaluate(&resolution.matches) {
                        Poll::Satisfied => Poll::Satisfied,
                        Poll::Pending(observed) => {
                            Poll::Pending(format!("{} ({})", observed, resolution.describe()))
                        }
                    })
                })
            }
        }
    }

    /// Navigate, then gate on root content being present instead of a blind
    /// fixed delay. A readiness timeout is a navigation fault, not a
    /// disproved assertion.
    fn navigate(&mut self, url: Option<&str>) -> EngineResult<()> {
        let url = url.map(str::to_string).unwrap_or_else(config::base_url);
        self.surface.navigate(&url)?;

        let surface = &*self.surface;
        retry::wait_until(RetryPolicy::settle(), || {
            let matches = surface.query(&SelectorCandidate::structure("body"), None);
            Ok(Poll::from_bool(!matches.is_empty(), "document not ready"))
        })
        .map_err(|err| EngineError::Navigation(format!("{} never became ready: {}", url, err)))
    }

    /// Resolve the target within the default polling window, then apply the
    /// verb to the first match. Resolution emptiness at timeout is a failed
    /// expectation; a verb that cannot be applied is an environment fault.
    fn interact(&mut self, target: &TargetDescriptor, action: &Action) -> EngineResult<()> {
        let mut resolution = Resolution {
            matches: Vec::new(),
            winning_candidate: None,
        };
        {
            let surface = &*self.surface;
            retry::wait_until(RetryPolicy::from_config(), || {
                resolution = resolve::resolve(surface, target, None);
                Ok(Poll::from_bool(
                    !resolution.is_empty(),
                    format!("no matches for {}", target),
                ))
            })
            .map_err(|_| EngineError::ResolutionEmpty(format!("{} for {}", target, action)))?;
        }

        let element = resolution
            .first()
            .ok_or_else(|| EngineError::ResolutionEmpty(target.to_string()))?;
        match action {
            Action::Click => self.surface.click(element.id),
            Action::TypeText { text } => self.surface.type_text(element.id, text),
            Action::Clear => self.surface.clear(element.id),
        }
    }
}

/// Snapshot the step's target one last time for failure diagnostics
fn last_resolution_detail(step: &Step, surface: &dyn UiSurface) -> Option<String> {
    let target = match step {
        Step::Interact { target, .. } | Step::Assert { target, .. } => target,
        _ => return None,
    };
    Some(resolve::resolve(surface, target, None).describe())
}

/// Map the runner's terminal state to a reported status, applying the
/// KnownDefect inversion.
fn classify(
    kind: OutcomeKind,
    state: ScenarioState,
    failure: &mut Option<FailureDetail>,
) -> ScenarioStatus {
    match (kind, state) {
        (OutcomeKind::Functional, ScenarioState::Succeeded) => ScenarioStatus::Passed,
        (OutcomeKind::KnownDefect, ScenarioState::Succeeded) => ScenarioStatus::BugConfirmed,
        (OutcomeKind::KnownDefect, ScenarioState::Failed) => {
            if let Some(failure) = failure {
                failure.message = format!(
                    "defect symptom no longer observed (bug may be fixed): {}",
                    failure.message
                );
            }
            ScenarioStatus::Failed
        }
        (_, ScenarioState::Failed) => ScenarioStatus::Failed,
        (_, _) => ScenarioStatus::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::types::{Assertion, AssertionCheck};
    use crate::surface::{Element, MockSurface, Tree};
    use std::time::Duration;

    fn board_surface() -> MockSurface {
        let mut tree = Tree::new();
        let root = tree.root();
        let column = tree.append(root, Element::new("section").class("todo-column"));
        tree.append(column, Element::new("h2").text("To Do"));
        MockSurface::with_tree(tree)
    }

    fn assert_step(spec: &[&str], check: AssertionCheck, timeout_ms: u64) -> Step {
        Step::Assert {
            target: TargetDescriptor::parse(spec),
            assertion: Assertion::new(check).timeout_ms(timeout_ms).poll_interval_ms(10),
        }
    }

    #[test]
    fn test_functional_scenario_passes() {
        let mut surface = board_surface();
        let scenario = Scenario::new(
            "columns-visible",
            vec![
                Step::Navigate { url: Some("https://kanban.test".to_string()) },
                assert_step(&["text=To Do", "class*=todo-column"], AssertionCheck::Visible, 500),
            ],
        );

        let mut runner = ScenarioRunner::new(&mut surface);
        let result = runner.run(&scenario);
        assert_eq!(result.status, ScenarioStatus::Passed);
        assert_eq!(runner.state(), ScenarioState::Succeeded);
        assert!(result.failure.is_none());
    }

    #[test]
    fn test_assertion_timeout_fails_and_aborts_remaining_steps() {
        let mut surface = board_surface();
        let scenario = Scenario::new(
            "missing-column",
            vec![
                assert_step(&["text=Backlog"], AssertionCheck::Visible, 50),
                // must never execute
                Step::Interact {
                    target: TargetDescriptor::parse(&["text=To Do"]),
                    action: Action::Click,
                },
            ],
        );

        let result = ScenarioRunner::new(&mut surface).run(&scenario);
        assert_eq!(result.status, ScenarioStatus::Failed);
        let failure = result.failure.expect("failure detail expected");
        assert_eq!(failure.step_index, 0);
        assert!(failure.message.contains("timed out"));
        assert!(surface.interaction_log().iter().all(|l| !l.starts_with("click")));
    }

    #[test]
    fn test_interaction_fault_is_errored_not_failed() {
        let mut surface = board_surface();
        surface.mutate(|tree| {
            let root = tree.root();
            let btn = tree.append(root, Element::new("button").id("ghost").text("Excluir"));
            tree.set_visible(btn, false);
        });
        let scenario = Scenario::new(
            "ghost-click",
            vec![Step::Interact {
                target: TargetDescriptor::parse(&["text=Excluir"]),
                action: Action::Click,
            }],
        );

        let result = ScenarioRunner::new(&mut surface).run(&scenario);
        assert_eq!(result.status, ScenarioStatus::Error);
        assert!(result.failure.unwrap().message.contains("not visible"));
    }

    #[test]
    fn test_known_defect_symptom_present_is_bug_confirmed() {
        let mut surface = board_surface();
        let scenario = Scenario::known_defect(
            "card-stuck",
            vec![assert_step(
                &["class*=todo-column"],
                AssertionCheck::CountExactly { count: 1 },
                200,
            )],
        );

        let result = ScenarioRunner::new(&mut surface).run(&scenario);
        assert_eq!(result.status, ScenarioStatus::BugConfirmed);
    }

    #[test]
    fn test_known_defect_symptom_absent_is_failed() {
        let mut surface = board_surface();
        // The "symptom" this scenario documents does not exist on the surface
        let scenario = Scenario::known_defect(
            "bug-appears-fixed",
            vec![assert_step(&["class*=broken-overlay"], AssertionCheck::Visible, 50)],
        );

        let result = ScenarioRunner::new(&mut surface).run(&scenario);
        assert_eq!(result.status, ScenarioStatus::Failed);
        assert!(
            result.failure.unwrap().message.contains("bug may be fixed"),
            "failure message should flag the apparent fix"
        );
    }

    #[test]
    fn test_assertion_eventually_satisfied_by_delayed_mutation() {
        let mut surface = board_surface();
        surface.schedule(Duration::from_millis(40), |tree| {
            let root = tree.root();
            tree.append(root, Element::new("div").class("toast").text("Tarefa criada"));
        });
        let scenario = Scenario::new(
            "toast-appears",
            vec![assert_step(&["text=Tarefa criada"], AssertionCheck::Visible, 500)],
        );

        let result = ScenarioRunner::new(&mut surface).run(&scenario);
        assert_eq!(result.status, ScenarioStatus::Passed);
    }

    #[test]
    fn test_viewport_restored_on_failure_path() {
        let mut surface = board_surface();
        let scenario = Scenario::new(
            "viewport-then-fail",
            vec![
                Step::SetViewport { profile: "mobile".to_string() },
                assert_step(&["text=Backlog"], AssertionCheck::Visible, 50),
            ],
        );

        let desktop = ViewportProfile::from_str("desktop").unwrap();
        let result =
            ScenarioRunner::with_default_profile(&mut surface, desktop.clone()).run(&scenario);
        assert_eq!(result.status, ScenarioStatus::Failed);
        assert_eq!(surface.viewport(), desktop.size);
    }
}
