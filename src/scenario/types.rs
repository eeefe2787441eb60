//! Scenario, step, and result types.
//!
//! Scenarios are plain data: an ordered list of steps plus an expected
//! outcome kind. They are built in code or loaded from JSON files; the
//! runner gives them behavior.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config;
use crate::error::{EngineError, EngineResult};
use crate::retry::{Poll, RetryPolicy};
use crate::selector::TargetDescriptor;
use crate::surface::ElementSnapshot;
use crate::viewport::ViewportProfile;

/// What a resolved match set is checked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum AssertionCheck {
    /// At least one match, and every match is visible
    Visible,
    /// Some match's text equals the string exactly
    TextEquals { text: String },
    /// Some match's text contains the string
    TextContains { text: String },
    /// Some match carries the exact class name
    HasClass { class: String },
    /// Some match carries the attribute (and value, when given)
    HasAttribute {
        name: String,
        #[serde(default)]
        value: Option<String>,
    },
    /// The match set holds at least this many elements
    CountAtLeast { count: usize },
    /// The match set holds exactly this many elements
    CountExactly { count: usize },
}

impl AssertionCheck {
    /// Evaluate against a resolved match set. Returns `Poll::Pending` with
    /// the observed state when unsatisfied; never errors, since "not yet"
    /// is the normal case under polling.
    pub fn evaluate(&self, matches: &[ElementSnapshot]) -> Poll {
        match self {
            AssertionCheck::Visible => {
                if matches.is_empty() {
                    return Poll::Pending("no matches".to_string());
                }
                match matches.iter().find(|m| !m.visible) {
                    None => Poll::Satisfied,
                    Some(hidden) => Poll::Pending(format!("not visible: {}", hidden.describe())),
                }
            }
            AssertionCheck::TextEquals { text } => Poll::from_bool(
                matches.iter().any(|m| m.text == *text),
                observed_texts(matches),
            ),
            AssertionCheck::TextContains { text } => Poll::from_bool(
                matches.iter().any(|m| m.text.contains(text)),
                observed_texts(matches),
            ),
            AssertionCheck::HasClass { class } => Poll::from_bool(
                matches.iter().any(|m| m.has_class(class)),
                format!(
                    "classes seen: {:?}",
                    matches.iter().flat_map(|m| m.classes.clone()).collect::<Vec<_>>()
                ),
            ),
            AssertionCheck::HasAttribute { name, value } => {
                let satisfied = matches.iter().any(|m| match (m.attribute(name), value) {
                    (Some(actual), Some(wanted)) => actual == wanted,
                    (Some(_), None) => true,
                    (None, _) => false,
                });
                Poll::from_bool(
                    satisfied,
                    format!("attribute {:?} not as expected on {} matches", name, matches.len()),
                )
            }
            AssertionCheck::CountAtLeast { count } => Poll::from_bool(
                matches.len() >= *count,
                format!("{} matches, wanted at least {}", matches.len(), count),
            ),
            AssertionCheck::CountExactly { count } => Poll::from_bool(
                matches.len() == *count,
                format!("{} matches, wanted exactly {}", matches.len(), count),
            ),
        }
    }
}

fn observed_texts(matches: &[ElementSnapshot]) -> String {
    if matches.is_empty() {
        return "no matches".to_string();
    }
    let texts: Vec<&str> = matches.iter().take(5).map(|m| m.text.as_str()).collect();
    format!("texts seen: {:?}", texts)
}

impl std::fmt::Display for AssertionCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssertionCheck::Visible => write!(f, "visible"),
            AssertionCheck::TextEquals { text } => write!(f, "text == {:?}", text),
            AssertionCheck::TextContains { text } => write!(f, "text contains {:?}", text),
            AssertionCheck::HasClass { class } => write!(f, "has class {:?}", class),
            AssertionCheck::HasAttribute { name, value } => match value {
                Some(v) => write!(f, "attribute {:?} == {:?}", name, v),
                None => write!(f, "has attribute {:?}", name),
            },
            AssertionCheck::CountAtLeast { count } => write!(f, "count >= {}", count),
            AssertionCheck::CountExactly { count } => write!(f, "count == {}", count),
        }
    }
}

/// A check plus its polling budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    #[serde(flatten)]
    pub check: AssertionCheck,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_timeout_ms() -> u64 {
    config::default_timeout_ms()
}

fn default_poll_interval_ms() -> u64 {
    config::default_poll_interval_ms()
}

impl Assertion {
    /// Create an assertion with the configured default timing
    pub fn new(check: AssertionCheck) -> Self {
        Self {
            check,
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }

    /// Override the timeout
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Override the poll interval
    pub fn poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.timeout_ms, self.poll_interval_ms)
    }
}

/// An interaction verb applied to a resolved target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Click,
    TypeText { text: String },
    Clear,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Click => write!(f, "click"),
            Action::TypeText { text } => write!(f, "type {:?}", text),
            Action::Clear => write!(f, "clear"),
        }
    }
}

/// One step of a scenario; steps execute strictly in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a URL (configured base URL when omitted). Completion is
    /// gated by a readiness settle-check, never a fixed sleep.
    Navigate {
        #[serde(default)]
        url: Option<String>,
    },

    /// Apply a named viewport profile (`mobile`, `tablet`, `desktop`, `WxH`)
    SetViewport { profile: String },

    /// Resolve a target and apply an interaction verb to its first match
    Interact {
        target: TargetDescriptor,
        #[serde(flatten)]
        action: Action,
    },

    /// Resolve a target and poll an assertion over the match set
    Assert {
        target: TargetDescriptor,
        #[serde(flatten)]
        assertion: Assertion,
    },
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Navigate { url: Some(url) } => write!(f, "navigate {}", url),
            Step::Navigate { url: None } => write!(f, "navigate (base url)"),
            Step::SetViewport { profile } => write!(f, "set viewport {}", profile),
            Step::Interact { target, action } => write!(f, "{} {}", action, target),
            Step::Assert { target, assertion } => {
                write!(f, "assert {} on {}", assertion.check, target)
            }
        }
    }
}

/// Whether a scenario verifies working behavior or documents a known bug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Success means the behavior works
    #[default]
    Functional,
    /// Success means the defect symptom is still present; the scenario's
    /// assertions check the buggy state, and their passing is reported as
    /// BugConfirmed
    KnownDefect,
}

/// One declarative UI scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique identifier within a run
    pub id: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Expected outcome kind
    #[serde(default)]
    pub outcome_kind: OutcomeKind,

    /// Steps in execution order
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Create a functional scenario
    pub fn new(id: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            outcome_kind: OutcomeKind::Functional,
            steps,
        }
    }

    /// Create a known-defect scenario
    pub fn known_defect(id: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            outcome_kind: OutcomeKind::KnownDefect,
            steps,
        }
    }

    /// Set the description
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Validate structural invariants before running
    pub fn validate(&self) -> EngineResult<()> {
        if self.steps.is_empty() {
            return Err(EngineError::ScenarioLoad(format!(
                "scenario {:?} has no steps",
                self.id
            )));
        }
        for (index, step) in self.steps.iter().enumerate() {
            match step {
                Step::SetViewport { profile } => {
                    if ViewportProfile::from_str(profile).is_none() {
                        return Err(EngineError::ScenarioLoad(format!(
                            "scenario {:?} step {}: unknown viewport profile {:?}",
                            self.id, index, profile
                        )));
                    }
                }
                Step::Assert { target, assertion } => {
                    if !target.is_valid() {
                        return Err(EngineError::ScenarioLoad(format!(
                            "scenario {:?} step {}: empty target descriptor",
                            self.id, index
                        )));
                    }
                    assertion.policy().validate()?;
                }
                Step::Interact { target, .. } => {
                    if !target.is_valid() {
                        return Err(EngineError::ScenarioLoad(format!(
                            "scenario {:?} step {}: empty target descriptor",
                            self.id, index
                        )));
                    }
                }
                Step::Navigate { .. } => {}
            }
        }
        Ok(())
    }

    /// Load scenarios from a JSON file holding an array of scenarios
    pub fn load_file(path: &Path) -> EngineResult<Vec<Self>> {
        let content = std::fs::read_to_string(path)?;
        let scenarios: Vec<Scenario> = serde_json::from_str(&content)?;
        for scenario in &scenarios {
            scenario.validate()?;
        }
        Ok(scenarios)
    }
}

/// Terminal status of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioStatus {
    /// All steps satisfied (Functional scenarios)
    Passed,
    /// An assertion was disproved within its budget
    Failed,
    /// A KnownDefect scenario observed its defect symptom still present
    BugConfirmed,
    /// An environment fault distinct from a disproved assertion
    Error,
}

impl ScenarioStatus {
    /// Whether this status makes the overall run fail
    pub fn is_failing(&self) -> bool {
        matches!(self, ScenarioStatus::Failed | ScenarioStatus::Error)
    }
}

impl std::fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioStatus::Passed => write!(f, "passed"),
            ScenarioStatus::Failed => write!(f, "failed"),
            ScenarioStatus::BugConfirmed => write!(f, "bug confirmed"),
            ScenarioStatus::Error => write!(f, "error"),
        }
    }
}

/// Captured detail for a non-passing scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    /// Index of the step that ended the scenario
    pub step_index: usize,

    /// Rendered form of that step
    pub step: String,

    /// What went wrong (last unmet assertion or fault message)
    pub message: String,

    /// Snapshot of the resolved target set at the last attempt, if any
    #[serde(default)]
    pub resolved_targets: Option<String>,
}

/// Result of a complete scenario run
///
/// Created when a scenario starts, finalized exactly once by the runner, and
/// immutable thereafter; ownership passes to the orchestrator on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Scenario identifier
    pub scenario_id: String,

    /// Terminal status
    pub status: ScenarioStatus,

    /// Wall-clock duration of the scenario
    pub duration_ms: u64,

    /// Failure detail for non-passing outcomes
    #[serde(default)]
    pub failure: Option<FailureDetail>,

    /// Timestamp when the scenario finished
    #[serde(with = "chrono::serde::ts_seconds")]
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{ElementId, ElementSnapshot};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn snap(text: &str, visible: bool) -> ElementSnapshot {
        ElementSnapshot {
            id: ElementId(1),
            tag: "div".to_string(),
            text: text.to_string(),
            classes: vec!["task-card".to_string()],
            attributes: BTreeMap::new(),
            visible,
        }
    }

    #[test]
    fn test_visible_requires_all_matches_visible() {
        let check = AssertionCheck::Visible;
        assert_eq!(check.evaluate(&[snap("a", true), snap("b", true)]), Poll::Satisfied);
        assert!(matches!(
            check.evaluate(&[snap("a", true), snap("b", false)]),
            Poll::Pending(_)
        ));
        assert!(matches!(check.evaluate(&[]), Poll::Pending(_)));
    }

    #[test]
    fn test_text_checks() {
        let eq = AssertionCheck::TextEquals { text: "To Do".to_string() };
        assert_eq!(eq.evaluate(&[snap("To Do", true)]), Poll::Satisfied);
        assert!(matches!(eq.evaluate(&[snap("To Done", true)]), Poll::Pending(_)));

        let contains = AssertionCheck::TextContains { text: "Do".to_string() };
        assert_eq!(contains.evaluate(&[snap("To Done", true)]), Poll::Satisfied);
    }

    #[test]
    fn test_count_checks() {
        let at_least = AssertionCheck::CountAtLeast { count: 2 };
        assert_eq!(at_least.evaluate(&[snap("a", true), snap("b", true)]), Poll::Satisfied);
        assert!(matches!(at_least.evaluate(&[snap("a", true)]), Poll::Pending(_)));

        let exactly = AssertionCheck::CountExactly { count: 1 };
        assert_eq!(exactly.evaluate(&[snap("a", true)]), Poll::Satisfied);
        assert!(matches!(exactly.evaluate(&[]), Poll::Pending(_)));
    }

    #[test]
    fn test_pending_carries_observed_state() {
        let check = AssertionCheck::TextEquals { text: "Done".to_string() };
        match check.evaluate(&[snap("Doing", true)]) {
            Poll::Pending(observed) => assert!(observed.contains("Doing")),
            Poll::Satisfied => panic!("expected pending"),
        }
    }

    #[test]
    fn test_scenario_validation_rejects_bad_viewport() {
        let scenario = Scenario::new(
            "bad-viewport",
            vec![Step::SetViewport { profile: "gigantic".to_string() }],
        );
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_scenario_validation_rejects_bad_policy() {
        let scenario = Scenario::new(
            "bad-policy",
            vec![Step::Assert {
                target: TargetDescriptor::parse(&["text=To Do"]),
                assertion: Assertion::new(AssertionCheck::Visible)
                    .timeout_ms(50)
                    .poll_interval_ms(100),
            }],
        );
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_scenario_json_roundtrip() {
        let scenario = Scenario::known_defect(
            "drag-and-drop",
            vec![
                Step::Navigate { url: None },
                Step::Interact {
                    target: TargetDescriptor::parse(&["class*=task-card"]),
                    action: Action::Click,
                },
                Step::Assert {
                    target: TargetDescriptor::parse(&["text=Estudar Rust"]),
                    assertion: Assertion::new(AssertionCheck::Visible).timeout_ms(2000),
                },
            ],
        )
        .describe("cards never move between columns");

        let json = serde_json::to_string_pretty(&scenario).unwrap();
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(scenario, back);
    }

    #[test]
    fn test_load_file() {
        use std::io::Write;
        let scenarios = vec![Scenario::new(
            "smoke",
            vec![Step::Assert {
                target: TargetDescriptor::parse(&["text=To Do"]),
                assertion: Assertion::new(AssertionCheck::Visible),
            }],
        )];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&scenarios).unwrap().as_bytes()).unwrap();

        let loaded = Scenario::load_file(file.path()).unwrap();
        assert_eq!(loaded, scenarios);
    }
}
