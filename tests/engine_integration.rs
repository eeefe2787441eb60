//! Integration tests running whole scenarios through the engine

use std::io::Write;
use std::time::Instant;

use ui_probe::orchestrator::Orchestrator;
use ui_probe::resolve;
use ui_probe::scenario::{Assertion, AssertionCheck, Scenario, ScenarioRunner, ScenarioStatus, Step};
use ui_probe::selector::TargetDescriptor;
use ui_probe::suite::kanban_suite;
use ui_probe::surface::{demo_kanban_surface, UiSurface};

fn demo_provider() -> ui_probe::SurfaceProvider {
    Box::new(|| Ok(Box::new(demo_kanban_surface())))
}

#[test]
fn test_full_kanban_suite_on_demo_surface() {
    let summary = Orchestrator::new(demo_provider()).run(&kanban_suite());

    for result in &summary.results {
        assert!(
            !result.status.is_failing(),
            "{} ended {:?}: {:?}",
            result.scenario_id,
            result.status,
            result.failure
        );
    }
    assert_eq!(summary.total, 12);
    assert_eq!(summary.passed, 10);
    assert_eq!(summary.bugs_confirmed, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn test_known_defect_scenarios_report_bug_confirmed() {
    let suite = kanban_suite();
    let defects: Vec<Scenario> = suite
        .into_iter()
        .filter(|s| s.id.contains("drag-and-drop") || s.id.contains("tag-chips"))
        .collect();
    assert_eq!(defects.len(), 2);

    let summary = Orchestrator::new(demo_provider()).run(&defects);
    assert_eq!(summary.bugs_confirmed, 2);
    assert!(!summary.is_failure());
}

/// The concrete descriptor from the board: first candidate must win and the
/// visibility assertion must succeed well within its budget.
#[test]
fn test_concrete_todo_descriptor_resolves_and_asserts_quickly() {
    let mut surface = demo_kanban_surface();
    surface.navigate("https://kanban.test").unwrap();

    let descriptor = TargetDescriptor::parse(&["text=To Do", "class*=todo-column"]);
    let scenario = Scenario::new(
        "todo-visible",
        vec![
            Step::Navigate { url: Some("https://kanban.test".to_string()) },
            Step::Assert {
                target: descriptor.clone(),
                assertion: Assertion::new(AssertionCheck::Visible)
                    .timeout_ms(2000)
                    .poll_interval_ms(100),
            },
        ],
    );

    let start = Instant::now();
    let result = ScenarioRunner::new(&mut surface).run(&scenario);
    assert_eq!(result.status, ScenarioStatus::Passed);
    // 20 polls at 100 ms would be the budget; the surface is ready far sooner
    assert!(start.elapsed().as_millis() < 2000, "took {:?}", start.elapsed());

    // Once the surface is ready, the first candidate wins
    let resolution = resolve::resolve(&surface, &descriptor, None);
    assert_eq!(resolution.winning_candidate, Some(0));
    assert_eq!(resolution.matches[0].text, "To Do");
}

/// Viewport change followed immediately by column assertions, with no
/// unconditional sleep: the settle-check and the polling assertions absorb
/// the reflow delay.
#[test]
fn test_mobile_viewport_then_columns_visible() {
    let suite = kanban_suite();
    let mobile = suite
        .into_iter()
        .find(|s| s.id == "responsive-mobile")
        .expect("responsive-mobile in suite");

    let mut surface = demo_kanban_surface();
    let result = ScenarioRunner::new(&mut surface).run(&mobile);
    assert_eq!(result.status, ScenarioStatus::Passed, "{:?}", result.failure);
    // Teardown restored the default desktop profile
    assert_eq!(surface.viewport(), ui_probe::ViewportSize::new(1920, 1080));
}

#[test]
fn test_scenarios_round_trip_through_json_file() {
    let suite = kanban_suite();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string_pretty(&suite).unwrap().as_bytes()).unwrap();

    let loaded = Scenario::load_file(file.path()).unwrap();
    assert_eq!(loaded, suite);

    // A loaded suite runs identically to the built-in one
    let summary = Orchestrator::new(demo_provider()).run(&loaded[..1]);
    assert_eq!(summary.passed, 1);
}

#[test]
fn test_failing_scenario_reports_step_and_last_observation() {
    let scenario = Scenario::new(
        "expects-missing-column",
        vec![
            Step::Navigate { url: None },
            Step::Assert {
                target: TargetDescriptor::parse(&["text=Backlog"]),
                assertion: Assertion::new(AssertionCheck::Visible)
                    .timeout_ms(300)
                    .poll_interval_ms(50),
            },
        ],
    );

    let summary = Orchestrator::new(demo_provider()).run(&[scenario]);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.exit_code(), 1);

    let failure = summary.results[0].failure.as_ref().expect("failure detail");
    assert_eq!(failure.step_index, 1);
    assert!(failure.step.contains("Backlog"));
    assert!(failure.message.contains("timed out"));
}
