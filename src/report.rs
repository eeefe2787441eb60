//! Report rendering for a completed run.
//!
//! The orchestrator's summary is the sole externally consumed output; this
//! module renders it for the console or serializes it as JSON. Presentation
//! only, no run semantics.

use std::path::Path;

use crate::error::EngineResult;
use crate::orchestrator::RunSummary;
use crate::scenario::ScenarioStatus;

fn status_marker(status: ScenarioStatus) -> &'static str {
    match status {
        ScenarioStatus::Passed => "✓",
        ScenarioStatus::BugConfirmed => "◉",
        ScenarioStatus::Failed => "✗",
        ScenarioStatus::Error => "!",
    }
}

/// Render the summary as console text
pub fn render(summary: &RunSummary) -> String {
    let mut out = String::new();

    for result in &summary.results {
        out.push_str(&format!(
            "{} {} [{}] ({} ms)\n",
            status_marker(result.status),
            result.scenario_id,
            result.status,
            result.duration_ms
        ));
        if let Some(failure) = &result.failure {
            out.push_str(&format!(
                "    step {}: {}\n    {}\n",
                failure.step_index, failure.step, failure.message
            ));
            if let Some(resolved) = &failure.resolved_targets {
                out.push_str(&format!("    last resolved: {}\n", resolved));
            }
        }
    }

    out.push_str(&format!(
        "\n{} scenarios: {} passed, {} failed, {} bugs confirmed, {} errors ({} ms)\n",
        summary.total,
        summary.passed,
        summary.failed,
        summary.bugs_confirmed,
        summary.errors,
        summary.duration_ms
    ));
    out
}

/// Print the summary to stdout
pub fn print(summary: &RunSummary) {
    print!("{}", render(summary));
}

/// Serialize the summary as pretty JSON
pub fn to_json(summary: &RunSummary) -> EngineResult<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Write the summary as JSON to a file
pub fn write_json(summary: &RunSummary, path: &Path) -> EngineResult<()> {
    std::fs::write(path, to_json(summary)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{FailureDetail, RunResult};

    fn summary() -> RunSummary {
        RunSummary {
            total: 2,
            passed: 1,
            failed: 1,
            bugs_confirmed: 0,
            errors: 0,
            duration_ms: 321,
            results: vec![
                RunResult {
                    scenario_id: "columns-visible".to_string(),
                    status: ScenarioStatus::Passed,
                    duration_ms: 120,
                    failure: None,
                    finished_at: chrono::Utc::now(),
                },
                RunResult {
                    scenario_id: "add-task".to_string(),
                    status: ScenarioStatus::Failed,
                    duration_ms: 201,
                    failure: Some(FailureDetail {
                        step_index: 2,
                        step: "assert visible on [text=Nova tarefa teste]".to_string(),
                        message: "assertion timed out after 2000 ms".to_string(),
                        resolved_targets: Some("no matches".to_string()),
                    }),
                    finished_at: chrono::Utc::now(),
                },
            ],
        }
    }

    #[test]
    fn test_render_lists_every_scenario_and_counts() {
        let text = render(&summary());
        assert!(text.contains("✓ columns-visible"));
        assert!(text.contains("✗ add-task"));
        assert!(text.contains("assertion timed out"));
        assert!(text.contains("last resolved: no matches"));
        assert!(text.contains("2 scenarios: 1 passed, 1 failed, 0 bugs confirmed, 0 errors"));
    }

    #[test]
    fn test_json_roundtrip() {
        let json = to_json(&summary()).unwrap();
        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total, 2);
        assert_eq!(back.results.len(), 2);
    }

    #[test]
    fn test_write_json_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run-summary.json");
        write_json(&summary(), &path).unwrap();
        assert!(path.exists());
    }
}
