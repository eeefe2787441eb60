use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use ui_probe::orchestrator::Orchestrator;
use ui_probe::scenario::Scenario;
use ui_probe::suite::kanban_suite;
use ui_probe::surface::demo_kanban_surface;
use ui_probe::{report, EngineResult};

/// ui-probe - Declarative UI scenario engine
#[derive(Parser, Debug)]
#[command(
    name = "ui-probe",
    about = "Run declarative UI scenarios with selector fallback and polling assertions",
    after_help = "ENVIRONMENT VARIABLES:\n\
        UI_PROBE_BASE_URL           URL of the application under test\n\
        UI_PROBE_TIMEOUT_MS         Default assertion timeout (ms)\n\
        UI_PROBE_POLL_INTERVAL_MS   Default poll interval (ms)\n\
        UI_PROBE_SETTLE_TIMEOUT_MS  Settle-check timeout (ms)\n\
        UI_PROBE_DEFAULT_VIEWPORT   Startup viewport profile"
)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run scenarios against the built-in demo surface
    Run {
        /// JSON file with scenarios (default: the built-in kanban suite)
        #[arg(short, long)]
        scenarios: Option<PathBuf>,

        /// Only run the scenario with this id
        #[arg(long)]
        only: Option<String>,

        /// Output the summary as JSON instead of console text
        #[arg(long)]
        json: bool,

        /// Also write the JSON summary to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the scenarios that would run
    List {
        /// JSON file with scenarios (default: the built-in kanban suite)
        #[arg(short, long)]
        scenarios: Option<PathBuf>,
    },

    /// Validate a scenario file without running it
    Validate {
        /// JSON file with scenarios
        scenarios: PathBuf,
    },
}

fn load_scenarios(path: Option<&PathBuf>) -> EngineResult<Vec<Scenario>> {
    match path {
        Some(path) => Scenario::load_file(path),
        None => Ok(kanban_suite()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();
    match run_command(args.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(2)
        }
    }
}

fn run_command(command: Commands) -> EngineResult<ExitCode> {
    match command {
        Commands::Run {
            scenarios,
            only,
            json,
            output,
        } => {
            let mut selected = load_scenarios(scenarios.as_ref())?;
            if let Some(only) = &only {
                selected.retain(|s| s.id == *only);
                if selected.is_empty() {
                    eprintln!("no scenario with id {:?}", only);
                    return Ok(ExitCode::from(2));
                }
            }

            let mut orchestrator =
                Orchestrator::new(Box::new(|| Ok(Box::new(demo_kanban_surface()))));
            let summary = orchestrator.run(&selected);

            if json {
                println!("{}", report::to_json(&summary)?);
            } else {
                report::print(&summary);
            }
            if let Some(path) = output {
                report::write_json(&summary, &path)?;
            }

            // Exit contract: 0 iff no scenario ended Failed or Error
            Ok(ExitCode::from(summary.exit_code() as u8))
        }

        Commands::List { scenarios } => {
            for scenario in load_scenarios(scenarios.as_ref())? {
                let kind = match scenario.outcome_kind {
                    ui_probe::OutcomeKind::Functional => "functional",
                    ui_probe::OutcomeKind::KnownDefect => "known defect",
                };
                println!(
                    "{:<40} [{}] {} steps  {}",
                    scenario.id,
                    kind,
                    scenario.steps.len(),
                    scenario.description
                );
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate { scenarios } => {
            let loaded = Scenario::load_file(&scenarios)?;
            println!("{}: {} scenarios valid", scenarios.display(), loaded.len());
            Ok(ExitCode::SUCCESS)
        }
    }
}
