// flowcheck: run a YAML verification scenario against a live web app.
//
// Exit codes: 0 success, 1 step failure, 2 launch/setup failure,
// 3 artifact I/O failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use flowcheck::{RunResult, Scenario, run_verification};

#[derive(Parser, Debug)]
#[command(name = "flowcheck", version, about = "Scripted UI-verification runner")]
struct Cli {
    /// Path to the YAML scenario file (config + step sequence)
    scenario: PathBuf,

    /// Override the scenario's base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Run with a visible browser window (debugging)
    #[arg(long)]
    headed: bool,

    /// Emit a machine-readable JSON report instead of the plain summary
    #[arg(long)]
    json: bool,
}

/// Machine-readable run report for CI consumers.
#[derive(Serialize)]
struct Report {
    ok: bool,
    steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl Report {
    fn from_result(result: &RunResult, steps: usize) -> Report {
        match result {
            RunResult::Success => Report {
                ok: true,
                steps,
                failed_index: None,
                failed_step: None,
                reason: None,
            },
            RunResult::Failure {
                index,
                step,
                reason,
            } => Report {
                ok: false,
                steps,
                failed_index: Some(*index),
                failed_step: Some(step.clone()),
                reason: Some(reason.to_string()),
            },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowcheck=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut scenario = match Scenario::from_yaml_file(&cli.scenario) {
        Ok(scenario) => scenario,
        Err(e) => {
            error!("{e}");
            eprintln!("flowcheck: {e}");
            return ExitCode::from(2);
        }
    };

    if let Some(base_url) = cli.base_url {
        scenario.config.base_url = base_url;
    }
    if cli.headed {
        scenario.config.headless = false;
    }

    let result = match run_verification(&scenario.config, &scenario.steps).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("flowcheck: {e}");
            return ExitCode::from(2);
        }
    };

    if cli.json {
        let report = Report::from_result(&result, scenario.steps.len());
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("flowcheck: failed to serialize report: {e}"),
        }
    } else {
        match &result {
            RunResult::Success => {
                println!("PASS: {} steps completed", scenario.steps.len());
            }
            RunResult::Failure {
                index,
                step,
                reason,
            } => {
                println!(
                    "FAIL at step {}/{}: {}\n  reason: {}",
                    index + 1,
                    scenario.steps.len(),
                    step,
                    reason
                );
            }
        }
    }

    ExitCode::from(result.exit_code() as u8)
}
