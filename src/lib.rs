//! Scripted UI-verification workflow engine
//!
//! Executes a declarative sequence of navigation, interaction, assertion,
//! and screenshot steps against a live web application in a headless
//! Chromium session via chromiumoxide. Fail-fast, explicit timeouts,
//! guaranteed session teardown.

pub mod artifact;
pub mod browser_setup;
mod error;
mod executor;
mod locator;
mod session;
mod step;
mod wait;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use error::{ElementState, SessionError, StepError};
pub use executor::{StepDriver, run_steps, run_to_completion};
pub use locator::LocatorSpec;
pub use session::Session;
pub use step::{RunResult, Step};
pub use wait::{DEFAULT_TIMEOUT_MS, POLL_INTERVAL, Probe, TimedOut, poll_until, wait_visible};

/// Run configuration: where the application under test lives and how the
/// browser is brought up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address of the application under test.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Run the browser without a visible window.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Window dimensions. Omitted means the browser's natural size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

fn default_base_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_headless() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            headless: default_headless(),
            viewport: None,
        }
    }
}

/// A complete verification scenario: run configuration plus the ordered
/// step sequence, as loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(flatten)]
    pub config: Config,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Scenario> {
        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read scenario {}: {e}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("failed to parse scenario {}: {e}", path.display()))?;
        Ok(scenario)
    }
}

/// Execute a full verification run: open a session, run the steps in
/// order, tear the session down on every exit path.
///
/// `Err` means the browser never launched (no step executed); `Ok` carries
/// the run outcome, including failures mid-sequence.
pub async fn run_verification(
    config: &Config,
    steps: &[Step],
) -> Result<RunResult, SessionError> {
    let session = Session::open(config).await?;
    info!(steps = steps.len(), base_url = %config.base_url, "starting verification run");
    Ok(run_to_completion(session, steps).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn config_defaults_are_headless_natural_size() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8081");
        assert!(config.headless);
        assert!(config.viewport.is_none());
    }

    #[test]
    fn scenario_parses_config_and_steps_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
base_url: http://localhost:8081
viewport: {{ width: 375, height: 812 }}
steps:
  - action: navigate
    url: /
  - action: assert_visible
    target: {{ by: text, text: Welcome to SimsLyfe }}
"#
        )
        .unwrap();

        let scenario = Scenario::from_yaml_file(file.path()).unwrap();
        assert!(scenario.config.headless);
        assert_eq!(
            scenario.config.viewport,
            Some(Viewport {
                width: 375,
                height: 812
            })
        );
        assert_eq!(scenario.steps.len(), 2);
    }

    #[test]
    fn missing_scenario_file_is_an_error() {
        let err = Scenario::from_yaml_file(Path::new("/nonexistent/scenario.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read scenario"));
    }

    #[test]
    fn malformed_step_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "steps:\n  - action: teleport\n").unwrap();
        let err = Scenario::from_yaml_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse scenario"));
    }
}
