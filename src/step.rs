//! Declarative verification steps and run outcomes

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StepError;
use crate::locator::LocatorSpec;
use crate::wait::DEFAULT_TIMEOUT_MS;

/// One step of a verification sequence. Immutable once constructed; the
/// executor consumes steps strictly in declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Load a URL. Relative paths are joined against the configured base URL.
    Navigate { url: String },

    /// Click the element matching `target`, waiting up to the timeout for
    /// it to become visible first.
    Click {
        target: LocatorSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },

    /// Type `value` into the form control matching `target`, replacing any
    /// existing content.
    Fill {
        target: LocatorSpec,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },

    /// Assert that the element matching `target` becomes visible within the
    /// timeout.
    AssertVisible {
        target: LocatorSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },

    /// Fixed pause. Last resort - prefer `AssertVisible` on the state the
    /// pause was meant to wait for.
    Wait { duration_ms: u64 },

    /// Capture a PNG of the element matching `target`, or of the full page
    /// when no target is given.
    Screenshot {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<LocatorSpec>,
        path: PathBuf,
    },
}

impl Step {
    /// Effective wait deadline for this step. Steps without an explicit
    /// timeout get the long default (slow dev-server cold starts).
    pub fn timeout(&self) -> Duration {
        let ms = match self {
            Step::Click { timeout_ms, .. }
            | Step::Fill { timeout_ms, .. }
            | Step::AssertVisible { timeout_ms, .. } => timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            _ => DEFAULT_TIMEOUT_MS,
        };
        Duration::from_millis(ms)
    }

    /// Short human-readable description for logs and failure reports.
    pub fn describe(&self) -> String {
        match self {
            Step::Navigate { url } => format!("navigate to {url}"),
            Step::Click { target, .. } => format!("click {target}"),
            Step::Fill { target, value, .. } => format!("fill {target} with \"{value}\""),
            Step::AssertVisible { target, .. } => format!("assert {target} visible"),
            Step::Wait { duration_ms } => format!("wait {duration_ms}ms"),
            Step::Screenshot { target, path } => match target {
                Some(t) => format!("screenshot {} -> {}", t, path.display()),
                None => format!("screenshot page -> {}", path.display()),
            },
        }
    }
}

/// Outcome of executing a full step sequence. Produced exactly once per run.
#[derive(Debug)]
pub enum RunResult {
    Success,
    Failure {
        /// Zero-based index of the step that failed.
        index: usize,
        /// Description of the failing step.
        step: String,
        reason: StepError,
    },
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Success)
    }

    /// Exit code for a CLI wrapper: 0 success, 1 step failure, 3 artifact
    /// I/O failure. (Launch failures exit 2 before a RunResult exists.)
    pub fn exit_code(&self) -> i32 {
        match self {
            RunResult::Success => 0,
            RunResult::Failure { reason, .. } => reason.exit_code(),
        }
    }
}
