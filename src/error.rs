//! Error taxonomy for verification runs

use std::fmt;

use thiserror::Error;

/// Last-known state of a wait target when the deadline elapsed.
///
/// Distinguishes "the element never appeared" from "the element exists
/// but was hidden the whole time" - the two send a debugger to very
/// different places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// No element matched the locator on the last probe.
    Missing,
    /// An element matched but failed the visibility check.
    Hidden,
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementState::Missing => write!(f, "not found"),
            ElementState::Hidden => write!(f, "present but hidden"),
        }
    }
}

/// Failure of a single step during execution.
///
/// None of these are retried automatically; the only bounded recovery is
/// the polling inside the wait engine. Every variant propagates to the
/// run's `RunResult`.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("timed out after {elapsed_ms}ms waiting for {locator} (last state: {last_state})")]
    Timeout {
        locator: String,
        elapsed_ms: u64,
        last_state: ElementState,
    },

    #[error("element not actionable: {0}")]
    Interaction(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("artifact write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to bring up or tear down the browser session.
///
/// Launch failures abort the run before any step executes, so they are
/// kept apart from `StepError` and get their own exit code.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
}

impl StepError {
    /// Process exit code for a run that failed with this error.
    ///
    /// 1 = step failure (timeout/interaction/navigation), 3 = artifact I/O.
    /// Launch failures exit 2 via `SessionError`.
    pub fn exit_code(&self) -> i32 {
        match self {
            StepError::Io(_) => 3,
            _ => 1,
        }
    }
}
