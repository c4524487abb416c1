//! Step execution against a driver
//!
//! The executor owns the ordering and fail-fast policy; everything
//! browser-specific lives behind the `StepDriver` trait so the policy can
//! be tested against a scripted stub.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::StepError;
use crate::locator::LocatorSpec;
use crate::step::{RunResult, Step};

/// Everything a step sequence needs from the world. `Session` is the
/// production implementation; tests substitute a scripted stub.
#[async_trait]
pub trait StepDriver: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), StepError>;

    async fn click(&mut self, target: &LocatorSpec, timeout: Duration) -> Result<(), StepError>;

    async fn fill(
        &mut self,
        target: &LocatorSpec,
        value: &str,
        timeout: Duration,
    ) -> Result<(), StepError>;

    async fn assert_visible(
        &mut self,
        target: &LocatorSpec,
        timeout: Duration,
    ) -> Result<(), StepError>;

    async fn pause(&mut self, duration: Duration) -> Result<(), StepError>;

    async fn screenshot(
        &mut self,
        target: Option<&LocatorSpec>,
        path: &Path,
    ) -> Result<(), StepError>;

    /// Release the driver's resources. Called exactly once per run, on
    /// every exit path.
    async fn teardown(&mut self);
}

/// Execute steps strictly in declared order, stopping at the first failure.
///
/// No retry, no skip-and-continue: a screenshot taken after an earlier step
/// silently failed is worse than no screenshot at all.
pub async fn run_steps<D: StepDriver>(driver: &mut D, steps: &[Step]) -> RunResult {
    for (index, step) in steps.iter().enumerate() {
        info!(index, step = %step.describe(), "executing step");

        let outcome = match step {
            Step::Navigate { url } => driver.navigate(url).await,
            Step::Click { target, .. } => driver.click(target, step.timeout()).await,
            Step::Fill { target, value, .. } => {
                driver.fill(target, value, step.timeout()).await
            }
            Step::AssertVisible { target, .. } => {
                driver.assert_visible(target, step.timeout()).await
            }
            Step::Wait { duration_ms } => {
                driver.pause(Duration::from_millis(*duration_ms)).await
            }
            Step::Screenshot { target, path } => {
                driver.screenshot(target.as_ref(), path).await
            }
        };

        if let Err(reason) = outcome {
            error!(index, step = %step.describe(), %reason, "step failed, aborting run");
            return RunResult::Failure {
                index,
                step: step.describe(),
                reason,
            };
        }
    }

    info!(steps = steps.len(), "all steps completed");
    RunResult::Success
}

/// Run a sequence and tear the driver down on every exit path.
pub async fn run_to_completion<D: StepDriver>(mut driver: D, steps: &[Step]) -> RunResult {
    let result = run_steps(&mut driver, steps).await;
    driver.teardown().await;
    result
}
