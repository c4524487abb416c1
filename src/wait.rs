//! Fixed-interval polling for conditions against a live page
//!
//! Browser-automation libraries usually hide this behind implicit
//! auto-waiting; here it is explicit so every assertion carries its own
//! deadline. Probes run every 100ms until ready or the deadline elapses.

use std::future::Future;
use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::element::Element;
use tokio::time::Instant;

use crate::error::{ElementState, StepError};
use crate::locator::{LocatorSpec, is_visible};

/// Poll cadence. Short enough that a condition becoming true is observed
/// promptly, long enough not to flood the CDP connection.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default per-step deadline. Deliberately long: the app under test may be
/// cold-starting a dev server, and a short default produces flaky false
/// failures on first boot.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// `DEFAULT_TIMEOUT_MS` as a `Duration`.
pub fn default_timeout() -> Duration {
    Duration::from_millis(DEFAULT_TIMEOUT_MS)
}

/// Outcome of a single probe.
pub enum Probe<T> {
    Ready(T),
    Pending(ElementState),
}

/// Elapsed deadline, with the last state a probe observed.
#[derive(Debug)]
pub struct TimedOut {
    pub elapsed: Duration,
    pub last_state: ElementState,
}

/// Run `probe` immediately and then at every `interval` tick until it
/// reports `Ready`, or until `timeout` has elapsed.
///
/// The probe runs before the deadline check, so the boundary is inclusive:
/// a condition that becomes true at exactly t=timeout still succeeds, one
/// that becomes true any later does not.
pub async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<T, TimedOut>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Probe<T>>,
{
    let start = Instant::now();
    let mut last_state = ElementState::Missing;

    loop {
        match probe().await {
            Probe::Ready(value) => return Ok(value),
            Probe::Pending(state) => last_state = state,
        }

        if start.elapsed() >= timeout {
            return Err(TimedOut {
                elapsed: start.elapsed(),
                last_state,
            });
        }

        tokio::time::sleep(interval).await;
    }
}

/// Wait until an element matching `spec` exists and is visible.
///
/// Returns the live handle on success so the caller can act on it without
/// a second resolution pass.
pub async fn wait_visible(
    page: &Page,
    spec: &LocatorSpec,
    timeout: Duration,
) -> Result<Element, StepError> {
    poll_until(timeout, POLL_INTERVAL, || async {
        match spec.resolve(page).await {
            Some(el) => {
                if is_visible(&el).await {
                    Probe::Ready(el)
                } else {
                    Probe::Pending(ElementState::Hidden)
                }
            }
            None => Probe::Pending(ElementState::Missing),
        }
    })
    .await
    .map_err(|timed_out| StepError::Timeout {
        locator: spec.to_string(),
        elapsed_ms: timed_out.elapsed.as_millis() as u64,
        last_state: timed_out.last_state,
    })
}
