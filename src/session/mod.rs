//! Browser session lifecycle and the production step driver
//!
//! A `Session` is one isolated browser context with a single page,
//! exclusively owned by one verification run for its entire lifetime.
//! `close()` must run on every exit path; `run_verification` guarantees it.

mod wrapper;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::page::Page;
use tracing::{debug, info};
use url::Url;

use crate::Config;
use crate::artifact;
use crate::browser_setup::launch_browser;
use crate::error::{SessionError, StepError};
use crate::executor::StepDriver;
use crate::locator::LocatorSpec;
use crate::wait::wait_visible;
use wrapper::BrowserHandle;

/// Hard ceiling on page-load time, separate from element-wait deadlines.
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Session {
    handle: BrowserHandle,
    page: Page,
    base_url: Url,
}

impl Session {
    /// Launch an isolated browser and open its single blank page.
    pub async fn open(config: &Config) -> Result<Session, SessionError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SessionError::Launch(format!("invalid base URL '{}': {e}", config.base_url))
        })?;

        let (browser, handler, user_data_dir) =
            launch_browser(config.headless, config.viewport)
                .await
                .map_err(|e| SessionError::Launch(e.to_string()))?;
        let mut handle = BrowserHandle::new(browser, handler, user_data_dir);

        let page = match handle.browser().new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // Launched but unusable: tear the process down before failing
                handle.shutdown().await;
                return Err(SessionError::Launch(format!("failed to create page: {e}")));
            }
        };

        info!(base_url = %base_url, "browser session opened");
        Ok(Session {
            handle,
            page,
            base_url,
        })
    }

    /// Close the browser and release all resources. Must be called exactly
    /// once per successful `open`; `run_verification` does so on every path.
    pub async fn close(mut self) {
        self.handle.shutdown().await;
    }

    /// Resolve a step URL against the configured base. Absolute URLs pass
    /// through; relative paths are joined.
    fn target_url(&self, url: &str) -> Result<Url, StepError> {
        let resolved = self
            .base_url
            .join(url)
            .map_err(|e| StepError::Navigation(format!("invalid URL '{url}': {e}")))?;

        match resolved.scheme() {
            "http" | "https" => Ok(resolved),
            other => Err(StepError::Navigation(format!(
                "unsupported URL scheme '{other}' in '{resolved}'"
            ))),
        }
    }

    /// Scroll to the element and click its center point. Split out because
    /// fill() reuses it to focus the target control.
    async fn click_element(
        &self,
        element: &chromiumoxide::element::Element,
        target: &LocatorSpec,
    ) -> Result<(), StepError> {
        element.scroll_into_view().await.map_err(|e| {
            StepError::Interaction(format!("failed to scroll {target} into view: {e}"))
        })?;

        // Clickable point fails when the element has no rendered box or is
        // fully obscured - exactly the "found but not actionable" case.
        let point = element.clickable_point().await.map_err(|e| {
            StepError::Interaction(format!("{target} has no clickable point: {e}"))
        })?;

        self.page
            .click(point)
            .await
            .map_err(|e| StepError::Interaction(format!("click on {target} failed: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl StepDriver for Session {
    async fn navigate(&mut self, url: &str) -> Result<(), StepError> {
        let target = self.target_url(url)?;
        debug!(url = %target, "navigating");

        tokio::time::timeout(NAVIGATION_TIMEOUT, self.page.goto(target.as_str()))
            .await
            .map_err(|_| {
                StepError::Navigation(format!(
                    "navigation to {target} timed out after {}ms",
                    NAVIGATION_TIMEOUT.as_millis()
                ))
            })?
            .map_err(|e| StepError::Navigation(format!("navigation to {target} failed: {e}")))?;

        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| StepError::Navigation(format!("page load did not complete: {e}")))?;

        Ok(())
    }

    async fn click(&mut self, target: &LocatorSpec, timeout: Duration) -> Result<(), StepError> {
        let element = wait_visible(&self.page, target, timeout).await?;
        self.click_element(&element, target).await
    }

    async fn fill(
        &mut self,
        target: &LocatorSpec,
        value: &str,
        timeout: Duration,
    ) -> Result<(), StepError> {
        let element = wait_visible(&self.page, target, timeout).await?;

        // Focus via a real click, then clear before typing
        self.click_element(&element, target).await?;

        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(|e| {
                StepError::Interaction(format!("failed to clear {target} before fill: {e}"))
            })?;

        element.type_str(value).await.map_err(|e| {
            StepError::Interaction(format!("typing into {target} failed: {e}"))
        })?;

        Ok(())
    }

    async fn assert_visible(
        &mut self,
        target: &LocatorSpec,
        timeout: Duration,
    ) -> Result<(), StepError> {
        wait_visible(&self.page, target, timeout).await.map(|_| ())
    }

    async fn pause(&mut self, duration: Duration) -> Result<(), StepError> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    async fn screenshot(
        &mut self,
        target: Option<&LocatorSpec>,
        path: &Path,
    ) -> Result<(), StepError> {
        match target {
            Some(spec) => {
                let element =
                    wait_visible(&self.page, spec, crate::wait::default_timeout()).await?;
                artifact::capture_element(&element, path).await
            }
            None => artifact::capture_page(&self.page, path).await,
        }
    }

    async fn teardown(&mut self) {
        self.handle.shutdown().await;
    }
}
