//! Screenshot persistence
//!
//! Writes PNG captures of the full page or a single element to
//! caller-specified paths, creating parent directories as needed. Write
//! failures are surfaced as `StepError::Io`, never retried.

use std::path::Path;

use chromiumoxide::Page;
use chromiumoxide::element::Element;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide_cdp::cdp::browser_protocol::page::CaptureScreenshotFormat;
use tracing::info;

use crate::error::StepError;

/// Capture the full page as PNG and write it to `path`.
pub async fn capture_page(page: &Page, path: &Path) -> Result<(), StepError> {
    let params = ScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Png)
        .build();

    let image_data = page
        .screenshot(params)
        .await
        .map_err(|e| StepError::Interaction(format!("page screenshot failed: {e}")))?;

    write_artifact(&image_data, path).await
}

/// Capture a single element as PNG and write it to `path`.
///
/// Fails with `Interaction` when the element has no rendered box (hidden or
/// zero-sized elements cannot be captured).
pub async fn capture_element(element: &Element, path: &Path) -> Result<(), StepError> {
    let image_data = element
        .screenshot(CaptureScreenshotFormat::Png)
        .await
        .map_err(|e| StepError::Interaction(format!("element screenshot failed: {e}")))?;

    write_artifact(&image_data, path).await
}

async fn write_artifact(image_data: &[u8], path: &Path) -> Result<(), StepError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    tokio::fs::write(path, image_data).await?;

    info!(
        path = %path.display(),
        bytes = image_data.len(),
        "screenshot written"
    );
    Ok(())
}
