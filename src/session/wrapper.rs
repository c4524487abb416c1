//! Browser process ownership
//!
//! `BrowserHandle` couples the Chrome process, its CDP event-handler task,
//! and the temporary profile directory. The handler task MUST be aborted
//! when done or it runs indefinitely after the browser is closed.

use chromiumoxide::browser::Browser;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct BrowserHandle {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserHandle {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the browser process and remove the temp profile directory.
    ///
    /// Both `close()` and `wait()` are required: close sends the command,
    /// wait blocks until the process has actually exited. The profile
    /// directory can only be removed after that - Chrome holds file locks
    /// until exit, and Windows refuses to delete locked files.
    ///
    /// Safe to call more than once; subsequent calls are no-ops.
    pub(crate) async fn shutdown(&mut self) {
        if self.user_data_dir.is_none() {
            return;
        }

        info!("Shutting down browser");

        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }

        if let Some(path) = self.user_data_dir.take() {
            info!("Cleaning up temp profile directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up temp profile directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserHandle {
    fn drop(&mut self) {
        self.handler.abort();

        // Drop without shutdown() means the profile dir is orphaned;
        // Browser::drop() still kills the Chrome process.
        if let Some(path) = self.user_data_dir.as_ref() {
            warn!(
                "BrowserHandle dropped without explicit shutdown. \
                 Temp profile directory will be orphaned: {}",
                path.display()
            );
        }
    }
}
