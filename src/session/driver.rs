//! Session driver - infrastructure layer.
//!
//! The driver is the only component that touches the live browser session.
//! It holds the page resource and exposes a narrow set of primitives; it
//! does not know what a lead is and does not sequence any flow.

use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Duration};
use tracing::debug;

use crate::error::SessionError;

/// The primitive interface the core drives a browser session through.
#[async_trait]
pub trait SessionDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    /// Current page URL, empty if the page has none yet.
    async fn current_location(&self) -> Result<String, SessionError>;

    async fn focus_field(&self, id: &str) -> Result<(), SessionError>;

    async fn clear_field(&self, id: &str) -> Result<(), SessionError>;

    async fn type_character(&self, id: &str, ch: char) -> Result<(), SessionError>;

    async fn select_option(&self, id: &str, value: &str) -> Result<(), SessionError>;

    async fn click(&self, selector: &str) -> Result<(), SessionError>;

    async fn field_exists(&self, id: &str) -> Result<bool, SessionError>;

    /// Bounded race between "a navigation settles" and "the timeout
    /// elapses"; returns when the first of the two happens.
    async fn wait_for_navigation_or_timeout(&self, ms: u64) -> Result<(), SessionError>;

    /// Evaluate a script in the page and return its JSON result.
    async fn evaluate(&self, js: &str) -> Result<JsonValue, SessionError>;

    /// Best-effort full-page snapshot for diagnostics, keyed by stage name
    /// and timestamp. Returns the written path.
    async fn capture_diagnostic_snapshot(&self, name: &str) -> Result<PathBuf, SessionError>;
}

/// Production driver backed by a chromiumoxide page.
pub struct CdpDriver {
    page: Page,
    snapshots_dir: PathBuf,
}

impl CdpDriver {
    pub fn new(page: Page, snapshots_dir: impl Into<PathBuf>) -> Self {
        Self {
            page,
            snapshots_dir: snapshots_dir.into(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Quote a selector for safe interpolation into page scripts.
    fn quote(selector: &str) -> String {
        serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string())
    }
}

#[async_trait]
impl SessionDriver for CdpDriver {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| SessionError::NavigationFailed {
                url: url.to_string(),
                source: e,
            })?;
        Ok(())
    }

    async fn current_location(&self) -> Result<String, SessionError> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn focus_field(&self, id: &str) -> Result<(), SessionError> {
        let js = format!("document.querySelector({})?.focus()", Self::quote(id));
        self.page.evaluate(js).await?;
        Ok(())
    }

    async fn clear_field(&self, id: &str) -> Result<(), SessionError> {
        let js = format!(
            "(() => {{ const el = document.querySelector({}); if (el) el.value = ''; }})()",
            Self::quote(id)
        );
        self.page.evaluate(js).await?;
        Ok(())
    }

    async fn type_character(&self, id: &str, ch: char) -> Result<(), SessionError> {
        let element = self
            .page
            .find_element(id)
            .await
            .map_err(|_| SessionError::FieldNotFound { id: id.to_string() })?;
        element.type_str(ch.to_string()).await?;
        Ok(())
    }

    async fn select_option(&self, id: &str, value: &str) -> Result<(), SessionError> {
        // Set the option and fire the events a manual selection would, so
        // the form's own change handlers run.
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.value = {val};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            sel = Self::quote(id),
            val = Self::quote(value),
        );

        let found: bool = self.page.evaluate(js).await?.into_value()?;
        if !found {
            return Err(SessionError::FieldNotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), SessionError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| SessionError::FieldNotFound {
                id: selector.to_string(),
            })?;
        element.click().await?;
        Ok(())
    }

    async fn field_exists(&self, id: &str) -> Result<bool, SessionError> {
        let js = format!(
            "document.querySelector({}) !== null",
            Self::quote(id)
        );
        Ok(self.page.evaluate(js).await?.into_value()?)
    }

    async fn wait_for_navigation_or_timeout(&self, ms: u64) -> Result<(), SessionError> {
        tokio::select! {
            result = self.page.wait_for_navigation() => {
                if let Err(e) = result {
                    debug!("navigation wait ended with error: {e}");
                }
            }
            _ = sleep(Duration::from_millis(ms)) => {
                debug!("navigation wait timed out after {ms} ms");
            }
        }
        Ok(())
    }

    async fn evaluate(&self, js: &str) -> Result<JsonValue, SessionError> {
        Ok(self.page.evaluate(js.to_string()).await?.into_value()?)
    }

    async fn capture_diagnostic_snapshot(&self, name: &str) -> Result<PathBuf, SessionError> {
        if !self.snapshots_dir.exists() {
            std::fs::create_dir_all(&self.snapshots_dir).map_err(|e| {
                SessionError::SnapshotFailed {
                    source: chromiumoxide::error::CdpError::Io(e),
                }
            })?;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let path = self.snapshots_dir.join(format!("{name}_{timestamp}.png"));

        self.page
            .save_screenshot(
                ScreenshotParams::builder().full_page(true).build(),
                &path,
            )
            .await
            .map_err(|e| SessionError::SnapshotFailed { source: e })?;

        debug!("snapshot saved: {}", path.display());
        Ok(path)
    }
}
