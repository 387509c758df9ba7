//! Managed browser launch.

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::BrowserConfig as BrowserSettings;
use crate::error::SessionError;

/// Desktop user agent presented by managed sessions.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Kept in sync with the form's expected desktop layout.
const WINDOW_WIDTH: u32 = 1366;
const WINDOW_HEIGHT: u32 = 768;

/// Launch a managed browser and open a blank page.
pub async fn launch_browser(settings: &BrowserSettings) -> Result<(Browser, Page), SessionError> {
    info!("🚀 Launching browser...");

    let mut builder = BrowserConfig::builder()
        .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
        .args(vec![
            "--no-sandbox",
            "--disable-setuid-sandbox",
            "--disable-web-security",
            "--disable-features=IsolateOrigins,site-per-process",
            "--disable-dev-shm-usage",
        ]);

    builder = if settings.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };

    if let Some(executable) = &settings.executable {
        builder = builder.chrome_executable(executable);
    }

    let config = builder
        .build()
        .map_err(SessionError::LaunchConfig)?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| SessionError::LaunchFailed { source: e })?;
    debug!("browser launched");

    // Drain browser events in the background.
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // Short delay to let browser state sync.
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| SessionError::PageCreationFailed { source: e })?;

    page.set_user_agent(USER_AGENT).await?;

    info!("✓ Browser ready");
    Ok((browser, page))
}
