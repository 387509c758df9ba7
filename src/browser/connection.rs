//! Attach to an operator's running browser.
//!
//! Connect mode exists for manual-login workflows: the operator starts their
//! own browser with remote debugging enabled, signs in, and the automation
//! attaches to that session instead of launching a fresh one.

use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::SessionError;

/// Connect to a browser over the CDP debug port and pick a page.
///
/// When `target_fragment` is given, a tab whose URL already contains it is
/// reused; otherwise a new page is opened (navigated to `target_url` when
/// provided, blank otherwise).
pub async fn connect_to_browser_and_page(
    port: u16,
    target_url: Option<&str>,
    target_fragment: Option<&str>,
) -> Result<(Browser, Page), SessionError> {
    let browser_url = format!("http://localhost:{}", port);
    info!("Connecting to browser: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url)
        .await
        .map_err(|e| SessionError::ConnectionFailed { port, source: e })?;
    debug!("browser connection established");

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

    let pages = browser
        .pages()
        .await
        .map_err(|e| SessionError::PageCreationFailed { source: e })?;
    debug!("found {} open page(s)", pages.len());

    // Reuse a tab that is already on the target site, if any.
    if let Some(fragment) = target_fragment {
        for p in pages.iter() {
            if let Ok(Some(url)) = p.url().await {
                if url.contains(fragment) {
                    info!("✓ Reusing open tab: {}", url);
                    return Ok((browser, p.clone()));
                }
            }
        }
        debug!("no open tab matches '{fragment}', opening a new page");
    }

    let new_page = match target_url {
        Some(url) => {
            debug!("opening new page at {url}");
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| SessionError::PageCreationFailed { source: e })?;
            page.goto(url)
                .await
                .map_err(|e| SessionError::NavigationFailed {
                    url: url.to_string(),
                    source: e,
                })?;
            info!("✓ Navigated to: {url}");
            page
        }
        None => browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::PageCreationFailed { source: e })?,
    };

    Ok((browser, new_page))
}
