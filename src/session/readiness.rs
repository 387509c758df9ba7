//! Session readiness strategies.
//!
//! The orchestrator does not care how the session becomes usable - it only
//! needs `ensure_ready` to block until the target form can be driven, or to
//! fail with a typed session error. Two strategies cover the login modes:
//! direct navigation for sessions that need no login, and a manual-login
//! verification state machine for sessions where the operator signs in by
//! hand first.

use std::time::Instant;

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::error::SessionError;
use crate::session::driver::SessionDriver;

/// Blocks until the target form is usable or signals failure.
#[async_trait]
pub trait SessionReadiness: Send + Sync {
    async fn ensure_ready(&self, driver: &dyn SessionDriver) -> Result<(), SessionError>;
}

/// External "wait for human acknowledgment" capability.
#[async_trait]
pub trait OperatorPrompt: Send + Sync {
    async fn await_acknowledgment(&self, message: &str) -> Result<(), SessionError>;
}

/// Console prompt: print the message and block on a line of input.
pub struct ConsolePrompt;

#[async_trait]
impl OperatorPrompt for ConsolePrompt {
    async fn await_acknowledgment(&self, message: &str) -> Result<(), SessionError> {
        println!("\n{message}");
        println!("Press Enter to continue...");

        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| ())
        })
        .await
        .map_err(|e| SessionError::OperatorUnavailable(e.to_string()))?
        .map_err(|e| SessionError::OperatorUnavailable(e.to_string()))
    }
}

/// Fully automated readiness: navigate to the form and let it settle.
pub struct DirectNavigation {
    form_url: String,
    form_path: String,
    page_load_ms: u64,
}

impl DirectNavigation {
    pub fn new(form_url: impl Into<String>, form_path: impl Into<String>, page_load_ms: u64) -> Self {
        Self {
            form_url: form_url.into(),
            form_path: form_path.into(),
            page_load_ms,
        }
    }
}

#[async_trait]
impl SessionReadiness for DirectNavigation {
    async fn ensure_ready(&self, driver: &dyn SessionDriver) -> Result<(), SessionError> {
        let location = driver.current_location().await?;
        if location.contains(&self.form_path) {
            info!("Session already positioned on the form");
            return Ok(());
        }

        info!("Navigating to {}", self.form_url);
        driver.navigate(&self.form_url).await?;
        sleep(Duration::from_millis(self.page_load_ms)).await;
        Ok(())
    }
}

/// Verification phases for manual login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerifyPhase {
    AwaitingManualLogin,
    Verifying,
    Verified,
    VerificationTimedOut,
}

/// Manual-login readiness: the operator signs in by hand, then the strategy
/// verifies form availability by polling for a probe field.
pub struct ManualLogin<P: OperatorPrompt> {
    form_url: String,
    /// Field that only exists once the form is reachable and rendered.
    ready_probe: String,
    verify_timeout_ms: u64,
    poll_interval_ms: u64,
    max_attempts: usize,
    prompt: P,
}

impl<P: OperatorPrompt> ManualLogin<P> {
    pub fn new(
        form_url: impl Into<String>,
        ready_probe: impl Into<String>,
        verify_timeout_ms: u64,
        poll_interval_ms: u64,
        max_attempts: usize,
        prompt: P,
    ) -> Self {
        Self {
            form_url: form_url.into(),
            ready_probe: ready_probe.into(),
            verify_timeout_ms,
            poll_interval_ms,
            max_attempts: max_attempts.max(1),
            prompt,
        }
    }

    async fn verify(&self, driver: &dyn SessionDriver) -> Result<VerifyPhase, SessionError> {
        driver.navigate(&self.form_url).await?;

        let deadline = Instant::now() + std::time::Duration::from_millis(self.verify_timeout_ms);
        loop {
            if driver.field_exists(&self.ready_probe).await? {
                return Ok(VerifyPhase::Verified);
            }
            if Instant::now() >= deadline {
                return Ok(VerifyPhase::VerificationTimedOut);
            }
            sleep(Duration::from_millis(self.poll_interval_ms)).await;
        }
    }
}

#[async_trait]
impl<P: OperatorPrompt> SessionReadiness for ManualLogin<P> {
    async fn ensure_ready(&self, driver: &dyn SessionDriver) -> Result<(), SessionError> {
        for attempt in 1..=self.max_attempts {
            // AwaitingManualLogin: block on the operator.
            self.prompt
                .await_acknowledgment(
                    "Log in to the target site in the browser window, then confirm here.",
                )
                .await?;

            // Verifying: poll for the probe field until the timeout.
            info!(
                "Verifying form availability (attempt {}/{})...",
                attempt, self.max_attempts
            );

            match self.verify(driver).await? {
                VerifyPhase::Verified => {
                    info!("✓ Login verified, form is usable");
                    return Ok(());
                }
                VerifyPhase::VerificationTimedOut => {
                    warn!(
                        "⚠️ Form not reachable within {} ms (attempt {}/{})",
                        self.verify_timeout_ms, attempt, self.max_attempts
                    );
                }
                // verify() only returns terminal phases.
                VerifyPhase::AwaitingManualLogin | VerifyPhase::Verifying => unreachable!(),
            }
        }

        Err(SessionError::VerificationTimedOut {
            attempts: self.max_attempts,
        })
    }
}
