//! Fill-and-submit flow - workflow layer.
//!
//! Core responsibility: the complete handling of one submission attempt.
//!
//! Flow order:
//! 1. ensure the session is positioned on the form (navigate only if needed)
//! 2. pointer noise → paced field-by-field fill (conditionals checked
//!    against live form state)
//! 3. pre-submission pause → submit → bounded post-submit wait
//! 4. outcome classification
//!
//! The flow holds no page resource itself; it only drives the session
//! driver. A session fault never escapes: it is captured as a diagnostic
//! snapshot plus an `Error` outcome, so one bad record cannot take down the
//! run.

use serde_json::Value as JsonValue;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use crate::config::{Config, DelayConfig, TypingConfig};
use crate::error::SessionError;
use crate::models::lead::LeadRecord;
use crate::services::field_mapper::{selectors, FieldAction, FieldMapper};
use crate::services::ledger::RowStatus;
use crate::services::pacer::Pacer;
use crate::session::driver::SessionDriver;
use crate::workflow::lead_ctx::LeadCtx;

// Matches the managed browser's window size.
const VIEWPORT_WIDTH: u32 = 1366;
const VIEWPORT_HEIGHT: u32 = 768;

/// Outcome of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The page left the add endpoint: the site accepted the lead.
    Success,
    /// The form re-rendered with validation markers; carries their text.
    ValidationFailure(Vec<String>),
    /// Still on the form, no validation markers. Treated as failure: the
    /// endpoint is still current, so nothing was demonstrably accepted.
    Ambiguous,
    /// The session itself faulted during fill or submit.
    Error(String),
}

impl SubmissionOutcome {
    /// Ledger status for this outcome.
    pub fn ledger_status(&self) -> RowStatus {
        match self {
            SubmissionOutcome::Success => RowStatus::Success,
            _ => RowStatus::Failed,
        }
    }

    /// Only session faults are worth retrying; a validation verdict on the
    /// same data will not change, and an ambiguous state may have been
    /// accepted.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmissionOutcome::Error(_))
    }
}

/// Fill-and-submit executor.
pub struct SubmitFlow {
    mapper: FieldMapper,
    pacer: Pacer,
    form_url: String,
    form_path: String,
    delays: DelayConfig,
    typing: TypingConfig,
}

impl SubmitFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            mapper: FieldMapper::new(config),
            pacer: Pacer::new(),
            form_url: config.form_url.clone(),
            form_path: config.form_path.clone(),
            delays: config.delays.clone(),
            typing: config.typing.clone(),
        }
    }

    /// Execute one attempt. Infallible by design: every session fault is
    /// converted into an `Error` outcome after a best-effort snapshot.
    pub async fn run(
        &self,
        driver: &dyn SessionDriver,
        lead: &LeadRecord,
        ctx: &LeadCtx,
    ) -> SubmissionOutcome {
        info!("[lead {}] Filling form for: {}", ctx.lead_index, ctx.label);

        if let Err(e) = self.fill(driver, lead, ctx).await {
            error!("[lead {}] Error filling form: {}", ctx.lead_index, e);
            self.snapshot(driver, "form_fill_error", ctx).await;
            return SubmissionOutcome::Error(e.to_string());
        }

        match self.submit(driver, ctx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("[lead {}] Error submitting form: {}", ctx.lead_index, e);
                self.snapshot(driver, "submission_error", ctx).await;
                SubmissionOutcome::Error(e.to_string())
            }
        }
    }

    // ========== fill phase ==========

    async fn fill(
        &self,
        driver: &dyn SessionDriver,
        lead: &LeadRecord,
        ctx: &LeadCtx,
    ) -> Result<(), SessionError> {
        // Navigate only if the session is not already on the form; repeat
        // attempts land on the re-rendered add page and can skip the load.
        let location = driver.current_location().await?;
        if !location.contains(&self.form_path) {
            debug!("[lead {}] navigating to {}", ctx.lead_index, self.form_url);
            driver.navigate(&self.form_url).await?;
            sleep(Duration::from_millis(self.delays.page_load_ms)).await;
        }

        self.pointer_noise(driver).await?;

        let plan = self.mapper.build_plan(lead);
        for step in &plan.steps {
            // Conditional steps check live form state: visibility depends
            // on what earlier steps revealed.
            if step.conditional && !driver.field_exists(step.field).await? {
                debug!("[lead {}] {} not present, skipped", ctx.lead_index, step.field);
                continue;
            }

            match &step.action {
                FieldAction::Type(value) => {
                    driver.focus_field(step.field).await?;
                    driver.clear_field(step.field).await?;
                    for ch in value.chars() {
                        driver.type_character(step.field, ch).await?;
                        sleep(Duration::from_millis(self.pacer.jitter(&self.typing.delay)))
                            .await;
                    }
                }
                FieldAction::Select(value) => {
                    driver.select_option(step.field, value).await?;
                }
            }

            if step.settle_ms > 0 {
                sleep(Duration::from_millis(step.settle_ms)).await;
            }

            sleep(Duration::from_millis(
                self.pacer.jitter(&self.delays.between_fields),
            ))
            .await;
        }

        self.pointer_noise(driver).await?;

        info!("[lead {}] ✓ Form filled", ctx.lead_index);
        Ok(())
    }

    // ========== submit phase ==========

    async fn submit(
        &self,
        driver: &dyn SessionDriver,
        ctx: &LeadCtx,
    ) -> Result<SubmissionOutcome, SessionError> {
        // Pre-submission pause.
        sleep(Duration::from_millis(
            self.pacer.jitter(&self.delays.after_form_fill),
        ))
        .await;

        driver.click(selectors::SUBMIT_BUTTON).await?;

        // Bounded race: navigation settling vs. fixed timeout. Whichever
        // finishes first, classification starts from the page state after
        // it.
        driver
            .wait_for_navigation_or_timeout(self.delays.submit_wait_ms)
            .await?;

        self.classify(driver, ctx).await
    }

    async fn classify(
        &self,
        driver: &dyn SessionDriver,
        ctx: &LeadCtx,
    ) -> Result<SubmissionOutcome, SessionError> {
        // 1. Off the add endpoint: accepted.
        let location = driver.current_location().await?;
        if !location.contains(&self.form_path) {
            info!("[lead {}] ✓ Form submitted successfully", ctx.lead_index);
            return Ok(SubmissionOutcome::Success);
        }

        // 2. Validation markers: the site rejected the data and said why.
        let messages = self.validation_errors(driver).await?;
        if !messages.is_empty() {
            error!(
                "[lead {}] Validation errors: {}",
                ctx.lead_index,
                messages.join(", ")
            );
            return Ok(SubmissionOutcome::ValidationFailure(messages));
        }

        // 3. Still on the form with nothing to point at.
        warn!(
            "[lead {}] ⚠️ Submission outcome ambiguous, recording as failed",
            ctx.lead_index
        );
        Ok(SubmissionOutcome::Ambiguous)
    }

    async fn validation_errors(
        &self,
        driver: &dyn SessionDriver,
    ) -> Result<Vec<String>, SessionError> {
        let js = r#"
            Array.from(document.querySelectorAll('.field-validation-error'))
                .map(el => (el.textContent || '').trim())
                .filter(t => t.length > 0)
        "#;

        let value = driver.evaluate(js).await?;
        match value {
            JsonValue::Array(_) => Ok(serde_json::from_value(value)?),
            _ => Ok(Vec::new()),
        }
    }

    // ========== humanization ==========

    /// Cosmetic pointer movement: lightweight DOM reads at random points to
    /// mimic attention. No functional effect on the form.
    async fn pointer_noise(&self, driver: &dyn SessionDriver) -> Result<(), SessionError> {
        for (x, y) in self.pacer.pointer_path(VIEWPORT_WIDTH, VIEWPORT_HEIGHT) {
            driver
                .evaluate(&format!("document.elementFromPoint({x}, {y})?.tagName"))
                .await?;
            sleep(Duration::from_millis(self.pacer.delay(40, 120))).await;
        }
        Ok(())
    }

    async fn snapshot(&self, driver: &dyn SessionDriver, stage: &str, ctx: &LeadCtx) {
        match driver.capture_diagnostic_snapshot(stage).await {
            Ok(path) => info!(
                "[lead {}] Snapshot saved: {}",
                ctx.lead_index,
                path.display()
            ),
            Err(e) => warn!("[lead {}] Failed to save snapshot: {}", ctx.lead_index, e),
        }
    }
}
