//! Batch runner - orchestration layer.
//!
//! ## Responsibilities
//!
//! 1. **Selection**: take the `[start, start + max)` sub-sequence of the
//!    lead list, preserving original ordering
//! 2. **Sequencing**: one record at a time through the submit flow - no
//!    concurrent submissions, one interaction stream
//! 3. **Retry**: bounded re-attempts for session faults only
//! 4. **Pacing**: inter-submission jitter plus an extended pause after each
//!    full batch
//! 5. **Bookkeeping**: one ledger row per attempted record, threaded
//!    through and returned - no ambient mutable state

use std::ops::Range;

use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::config::{Config, RetryConfig};
use crate::models::lead::LeadRecord;
use crate::services::ledger::RunLedger;
use crate::services::pacer::Pacer;
use crate::session::driver::SessionDriver;
use crate::utils::logging::{log_lead_start, log_leads_loaded};
use crate::workflow::lead_ctx::LeadCtx;
use crate::workflow::submit_flow::{SubmissionOutcome, SubmitFlow};

/// Operator-facing run selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// 0-based offset into the source sequence.
    pub start_offset: usize,
    /// Cap on how many records to process; `None` runs to the end.
    pub max_records: Option<usize>,
}

/// Clamp the requested sub-sequence to the source bounds.
pub fn select_range(total: usize, opts: &RunOptions) -> Range<usize> {
    let start = opts.start_offset.min(total);
    let end = match opts.max_records {
        Some(max) => start.saturating_add(max).min(total),
        None => total,
    };
    start..end
}

/// Whether an extended batch pause is due after `completed` records.
/// Never pauses after the final record - there is nothing left to pace.
pub fn batch_pause_due(completed: usize, total: usize, batch_size: usize) -> bool {
    batch_size > 0 && completed < total && completed % batch_size == 0
}

/// Drive the selected records through the submit flow, returning the run
/// ledger.
///
/// Strictly sequential. A per-record failure is recorded and the loop
/// continues; nothing below the source read can abort the run.
pub async fn run_batch(
    driver: &dyn SessionDriver,
    flow: &SubmitFlow,
    leads: &[LeadRecord],
    opts: &RunOptions,
    config: &Config,
) -> RunLedger {
    let range = select_range(leads.len(), opts);
    let selection = &leads[range];
    let total = selection.len();

    log_leads_loaded(leads.len(), opts.start_offset, total);

    let pacer = Pacer::new();
    let mut ledger = RunLedger::new();

    for (i, lead) in selection.iter().enumerate() {
        let source_row = opts.start_offset + i + config.header_offset;
        let ctx = LeadCtx::new(source_row, i + 1, total, lead.label());

        log_lead_start(ctx.lead_index, total, source_row, &ctx.label);

        let outcome = attempt_with_retry(driver, flow, lead, &ctx, &config.retry).await;
        ledger.record(source_row, ctx.label.clone(), outcome.ledger_status());

        let completed = i + 1;
        if completed < total {
            let wait = pacer.jitter(&config.delays.between_submissions);
            info!(
                "Waiting {} second(s) before next submission...",
                wait.div_ceil(1000)
            );
            sleep(Duration::from_millis(wait)).await;

            if batch_pause_due(completed, total, config.batch.size) {
                info!(
                    "📦 Completed batch of {}. Pausing for {} second(s)...",
                    config.batch.size,
                    config.batch.pause_ms / 1000
                );
                sleep(Duration::from_millis(config.batch.pause_ms)).await;
            }
        }
    }

    ledger
}

/// Bounded retry around one submission attempt. Only session faults are
/// retried; the site's verdicts are final.
async fn attempt_with_retry(
    driver: &dyn SessionDriver,
    flow: &SubmitFlow,
    lead: &LeadRecord,
    ctx: &LeadCtx,
    retry: &RetryConfig,
) -> SubmissionOutcome {
    let max_attempts = retry.max_attempts.max(1);

    let mut outcome = flow.run(driver, lead, ctx).await;
    let mut attempt = 1;

    while outcome.is_retryable() && attempt < max_attempts {
        attempt += 1;
        warn!(
            "[lead {}] 🔁 Session fault, retrying (attempt {}/{})",
            ctx.lead_index, attempt, max_attempts
        );
        sleep(Duration::from_millis(retry.delay_ms)).await;
        outcome = flow.run(driver, lead, ctx).await;
    }

    outcome
}
