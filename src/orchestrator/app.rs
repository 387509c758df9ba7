//! Application orchestrator.
//!
//! ## Responsibilities
//!
//! 1. **Initialization**: run-log header, browser lifecycle (launch or
//!    connect), session driver construction, readiness-strategy selection
//! 2. **Run**: readiness gate → lead loading → batch run → ledger
//!    finalization → summary
//! 3. **Resource ownership**: the only holder of the `Browser`; the driver
//!    and flow never outlive it
//!
//! One orchestrator for every login mode - the differences live entirely in
//! the injected readiness strategy.

use anyhow::Result;
use chromiumoxide::Browser;
use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::models::load_leads;
use crate::orchestrator::batch_runner::{self, RunOptions};
use crate::services::field_mapper::selectors;
use crate::services::ledger::RunLedger;
use crate::session::driver::CdpDriver;
use crate::session::readiness::{ConsolePrompt, DirectNavigation, ManualLogin, SessionReadiness};
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};
use crate::workflow::submit_flow::SubmitFlow;

/// Application main structure.
pub struct App {
    config: Config,
    browser: Browser,
    /// Whether this process launched the browser (and may close it).
    managed: bool,
    driver: CdpDriver,
    readiness: Box<dyn SessionReadiness>,
}

impl App {
    /// Initialize the application: log file, browser session, driver and
    /// readiness strategy. Failures here are fatal.
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(config.batch.size, config.retry.max_attempts);

        let (browser, page, managed) = if config.browser.mode == "connect" {
            let (browser, page) = browser::connect_to_browser_and_page(
                config.browser.debug_port,
                None,
                Some(&config.form_path),
            )
            .await?;
            (browser, page, false)
        } else {
            let (browser, page) = browser::launch_browser(&config.browser).await?;
            (browser, page, true)
        };

        let driver = CdpDriver::new(page, &config.snapshots_dir);
        let readiness = Self::readiness_for(&config);

        Ok(Self {
            config,
            browser,
            managed,
            driver,
            readiness,
        })
    }

    fn readiness_for(config: &Config) -> Box<dyn SessionReadiness> {
        if config.login.mode == "manual" {
            Box::new(ManualLogin::new(
                config.form_url.clone(),
                selectors::FIRST_NAME,
                config.login.verify_timeout_ms,
                config.login.poll_interval_ms,
                config.login.max_attempts,
                ConsolePrompt,
            ))
        } else {
            Box::new(DirectNavigation::new(
                config.form_url.clone(),
                config.form_path.clone(),
                config.delays.page_load_ms,
            ))
        }
    }

    /// Run the selected records through the pipeline and persist the
    /// ledger.
    pub async fn run(&self, opts: RunOptions) -> Result<RunLedger> {
        // Session must be usable before anything is read or typed.
        self.readiness.ensure_ready(&self.driver).await?;

        let leads = load_leads(&self.config.leads_file).await?;
        if leads.is_empty() {
            warn!("⚠️ Lead file contains no records, nothing to do");
            return Ok(RunLedger::new());
        }

        let flow = SubmitFlow::new(&self.config);
        let ledger =
            batch_runner::run_batch(&self.driver, &flow, &leads, &opts, &self.config).await;

        if !ledger.is_empty() {
            let path = ledger.finalize(&self.config.results_dir)?;
            info!("Detailed results saved to: {}", path.display());
        }

        print_final_stats(&ledger, &self.config.output_log_file);

        Ok(ledger)
    }

    /// Tear the session down. Only a browser this process launched is
    /// closed; an operator's own browser is left running.
    pub async fn shutdown(mut self) {
        if !self.managed {
            info!("Leaving operator's browser running");
            return;
        }

        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {e}");
        }
        let _ = self.browser.wait().await;
        info!("Browser closed");
    }
}
