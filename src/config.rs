//! Program configuration.
//!
//! Every knob has a default tuned for the production form, so a missing or
//! empty config file yields a runnable setup. A TOML file overrides only the
//! sections it names.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// An inclusive `[min, max]` millisecond range for jittered waits.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }
}

/// Browser lifecycle configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// `"launch"` starts a managed browser; `"connect"` attaches to an
    /// operator's browser over the CDP debug port.
    pub mode: String,
    /// Debug port for `connect` mode.
    pub debug_port: u16,
    /// Run the managed browser headless.
    pub headless: bool,
    /// Explicit browser executable for `launch` mode.
    pub executable: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            mode: "launch".to_string(),
            debug_port: 2001,
            headless: false,
            executable: None,
        }
    }
}

/// Login / session-readiness configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// `"direct"` navigates straight to the form; `"manual"` waits for the
    /// operator to log in by hand and then verifies form availability.
    pub mode: String,
    /// Total time allowed for one verification pass (ms).
    pub verify_timeout_ms: u64,
    /// Interval between form-availability checks (ms).
    pub poll_interval_ms: u64,
    /// How many times a timed-out verification re-prompts the operator.
    pub max_attempts: usize,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            mode: "direct".to_string(),
            verify_timeout_ms: 120_000,
            poll_interval_ms: 3_000,
            max_attempts: 3,
        }
    }
}

/// Timing configuration (milliseconds).
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Pause between individual field writes.
    pub between_fields: DelayRange,
    /// Pause after the whole form is filled, before submitting.
    pub after_form_fill: DelayRange,
    /// Pause between consecutive submissions.
    pub between_submissions: DelayRange,
    /// Settle time after a fresh page load.
    pub page_load_ms: u64,
    /// Bound on the post-submit navigation wait.
    pub submit_wait_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            between_fields: DelayRange::new(100, 300),
            after_form_fill: DelayRange::new(1_000, 2_000),
            between_submissions: DelayRange::new(10_000, 12_000),
            page_load_ms: 5_000,
            submit_wait_ms: 5_000,
        }
    }
}

/// Per-character typing delay.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    pub delay: DelayRange,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            delay: DelayRange::new(50, 150),
        }
    }
}

/// Batch pacing: an extended pause after every `size` submissions, on top of
/// the ordinary inter-submission delay.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub size: usize,
    pub pause_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: 10,
            pause_ms: 30_000,
        }
    }
}

/// Per-record retry policy. Consumed by the scheduler: only session faults
/// are retried, never the target site's validation verdicts.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per record, including the first.
    pub max_attempts: usize,
    /// Wait between attempts (ms).
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 5_000,
        }
    }
}

/// Program configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Full URL of the lead-entry form.
    pub form_url: String,
    /// Path fragment identifying the add endpoint; the executor treats any
    /// location containing it as "still on the form".
    pub form_path: String,
    /// Lead input file (`[[leads]]` tables).
    pub leads_file: String,
    /// Added to a record's 0-based position to recover the operator's
    /// spreadsheet row number (1-based rows plus a header row).
    pub header_offset: usize,
    /// Directory for per-run result artifacts.
    pub results_dir: String,
    /// Directory for diagnostic snapshots.
    pub snapshots_dir: String,
    /// Plain-text run log file.
    pub output_log_file: String,
    /// Fallback form code for unknown or missing states.
    pub fallback_state_code: String,
    /// Per-run additions/overrides for the state-code table.
    pub state_overrides: HashMap<String, String>,

    pub browser: BrowserConfig,
    pub login: LoginConfig,
    pub delays: DelayConfig,
    pub typing: TypingConfig,
    pub batch: BatchConfig,
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            form_url: "https://the-leadzone.com/Lead/Add".to_string(),
            form_path: "/Lead/Add".to_string(),
            leads_file: "leads.toml".to_string(),
            header_offset: 2,
            results_dir: ".".to_string(),
            snapshots_dir: "screenshots".to_string(),
            output_log_file: "automation.log".to_string(),
            fallback_state_code: "1".to_string(),
            state_overrides: HashMap::new(),
            browser: BrowserConfig::default(),
            login: LoginConfig::default(),
            delays: DelayConfig::default(),
            typing: TypingConfig::default(),
            batch: BatchConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. A missing file yields the
    /// defaults; an unreadable or unparsable one is a fatal error.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_string(),
            source: e,
        })
    }
}
