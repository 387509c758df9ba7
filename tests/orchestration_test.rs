//! End-to-end orchestration tests against a scripted in-memory session
//! driver. No browser required.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use lead_form_submit::config::{Config, DelayRange};
use lead_form_submit::error::SessionError;
use lead_form_submit::models::LeadRecord;
use lead_form_submit::orchestrator::{run_batch, RunOptions};
use lead_form_submit::services::RowStatus;
use lead_form_submit::session::readiness::{ManualLogin, OperatorPrompt, SessionReadiness};
use lead_form_submit::session::SessionDriver;
use lead_form_submit::workflow::{LeadCtx, SubmissionOutcome, SubmitFlow};

#[derive(Default)]
struct DriverState {
    location: String,
    /// Locations applied (front first) each time the save button is
    /// clicked; an empty queue leaves the location unchanged.
    post_submit_locations: VecDeque<String>,
    /// Fields reported present to conditional-step probes and readiness.
    existing_fields: HashSet<String>,
    /// Accumulated text per field.
    typed: HashMap<String, String>,
    selected: HashMap<String, String>,
    validation_errors: Vec<String>,
    snapshots: Vec<String>,
    navigations: Vec<String>,
    clicks: Vec<String>,
    /// Fail this many type_character calls on the named field.
    fail_typing: Option<(String, usize)>,
    /// field_exists calls remaining before `existing_fields` applies;
    /// until then every probe reports absent.
    exists_after_probes: usize,
    probes: usize,
}

#[derive(Default)]
struct FakeDriver {
    state: Mutex<DriverState>,
}

impl FakeDriver {
    fn new(state: DriverState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut DriverState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

#[async_trait]
impl SessionDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.with(|s| {
            s.navigations.push(url.to_string());
            s.location = url.to_string();
        });
        Ok(())
    }

    async fn current_location(&self) -> Result<String, SessionError> {
        Ok(self.with(|s| s.location.clone()))
    }

    async fn focus_field(&self, _id: &str) -> Result<(), SessionError> {
        Ok(())
    }

    async fn clear_field(&self, id: &str) -> Result<(), SessionError> {
        self.with(|s| {
            s.typed.insert(id.to_string(), String::new());
        });
        Ok(())
    }

    async fn type_character(&self, id: &str, ch: char) -> Result<(), SessionError> {
        self.with(|s| {
            if let Some((field, remaining)) = &mut s.fail_typing {
                if field.as_str() == id && *remaining > 0 {
                    *remaining -= 1;
                    return Err(SessionError::FieldNotFound { id: id.to_string() });
                }
            }
            s.typed.entry(id.to_string()).or_default().push(ch);
            Ok(())
        })
    }

    async fn select_option(&self, id: &str, value: &str) -> Result<(), SessionError> {
        self.with(|s| {
            s.selected.insert(id.to_string(), value.to_string());
        });
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), SessionError> {
        self.with(|s| {
            s.clicks.push(selector.to_string());
            if selector.contains("save") {
                if let Some(location) = s.post_submit_locations.pop_front() {
                    s.location = location;
                }
            }
        });
        Ok(())
    }

    async fn field_exists(&self, id: &str) -> Result<bool, SessionError> {
        Ok(self.with(|s| {
            s.probes += 1;
            if s.probes <= s.exists_after_probes {
                return false;
            }
            s.existing_fields.contains(id)
        }))
    }

    async fn wait_for_navigation_or_timeout(&self, _ms: u64) -> Result<(), SessionError> {
        Ok(())
    }

    async fn evaluate(&self, js: &str) -> Result<JsonValue, SessionError> {
        if js.contains("field-validation-error") {
            return Ok(self.with(|s| json!(s.validation_errors)));
        }
        Ok(JsonValue::Null)
    }

    async fn capture_diagnostic_snapshot(&self, name: &str) -> Result<PathBuf, SessionError> {
        self.with(|s| s.snapshots.push(name.to_string()));
        Ok(PathBuf::from(format!("{name}.png")))
    }
}

fn fast_config() -> Config {
    let mut config = Config::default();
    config.delays.between_fields = DelayRange::new(0, 0);
    config.delays.after_form_fill = DelayRange::new(0, 0);
    config.delays.between_submissions = DelayRange::new(0, 0);
    config.delays.page_load_ms = 0;
    config.delays.submit_wait_ms = 0;
    config.typing.delay = DelayRange::new(0, 0);
    config.batch.pause_ms = 0;
    config.retry.delay_ms = 0;
    config
}

fn lead(index: usize, pairs: &[(&str, &str)]) -> LeadRecord {
    let fields = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    LeadRecord::new(index, fields)
}

fn jane(index: usize) -> LeadRecord {
    lead(
        index,
        &[
            ("First Name", "Jane"),
            ("Last Name", "Doe"),
            ("State", "CA"),
            ("Phone Number", "(555) 123-4567"),
            ("Zip Code", "90001"),
        ],
    )
}

fn ctx() -> LeadCtx {
    LeadCtx::new(2, 1, 1, "Jane Doe".to_string())
}

// ========== executor classification ==========

#[tokio::test]
async fn location_change_classifies_success() {
    let driver = FakeDriver::new(DriverState {
        post_submit_locations: VecDeque::from(["https://the-leadzone.com/Lead/Index".to_string()]),
        ..Default::default()
    });
    let config = fast_config();
    let flow = SubmitFlow::new(&config);

    let outcome = flow.run(&driver, &jane(0), &ctx()).await;

    assert_eq!(outcome, SubmissionOutcome::Success);
    driver.with(|s| {
        // The blank session navigated to the form exactly once.
        assert_eq!(s.navigations, vec![config.form_url.clone()]);
        // Values arrived character by character and normalized.
        assert_eq!(s.typed["#PhoneNumber"], "5551234567");
        assert_eq!(s.typed["#FirstName"], "Jane");
        assert_eq!(s.selected["#State"], "5");
        assert_eq!(s.selected["#PropertyState"], "5");
        assert_eq!(s.typed["#PropertyZip"], "90001");
        // Email only exists behind a live-form probe that reported absent.
        assert!(!s.typed.contains_key("#Email"));
        assert_eq!(s.clicks, vec!["button[value=\"save\"]".to_string()]);
    });
}

#[tokio::test]
async fn validation_markers_classify_failure_with_messages() {
    let driver = FakeDriver::new(DriverState {
        validation_errors: vec!["The Phone Number field is required.".to_string()],
        ..Default::default()
    });
    let config = fast_config();
    let flow = SubmitFlow::new(&config);

    let outcome = flow.run(&driver, &jane(0), &ctx()).await;

    assert_eq!(
        outcome,
        SubmissionOutcome::ValidationFailure(vec![
            "The Phone Number field is required.".to_string()
        ])
    );
    assert_eq!(outcome.ledger_status(), RowStatus::Failed);
}

#[tokio::test]
async fn unchanged_location_without_markers_is_ambiguous() {
    let driver = FakeDriver::new(DriverState::default());
    let config = fast_config();
    let flow = SubmitFlow::new(&config);

    let outcome = flow.run(&driver, &jane(0), &ctx()).await;

    assert_eq!(outcome, SubmissionOutcome::Ambiguous);
    assert_eq!(outcome.ledger_status(), RowStatus::Failed);
}

#[tokio::test]
async fn fill_fault_snapshots_and_returns_error() {
    let driver = FakeDriver::new(DriverState {
        fail_typing: Some(("#FirstName".to_string(), usize::MAX)),
        ..Default::default()
    });
    let config = fast_config();
    let flow = SubmitFlow::new(&config);

    let outcome = flow.run(&driver, &jane(0), &ctx()).await;

    assert!(matches!(outcome, SubmissionOutcome::Error(_)));
    driver.with(|s| {
        assert_eq!(s.snapshots, vec!["form_fill_error".to_string()]);
        // The submit button was never reached.
        assert!(s.clicks.is_empty());
    });
}

#[tokio::test]
async fn revealed_loan_fields_follow_live_form_state() {
    let mut existing = HashSet::new();
    existing.insert("#CurrentLender".to_string());
    // #CurrentRate is deliberately absent.
    let driver = FakeDriver::new(DriverState {
        post_submit_locations: VecDeque::from(["https://the-leadzone.com/Lead/Index".to_string()]),
        existing_fields: existing,
        ..Default::default()
    });
    let config = fast_config();
    let flow = SubmitFlow::new(&config);

    let lead = lead(
        0,
        &[
            ("First Name", "Jane"),
            ("Current mortgage balance", "$185,000"),
            ("Mortgage monthly payment", "1850.0"),
        ],
    );
    let outcome = flow.run(&driver, &lead, &ctx()).await;

    assert_eq!(outcome, SubmissionOutcome::Success);
    driver.with(|s| {
        // The reveal step itself is unconditional.
        assert_eq!(s.typed["#CurrentLoanProgramName"], "Conventional 80");
        // Probed present → written; probed absent → skipped.
        assert_eq!(s.typed["#CurrentLender"], "Unknown");
        assert!(!s.typed.contains_key("#CurrentRate"));
    });
}

// ========== scheduler ==========

#[tokio::test]
async fn ledger_covers_exactly_the_selected_slice() {
    let driver = FakeDriver::new(DriverState {
        post_submit_locations: VecDeque::from(vec![
            "https://the-leadzone.com/Lead/Index".to_string();
            3
        ]),
        ..Default::default()
    });
    let config = fast_config();
    let flow = SubmitFlow::new(&config);
    let leads: Vec<LeadRecord> = (0..5).map(jane).collect();

    let opts = RunOptions {
        start_offset: 1,
        max_records: Some(3),
    };
    let ledger = run_batch(&driver, &flow, &leads, &opts, &config).await;

    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger.success_count(), 3);
    // source_row = start_offset + index + header_offset, strictly
    // increasing.
    let rows: Vec<usize> = ledger.rows().iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![3, 4, 5]);
    assert!(rows.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn one_record_failure_does_not_stop_the_run() {
    let driver = FakeDriver::new(DriverState {
        // Exactly one fault: the first record's first name write dies, the
        // second record goes through untouched.
        fail_typing: Some(("#FirstName".to_string(), 1)),
        post_submit_locations: VecDeque::from(["https://the-leadzone.com/Lead/Index".to_string()]),
        ..Default::default()
    });
    let mut config = fast_config();
    config.retry.max_attempts = 1;
    let flow = SubmitFlow::new(&config);
    let leads = vec![jane(0), jane(1)];

    let ledger = run_batch(&driver, &flow, &leads, &RunOptions::default(), &config).await;

    assert_eq!(ledger.len(), 2);
    let statuses: Vec<RowStatus> = ledger.rows().iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![RowStatus::Failed, RowStatus::Success]);
    assert_eq!(ledger.failure_count(), 1);
    assert_eq!(ledger.success_count(), 1);
    driver.with(|s| {
        assert_eq!(s.snapshots, vec!["form_fill_error".to_string()]);
    });
}

#[tokio::test]
async fn persistent_fault_consumes_configured_attempts() {
    let driver = FakeDriver::new(DriverState {
        fail_typing: Some(("#FirstName".to_string(), usize::MAX)),
        ..Default::default()
    });
    let mut config = fast_config();
    config.retry.max_attempts = 3;
    let flow = SubmitFlow::new(&config);
    let leads = vec![jane(0)];

    let ledger = run_batch(&driver, &flow, &leads, &RunOptions::default(), &config).await;

    // One ledger row despite three attempts.
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.failure_count(), 1);
    driver.with(|s| {
        assert_eq!(s.snapshots.len(), 3);
        assert!(s.snapshots.iter().all(|n| n == "form_fill_error"));
    });
}

#[tokio::test]
async fn validation_rejection_is_not_retried() {
    let driver = FakeDriver::new(DriverState {
        validation_errors: vec!["Zip is invalid.".to_string()],
        ..Default::default()
    });
    let mut config = fast_config();
    config.retry.max_attempts = 3;
    let flow = SubmitFlow::new(&config);
    let leads = vec![jane(0)];

    let ledger = run_batch(&driver, &flow, &leads, &RunOptions::default(), &config).await;

    assert_eq!(ledger.failure_count(), 1);
    // A single submit click: the verdict was final, no re-attempts.
    driver.with(|s| assert_eq!(s.clicks.len(), 1));
}

#[tokio::test]
async fn offset_past_end_yields_empty_ledger() {
    let driver = FakeDriver::new(DriverState::default());
    let config = fast_config();
    let flow = SubmitFlow::new(&config);
    let leads = vec![jane(0), jane(1)];

    let opts = RunOptions {
        start_offset: 10,
        max_records: None,
    };
    let ledger = run_batch(&driver, &flow, &leads, &opts, &config).await;

    assert!(ledger.is_empty());
    driver.with(|s| assert!(s.clicks.is_empty()));
}

// ========== manual-login readiness ==========

#[derive(Default)]
struct CountingPrompt {
    calls: Mutex<usize>,
}

#[async_trait]
impl OperatorPrompt for CountingPrompt {
    async fn await_acknowledgment(&self, _message: &str) -> Result<(), SessionError> {
        *self.calls.lock().unwrap() += 1;
        Ok(())
    }
}

#[tokio::test]
async fn manual_login_verifies_once_form_appears() {
    let mut existing = HashSet::new();
    existing.insert("#FirstName".to_string());
    let driver = FakeDriver::new(DriverState {
        existing_fields: existing,
        // The probe field shows up on the third poll.
        exists_after_probes: 2,
        ..Default::default()
    });

    let readiness = ManualLogin::new(
        "https://the-leadzone.com/Lead/Add",
        "#FirstName",
        5_000,
        1,
        3,
        CountingPrompt::default(),
    );

    readiness.ensure_ready(&driver).await.unwrap();
    driver.with(|s| {
        assert_eq!(s.navigations.len(), 1);
        assert_eq!(s.probes, 3);
    });
}

#[tokio::test]
async fn manual_login_times_out_after_attempt_bound() {
    let driver = FakeDriver::new(DriverState::default());

    let prompt = CountingPrompt::default();
    let readiness = ManualLogin::new(
        "https://the-leadzone.com/Lead/Add",
        "#FirstName",
        5,
        1,
        2,
        prompt,
    );

    let err = readiness.ensure_ready(&driver).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::VerificationTimedOut { attempts: 2 }
    ));
}
