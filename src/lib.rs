//! # Lead Form Submit
//!
//! Paced, semi-unattended submission of lead records into a third-party web
//! form.
//!
//! ## Architecture
//!
//! Four strict layers:
//!
//! ### ① Infrastructure (`session/`, `browser/`)
//! - Holds the scarce resource (the browser page), exposes only primitives
//! - [`session::SessionDriver`] - the narrow interface everything above
//!   drives the browser through
//! - [`session::SessionReadiness`] - pluggable "block until the form is
//!   usable" strategies (direct navigation, manual login + verification)
//!
//! ### ② Capabilities (`services/`)
//! - Each service does one thing and knows nothing about the run
//! - [`services::FieldMapper`] - one record → ordered fill plan
//! - [`services::Pacer`] - uniform jitter and pointer noise
//! - [`services::RunLedger`] - append-only per-record outcomes
//!
//! ### ③ Workflow (`workflow/`)
//! - The complete handling of *one* submission attempt
//! - [`workflow::SubmitFlow`] - fill → submit → classify, faults contained
//!
//! ### ④ Orchestration (`orchestrator/`)
//! - [`orchestrator::batch_runner`] - sequential batch loop, retry, pacing
//! - [`orchestrator::App`] - resource ownership and run lifecycle

pub mod browser;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod utils;
pub mod workflow;

pub use config::Config;
pub use error::{AppError, AppResult, SessionError, SourceError};
pub use models::{load_leads, LeadRecord};
pub use orchestrator::{App, RunOptions};
pub use services::{FieldMapper, FillPlan, Pacer, RowStatus, RunLedger};
pub use session::{CdpDriver, SessionDriver, SessionReadiness};
pub use workflow::{LeadCtx, SubmissionOutcome, SubmitFlow};
