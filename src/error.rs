//! Error taxonomy.
//!
//! Three failure domains with different blast radii:
//! - [`SourceError`]: the lead file itself is unusable. Fatal, aborts the run
//!   before any record is processed.
//! - [`SessionError`]: the browser session misbehaved. Fatal during
//!   initialization; caught and downgraded to a per-record outcome once the
//!   run loop is going.
//! - [`ConfigError`]: the configuration file is unusable. Fatal.

use chromiumoxide::error::CdpError;
use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("lead source error: {0}")]
    Source(#[from] SourceError),

    #[error("browser session error: {0}")]
    Session(#[from] SessionError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Record-source failures. Always fatal: without a readable lead file there
/// is nothing to process.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("lead file not found: {path}")]
    NotFound { path: String },

    #[error("failed to read lead file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lead file {path}: {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Browser-session failures.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to configure browser: {0}")]
    LaunchConfig(String),

    #[error("failed to launch browser: {source}")]
    LaunchFailed {
        #[source]
        source: CdpError,
    },

    #[error("failed to connect to browser on port {port}: {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: CdpError,
    },

    #[error("failed to create page: {source}")]
    PageCreationFailed {
        #[source]
        source: CdpError,
    },

    #[error("navigation to {url} failed: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: CdpError,
    },

    #[error("script execution failed: {0}")]
    Script(#[from] CdpError),

    #[error("evaluation result decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("field {id} not found in current form state")]
    FieldNotFound { id: String },

    #[error("failed to write diagnostic snapshot: {source}")]
    SnapshotFailed {
        #[source]
        source: CdpError,
    },

    #[error("operator interaction failed: {0}")]
    OperatorUnavailable(String),

    #[error("login verification timed out after {attempts} attempt(s)")]
    VerificationTimedOut { attempts: usize },
}

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;
