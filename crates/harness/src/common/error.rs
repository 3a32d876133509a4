//! Error types for the harness.
//!
//! Transport failures and unavailable reads are deliberately absent from the
//! scenario-facing API: the device handle folds them into `None`. What remains
//! here are failures that stop a load, a configuration, or the whole suite.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A coefficient, expected-value or stimulus file could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input has no header line.
    #[error("{origin}: missing header line")]
    MissingHeader { origin: String },

    /// The input holds no records.
    #[error("{origin}: contains no records")]
    Empty { origin: String },

    /// A record does not match the expected shape.
    #[error("{origin}:{line}: {reason}")]
    Malformed {
        origin: String,
        line: usize,
        reason: String,
    },
}

/// The suite configuration file is unreadable or inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A register layout table does not describe a well-formed 32-bit register.
///
/// This indicates the register model itself is wrong and aborts the suite.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("register layout '{register}' is invalid: {reason}")]
pub struct LayoutError {
    pub register: &'static str,
    pub reason: String,
}

/// The DUT executable could not be driven at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' did not answer within {after:?}")]
    Timeout { program: String, after: Duration },

    #[error("lost contact with '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Top-level error for running a suite.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}
