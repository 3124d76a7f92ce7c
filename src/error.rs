// src/error.rs
// Failure taxonomy. The transient/permanent split drives every retry
// decision in the pipeline, so it is typed rather than stringly anyhow.

use thiserror::Error;

/// Failure fetching one channel's messages.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Expected to succeed on a later cycle (network blip, rate limit).
    #[error("transient fetch failure: {0}")]
    Transient(String),
    /// Channel inaccessible until an operator steps in.
    #[error("permanent fetch failure: {0}")]
    Permanent(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}

/// Failure appending to or listing the persistence store.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("transient persist failure: {0}")]
    Transient(String),
    #[error("permanent persist failure: {0}")]
    Permanent(String),
}

impl PersistError {
    pub fn is_transient(&self) -> bool {
        matches!(self, PersistError::Transient(_))
    }
}

/// Invalid or missing configuration. Fatal at startup: the monitor never
/// runs with a partial config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {reason}")]
    Parse { path: String, reason: String },
}

/// Startup-phase failures that abort the process. Running with an empty
/// dedup index while prior rows merely happen to be unreachable would
/// silently duplicate them all.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("sheet preparation failed: {0}")]
    SheetSetup(String),
    #[error("dedup index reconstruction failed: {0}")]
    IndexReconstruction(String),
}
