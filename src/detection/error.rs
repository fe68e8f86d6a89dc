//! Error types for detection runs.

use thiserror::Error;

/// Errors that can occur while running or interpreting an analysis.
#[derive(Error, Debug)]
pub enum DetectionError {
    /// I/O error talking to the service
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response was not valid JSON
    #[error("Invalid detection response: {0}")]
    Json(#[from] serde_json::Error),

    /// The service process could not be started
    #[error("Failed to start detector '{program}': {source}")]
    Spawn {
        /// Program that was launched
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The service exited unsuccessfully without a parseable response
    #[error("Detector exited with status {code:?}: {stderr}")]
    ExitStatus {
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The service produced no output at all
    #[error("Detector produced no output")]
    EmptyOutput,

    /// The worker running the request went away before answering
    #[error("Detection worker stopped before returning a result")]
    WorkerLost,

    /// The service answered with an explicit failure message
    #[error("{0}")]
    Service(String),
}
