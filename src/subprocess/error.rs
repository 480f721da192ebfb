use std::process::ExitStatus;
use thiserror::Error;

/// Fatal subprocess failures. None of these are retried: the orchestration
/// step aborts on the first one.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The tool could not be started at all (missing executable,
    /// permission denied, ...).
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool started but did not exit cleanly. `status` carries the
    /// textual exit-status description (exit code or fatal signal).
    #[error("{command} failed with: {status}")]
    Exited { command: String, status: ExitStatus },

    /// Waiting for the tool failed through a path other than a clean exit.
    #[error("failed to run {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Relaying the tool's output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
