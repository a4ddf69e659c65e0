use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("command not found: {program}")]
    NotFound { program: String },

    #[error("failed to start {program}: {source}")]
    SpawnFailed {
        program: String,
        source: std::io::Error,
    },

    #[error("failed waiting for {program}: {source}")]
    WaitFailed {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} exited with status {}: {stderr}", describe_code(.code))]
    ExitStatus {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl Error {
    /// True when the process never started.
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::SpawnFailed { .. })
    }
}

fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}
