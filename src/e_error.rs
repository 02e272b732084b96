use std::path::PathBuf;
use std::time::Duration;

use crate::e_parser::ParseError;

/// Errors raised while configuring, launching or reading back the validator.
#[derive(Debug, thiserror::Error)]
pub enum LauncherError {
    #[error("validator jar not found: {}", .0.display())]
    MissingArtifact(PathBuf),
    #[error("no java command found on PATH; set one explicitly")]
    JavaNotFound,
    #[error("failed to launch {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} did not finish within {timeout:?} and was killed")]
    Timeout { command: String, timeout: Duration },
    #[error("could not find a version in the validator help output")]
    VersionNotFound,
    #[error("malformed validator output at line {line_number}: {source}")]
    Malformed {
        line_number: usize,
        #[source]
        source: ParseError,
    },
    #[error("invalid configuration in {path}: {reason}")]
    Config { path: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = LauncherError> = std::result::Result<T, E>;
