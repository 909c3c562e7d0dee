//! Error types shared across the crate

use crate::permutation::PermutationError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Problems detected before any search starts. These are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown strategy '{name}'. Valid options: {valid}")]
    UnknownStrategy { name: String, valid: String },

    #[error("no strategies selected")]
    NoStrategies,

    #[error("invalid instance sizes: {0}")]
    InvalidSizes(String),

    #[error("model template not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("model template {} has no {{{{SOLVE_STRATEGY}}}} placeholder", .0.display())]
    TemplatePlaceholder(PathBuf),

    #[error("instance #{id}: {source}")]
    InvalidInstance {
        id: u32,
        #[source]
        source: PermutationError,
    },

    #[error("oracle backend '{0}' is not available in this build")]
    BackendUnavailable(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

/// Failure to set up an oracle session
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle IO error: {0}")]
    Io(#[from] io::Error),
}

/// Failure to persist a run record or detail artifact
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RecorderError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        RecorderError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Top-level error returned to `main`
#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error(transparent)]
    Permutation(#[from] PermutationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_message() {
        let err = ConfigError::TemplatePlaceholder(PathBuf::from("model.mzn"));
        assert_eq!(
            err.to_string(),
            "model template model.mzn has no {{SOLVE_STRATEGY}} placeholder"
        );
    }

    #[test]
    fn test_recorder_error_message() {
        let err = RecorderError::io(
            "out/summary.csv",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("cannot write out/summary.csv"));
    }
}
