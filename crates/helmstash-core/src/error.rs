//! Error types for helmstash-core.

use miette::Diagnostic;
use thiserror::Error;

/// Core error type for release and values operations.
#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error("Error while {action}")]
    #[diagnostic(code(helmstash::io), help("Check file permissions and paths"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed parsing values document: {reason}")]
    #[diagnostic(
        code(helmstash::values_parse),
        help("Release values must be a JSON object")
    )]
    ValuesParse { reason: String },

    #[error("Failed parsing --set data {token:?}: {reason}")]
    #[diagnostic(
        code(helmstash::invalid_override),
        help("Use the format path.to.key=value, comma-separated for multiple assignments")
    )]
    InvalidOverride { token: String, reason: String },

    #[error("Release '{0}' is not installed")]
    #[diagnostic(code(helmstash::not_installed))]
    ReleaseNotInstalled(String),

    #[error("helm {op} failed: {stderr}")]
    #[diagnostic(
        code(helmstash::helm),
        help("Check that the helm binary is on PATH and the cluster is reachable")
    )]
    HelmCommand { op: String, stderr: String },

    #[error("{0}")]
    #[diagnostic(code(helmstash::error))]
    Custom(String),
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, CoreError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, CoreError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            CoreError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
