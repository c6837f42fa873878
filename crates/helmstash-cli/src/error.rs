use helmstash_config::ConfigError;
use helmstash_core::error::CoreError;
use helmstash_store::StoreError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error("Operation timed out after {0} seconds")]
    #[diagnostic(
        code(helmstash::timeout),
        help("Raise timeout_secs in the config file or HELMSTASH_TIMEOUT")
    )]
    Timeout(u64),

    #[error("{0}")]
    #[diagnostic(code(helmstash::error))]
    Custom(String),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
