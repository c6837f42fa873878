use error::CoreError;

pub mod error;
pub mod installer;
pub mod release;
pub mod values;

pub type CoreResult<T> = std::result::Result<T, CoreError>;
