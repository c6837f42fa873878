use std::future::Future;

use helmstash_config::Config;
use helmstash_store::StoreError;

use crate::error::{CliError, CliResult};

/// Runs a store operation under the configured deadline.
pub async fn with_timeout<T, Fut>(config: &Config, operation: Fut) -> CliResult<T>
where
    Fut: Future<Output = Result<T, StoreError>>,
{
    let deadline = std::time::Duration::from_secs(config.timeout_secs);
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(CliError::Timeout(config.timeout_secs)),
    }
}

/// Formats a byte count the way the list output shows values sizes.
pub fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}{}", UNITS[0])
    } else {
        format!("{size:.1}{}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(2048), "2.0KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0MiB");
    }
}
