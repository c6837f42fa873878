use std::{fs, path::Path};

use helmstash_config::Config;
use helmstash_core::{error::ErrorContext, values::merge_values};
use helmstash_store::ReleaseStore;
use tracing::info;

use crate::{error::CliResult, selector, utils::with_timeout};

/// Fetches a release, applies the requested field changes, and writes it
/// back. `--set` overrides are merged into the stored values; a values
/// file replaces them wholesale before any merge.
pub async fn update_release(
    config: &Config,
    store: &ReleaseStore,
    uuid: &str,
    file: Option<&Path>,
    set: &[String],
    labels: &[String],
    version: Option<String>,
) -> CliResult<()> {
    let mut release = with_timeout(config, store.get(uuid)).await?;

    if let Some(path) = file {
        release.values = fs::read_to_string(path)
            .with_context(|| format!("reading values file {}", path.display()))?;
    }

    if !set.is_empty() {
        release.values = merge_values(&release.values, set)?;
    }

    if !labels.is_empty() {
        release.labels = selector::parse_pairs(labels);
    }

    if let Some(version) = version {
        release.version = version;
    }

    with_timeout(config, store.put(&release)).await?;
    info!("Updated release {} in the release store", release.name);
    Ok(())
}
