use std::{fs, path::Path};

use helmstash_config::Config;
use helmstash_core::{error::ErrorContext, release::Releases};
use helmstash_store::ReleaseStore;
use tracing::info;

use crate::{
    error::{CliError, CliResult},
    utils::with_timeout,
};

pub async fn load_releases(
    config: &Config,
    store: &ReleaseStore,
    file: &Path,
    setup: bool,
) -> CliResult<()> {
    info!("Opening {}", file.display());
    let content =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let releases: Releases = serde_json::from_str(&content).map_err(|err| {
        CliError::Custom(format!("Failed parsing {}: {err}", file.display()))
    })?;

    if setup {
        with_timeout(config, store.setup()).await?;
    }

    with_timeout(config, store.load(&releases)).await?;
    info!(
        "Loaded {} releases into {}",
        releases.len(),
        store.backend_name()
    );
    Ok(())
}
