use helmstash_config::Config;
use helmstash_core::{
    error::CoreError,
    installer::{ChartInstaller, HelmCli},
};
use helmstash_store::ReleaseStore;
use tracing::info;

use crate::{
    error::{CliError, CliResult},
    selector,
    utils::with_timeout,
};

/// Applies every release matching the selector: upgraded when already in
/// the cluster, installed otherwise.
pub async fn install_releases(
    config: &Config,
    store: &ReleaseStore,
    selector_args: &[String],
    dry_run: bool,
) -> CliResult<()> {
    let selector = selector::parse_pairs(selector_args);
    let releases = with_timeout(config, store.list(&selector)).await?;
    if releases.is_empty() {
        return Err(CliError::Custom("No releases match that selector".to_string()));
    }

    let installer = HelmCli::new().timeout_secs(config.server.helm_timeout_secs);
    for release in &releases {
        if dry_run {
            info!("Would apply {release}");
            continue;
        }
        match installer.installed_state(&release.name).await {
            Ok(_) => {
                installer
                    .upgrade(&release.name, &release.chart, &release.version, &release.values)
                    .await?;
                info!("Upgraded {}", release.name);
            }
            Err(CoreError::ReleaseNotInstalled(_)) => {
                installer
                    .install(
                        &release.name,
                        &release.namespace,
                        &release.chart,
                        &release.version,
                        &release.values,
                    )
                    .await?;
                info!("Installed {}", release.name);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
