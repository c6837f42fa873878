use helmstash_config::Config;
use helmstash_store::ReleaseStore;

use crate::{
    error::{CliError, CliResult},
    selector,
    utils::with_timeout,
};

pub async fn dump_releases(
    config: &Config,
    store: &ReleaseStore,
    labels: &[String],
    pretty: bool,
) -> CliResult<()> {
    let selector = selector::parse_pairs(labels);
    let releases = with_timeout(config, store.list(&selector)).await?;

    let serialized = if pretty {
        serde_json::to_string_pretty(&releases)
    } else {
        serde_json::to_string(&releases)
    }
    .map_err(|err| CliError::Custom(format!("Failed serializing releases: {err}")))?;

    println!("{serialized}");
    Ok(())
}
