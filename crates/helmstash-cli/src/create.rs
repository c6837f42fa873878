use std::{collections::HashMap, fs, path::Path};

use helmstash_config::Config;
use helmstash_core::{error::ErrorContext, release::Release};
use helmstash_store::ReleaseStore;
use tracing::info;
use uuid::Uuid;

use crate::{error::CliResult, utils::with_timeout};

#[allow(clippy::too_many_arguments)]
pub async fn create_release(
    config: &Config,
    store: &ReleaseStore,
    file: Option<&Path>,
    labels: HashMap<String, String>,
    name: Option<String>,
    chart: String,
    namespace: String,
    version: Option<String>,
) -> CliResult<()> {
    let mut release = Release {
        unique_id: Uuid::new_v4().to_string(),
        labels,
        name: name.unwrap_or_default(),
        chart,
        namespace,
        version: version.unwrap_or_default(),
        values: String::new(),
    };

    if let Some(path) = file {
        release.values = fs::read_to_string(path)
            .with_context(|| format!("reading values file {}", path.display()))?;
    }

    with_timeout(config, store.put(&release)).await?;
    info!(
        "Created release {} ({}) in the release store",
        release.name, release.unique_id
    );
    Ok(())
}
