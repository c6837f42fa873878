use helmstash_config::Config;
use helmstash_core::release::Releases;
use helmstash_store::ReleaseStore;

use crate::{
    error::{CliError, CliResult},
    selector,
    utils::with_timeout,
};

pub async fn get_values(
    config: &Config,
    store: &ReleaseStore,
    uuid: Option<String>,
    name: Option<String>,
    labels: &[String],
) -> CliResult<()> {
    let mut releases = Releases::new();

    if let Some(uuid) = uuid {
        releases.push(with_timeout(config, store.get(&uuid)).await?);
    } else if name.is_some() || !labels.is_empty() {
        let selector = selector::parse_pairs(labels);
        releases = with_timeout(config, store.list(&selector)).await?;
        if releases.is_empty() {
            return Err(CliError::Custom("No releases match those labels".to_string()));
        }
        if let Some(name) = &name {
            releases.retain(|release| &release.name == name);
        }
        if releases.is_empty() {
            return Err(CliError::Custom(
                "No releases match that name and those labels".to_string(),
            ));
        }
    } else {
        return Err(CliError::Custom(
            "Must supply a UUID, release name, or labels".to_string(),
        ));
    }

    for (index, release) in releases.iter().enumerate() {
        if index > 0 {
            println!("---");
        }
        println!("# {}: {}", release.name, release.unique_id);
        println!("{}", release.values);
    }
    Ok(())
}
