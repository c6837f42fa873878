use helmstash_config::Config;
use helmstash_core::release::Release;
use helmstash_store::ReleaseStore;
use tabled::{builder::Builder, settings::Style};
use tracing::info;

use crate::{
    error::CliResult,
    selector,
    utils::{format_size, with_timeout},
};

fn labels_column(release: &Release) -> String {
    let mut pairs: Vec<String> = release
        .labels
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    pairs.sort();
    pairs.join(",")
}

pub async fn list_releases(
    config: &Config,
    store: &ReleaseStore,
    labels: &[String],
    name: Option<String>,
) -> CliResult<()> {
    let selector = selector::parse_pairs(labels);
    let mut releases = with_timeout(config, store.list(&selector)).await?;

    if let Some(name) = &name {
        releases.retain(|release| &release.name == name);
    }

    let mut builder = Builder::new();
    builder.push_record([
        "ID", "Name", "Namespace", "Chart", "Version", "Labels", "Values",
    ]);
    for release in &releases {
        builder.push_record([
            release.unique_id.clone(),
            release.name.clone(),
            release.namespace.clone(),
            release.chart.clone(),
            release.version.clone(),
            labels_column(release),
            format_size(release.values.len()),
        ]);
    }

    let table = builder.build().with(Style::rounded()).to_string();
    info!("\n{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_column_is_sorted() {
        let release = Release {
            labels: [("region", "us"), ("environment", "test")]
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        };
        assert_eq!(labels_column(&release), "environment=test,region=us");
    }
}
