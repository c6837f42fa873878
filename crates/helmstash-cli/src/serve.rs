use std::{sync::Arc, time::Duration};

use helmstash_config::Config;
use helmstash_core::installer::{ChartInstaller, HelmCli};
use helmstash_server::ApiState;
use helmstash_store::ReleaseStore;
use tracing::info;

use crate::error::{CliError, CliResult};

pub async fn serve(config: &Config, store: ReleaseStore) -> CliResult<()> {
    let installer: Arc<dyn ChartInstaller> =
        Arc::new(HelmCli::new().timeout_secs(config.server.helm_timeout_secs));
    let state = Arc::new(
        ApiState::new(store, installer)
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_auth_token(config.server.auth_token.clone()),
    );

    let addr = format!("0.0.0.0:{}", config.server.port);
    info!("Starting helmstash server on port {}", config.server.port);
    helmstash_server::serve(state, &addr)
        .await
        .map_err(|err| CliError::Custom(format!("Error serving: {err}")))
}
