use helmstash_config::Config;
use helmstash_store::ReleaseStore;
use tracing::info;

use crate::{error::CliResult, utils::with_timeout};

pub async fn delete_release(config: &Config, store: &ReleaseStore, uuid: &str) -> CliResult<()> {
    with_timeout(config, store.delete(uuid)).await?;
    info!("Deleted release {uuid} from the release store");
    Ok(())
}
