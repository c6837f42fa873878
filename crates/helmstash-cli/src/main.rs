use clap::Parser;
use cli::Args;
use helmstash_config::config::{self, generate_default_config, get_config, CONFIG_PATH};
use helmstash_store::ReleaseStore;
use logging::setup_logging;

use crate::error::CliResult;

mod cli;
mod create;
mod delete;
mod dump;
mod error;
mod get_values;
mod install;
mod list;
mod load;
mod logging;
mod selector;
mod serve;
mod update;
mod utils;

async fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if let Some(ref config_path) = args.config {
        let mut path = CONFIG_PATH.write().unwrap();
        *path = config_path.clone();
    }

    match args.command {
        cli::Commands::DefConfig => generate_default_config()?,
        command => {
            config::init()?;
            let config = get_config();
            let store = ReleaseStore::from_config(&config).await?;

            match command {
                cli::Commands::Create {
                    file,
                    labels,
                    name,
                    chart,
                    namespace,
                    version,
                } => {
                    create::create_release(
                        &config,
                        &store,
                        file.as_deref(),
                        selector::parse_pairs(&labels),
                        name,
                        chart,
                        namespace,
                        version,
                    )
                    .await?;
                }
                cli::Commands::Delete {
                    uuid,
                } => {
                    delete::delete_release(&config, &store, &uuid).await?;
                }
                cli::Commands::GetValues {
                    uuid,
                    name,
                    labels,
                } => {
                    get_values::get_values(&config, &store, uuid, name, &labels).await?;
                }
                cli::Commands::List {
                    labels,
                    name,
                } => {
                    list::list_releases(&config, &store, &labels, name).await?;
                }
                cli::Commands::Load {
                    file,
                    setup,
                } => {
                    load::load_releases(&config, &store, &file, setup).await?;
                }
                cli::Commands::Dump {
                    labels,
                    pretty,
                } => {
                    dump::dump_releases(&config, &store, &labels, pretty).await?;
                }
                cli::Commands::Update {
                    uuid,
                    file,
                    set,
                    labels,
                    version,
                } => {
                    update::update_release(
                        &config,
                        &store,
                        &uuid,
                        file.as_deref(),
                        &set,
                        &labels,
                        version,
                    )
                    .await?;
                }
                cli::Commands::Install {
                    selector,
                    dry_run,
                } => {
                    install::install_releases(&config, &store, &selector, dry_run).await?;
                }
                cli::Commands::Serve => {
                    serve::serve(&config, store).await?;
                }
                cli::Commands::DefConfig => unreachable!(),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli().await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
