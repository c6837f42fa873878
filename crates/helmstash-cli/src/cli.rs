use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "helmstash",
    version,
    about = "A value store for Helm release metadata",
    arg_required_else_help = true
)]
pub struct Args {
    /// Path to the config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a release in the release store
    Create {
        /// Name of a values file to store with the release
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Labels to apply, each "k=v"; repeatable or comma-separated
        #[arg(short, long)]
        labels: Vec<String>,

        /// Name of the release
        #[arg(long)]
        name: Option<String>,

        /// Chart of the release
        #[arg(long)]
        chart: String,

        /// Namespace of the release
        #[arg(long, default_value = "default")]
        namespace: String,

        /// Version of the release
        #[arg(long)]
        version: Option<String>,
    },

    /// Delete a release from the release store
    Delete {
        /// The UUID to delete
        #[arg(long)]
        uuid: String,
    },

    /// Print the values of matching releases
    GetValues {
        /// The UUID to get
        #[arg(long)]
        uuid: Option<String>,

        /// The name of the release
        #[arg(long)]
        name: Option<String>,

        /// Labels to filter by, each "k=v"; repeatable or comma-separated
        #[arg(short, long)]
        labels: Vec<String>,
    },

    /// List the releases
    List {
        /// Labels to filter by, each "k=v"; repeatable or comma-separated
        #[arg(short, long)]
        labels: Vec<String>,

        /// Filter by release name
        #[arg(long)]
        name: Option<String>,
    },

    /// Load a JSON file of releases
    Load {
        /// Name of the file to ingest
        #[arg(long)]
        file: PathBuf,

        /// Provision the value store first (may create resources)
        #[arg(long)]
        setup: bool,
    },

    /// Dump the JSON representation of releases
    Dump {
        /// Labels to filter by, each "k=v"; repeatable or comma-separated
        #[arg(short, long)]
        labels: Vec<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Update a release in the release store
    #[command(
        long_about = "Update a release. Any specified fields (other than the UUID) overwrite the existing fields."
    )]
    Update {
        /// The UUID of the release
        #[arg(long)]
        uuid: String,

        /// Name of a values file; replaces the stored values wholesale
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Set values on the command line, merged into the stored values
        /// (repeatable or comma-separated: key1=val1,key2=val2)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Labels to apply, replacing the stored labels
        #[arg(short, long)]
        labels: Vec<String>,

        /// Version of the release
        #[arg(long)]
        version: Option<String>,
    },

    /// Install or upgrade releases matching a selector
    Install {
        /// Selectors to match, each "k=v"; repeatable or comma-separated
        #[arg(short, long)]
        selector: Vec<String>,

        /// Print what would be applied without touching the cluster
        #[arg(long)]
        dry_run: bool,
    },

    /// Start the HTTP apply server
    Serve,

    /// Write the default config file
    DefConfig,
}
