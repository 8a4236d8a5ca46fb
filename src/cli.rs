//! Command-line options for the scaleup-bench binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "scaleup-bench")]
#[command(about = "Concurrency-ramp load-testing harness for JSON-over-HTTP APIs")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ramp a search workload: collection queries filtered by drawn entities
    Search {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        search: SearchOpts,
    },

    /// Ramp a create workload: POST new entities referencing drawn ones
    Create {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        create: CreateOpts,
    },

    /// Ramp a read workload: GET drawn entities by reference
    Read {
        #[command(flatten)]
        common: CommonOpts,
    },

    /// Ramp an update workload: toggle drawn entities and PUT them back
    Update {
        #[command(flatten)]
        common: CommonOpts,
    },

    /// Ramp all four workloads, interleaved round-robin
    Mixed {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        search: SearchOpts,

        #[command(flatten)]
        create: CreateOpts,
    },
}

#[derive(Args, Clone)]
pub struct SearchOpts {
    /// Collection queried per search iteration
    #[arg(long, default_value = "observations")]
    pub search_collection: String,

    /// Query parameter carrying the drawn entity reference
    #[arg(long, default_value = "subject")]
    pub search_parameter: String,
}

#[derive(Args, Clone)]
pub struct CreateOpts {
    /// Collection new entities are posted to
    #[arg(long, default_value = "observations")]
    pub create_collection: String,
}

#[derive(Args, Clone)]
pub struct CommonOpts {
    /// Target base URL(s); several spread requests round-robin
    #[arg(
        long = "base-url",
        required = true,
        env = "SCALEUP_BASE_URL",
        value_delimiter = ','
    )]
    pub base_urls: Vec<String>,

    /// Basic-auth credentials as user:password
    #[arg(long, env = "SCALEUP_CREDENTIALS")]
    pub credentials: Option<String>,

    /// Entity kind held in the resource pool
    #[arg(long, default_value = "patient")]
    pub pool_kind: String,

    /// Stop loading the pool once this many entities are held
    #[arg(long, default_value_t = crate::pool::DEFAULT_TARGET_SIZE)]
    pub pool_size: usize,

    /// Listing page size used while loading the pool
    #[arg(long, default_value_t = crate::pool::DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Exclusive upper bound on worker concurrency
    #[arg(long, default_value_t = 100)]
    pub max_concurrency: usize,

    /// Repeated passes per concurrency level
    #[arg(long, default_value_t = 3)]
    pub repeats: u32,

    /// Iterations per worker within a pass
    #[arg(long, default_value_t = 10)]
    pub iterations: u32,

    /// CSV pass-report output path
    #[arg(long, default_value = "scaleup-report.csv")]
    pub csv_out: PathBuf,

    /// Optional JSON run-summary output path
    #[arg(long)]
    pub summary_out: Option<PathBuf>,
}
