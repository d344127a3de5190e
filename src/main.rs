//! asgraph CLI entry point

use asgraph::{Config, SpecialNodes};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "asgraph")]
#[command(about = "Inspect and convert abstract semantic graph files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to ./asgraph.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print node counts per kind and the edge count
    Stat {
        asg: PathBuf,
    },
    /// Print an indented preorder trace
    Dump {
        asg: PathBuf,

        /// Walk only the subtree of this node id
        #[arg(long)]
        start: Option<u32>,

        /// How to treat nodes outside the containment tree
        #[arg(long, value_enum)]
        special: Option<SpecialNodes>,

        /// Allow re-entering nodes that were already visited
        #[arg(long = "unsafe")]
        unsafe_mode: bool,

        /// Fail below this containment depth
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Write the generic-graph form of an ASG file
    Convert {
        asg: PathBuf,
        graph: PathBuf,
    },
    /// Describe a generic-graph file
    Info {
        graph: PathBuf,
    },
    /// Merge generic-graph files into one, matching nodes by uid
    Merge {
        /// Base graph followed by the graphs merged into it, in order
        #[arg(required = true, num_args = 2..)]
        graphs: Vec<PathBuf>,

        /// Where to write the merged graph
        #[arg(long)]
        out: PathBuf,
    },
    /// Filter a subtree and save the filter state
    Filter {
        asg: PathBuf,

        /// Root of the subtree to filter
        #[arg(long)]
        node: u32,

        /// Where to write the filter file
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { config.log.level.as_str() };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("asgraph={log_level}")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("asgraph v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Stat { asg } => commands::stat(&asg, &config),
        Commands::Dump {
            asg,
            start,
            special,
            unsafe_mode,
            max_depth,
        } => {
            if let Some(special) = special {
                config.traversal.special_nodes = special;
            }
            if unsafe_mode {
                config.traversal.safe_mode = false;
            }
            if max_depth.is_some() {
                config.traversal.max_depth = max_depth;
            }
            commands::dump(&asg, start, &config)
        }
        Commands::Convert { asg, graph } => commands::convert(&asg, &graph),
        Commands::Info { graph } => commands::info(&graph),
        Commands::Merge { graphs, out } => commands::merge(&graphs, &out),
        Commands::Filter { asg, node, out } => commands::filter(&asg, node, &out),
    }
}
