use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use launch_graph::{GraphConfig, Layout, OutputFormat, OutputTarget};

#[derive(Parser)]
#[command(name = "launch-graph")]
#[command(about = "Render the include graph of ROS 2 XML launch files as Graphviz DOT")]
#[command(version)]
struct Cli {
    /// Directory to scan [default: $LAUNCH_GRAPH_ROOT or ~/autoware/install]
    #[arg(value_name = "ROOT")]
    root: Option<PathBuf>,

    /// Output file, or `-` for stdout
    #[arg(short = 'o', long = "output", default_value = launch_graph::config::DEFAULT_OUTPUT)]
    output: String,

    /// Graphviz layout engine
    #[arg(short = 'l', long = "layout", value_enum, default_value_t = Layout::Fdp)]
    layout: Layout,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Dot)]
    format: OutputFormat,

    /// Show debug messages
    #[arg(short = 'v', long = "verbose", conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => launch_graph::default_root()
            .context("No search root given and the home directory is unknown")?,
    };

    let config = GraphConfig {
        root,
        output: OutputTarget::parse(&cli.output),
        layout: cli.layout,
        format: cli.format,
    };

    let graph = launch_graph::run(&config)?;
    log::debug!(
        "{} edge(s), {} clustered node(s)",
        graph.edges.len(),
        graph.clustered_node_count()
    );
    Ok(())
}
