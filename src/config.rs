use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::dot::{Layout, OutputFormat, write_graph};
use crate::graph::LaunchGraph;
use crate::workspace::Workspace;

/// Environment variable overriding the default search root.
pub const ROOT_ENV_VAR: &str = "LAUNCH_GRAPH_ROOT";

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "graph.dot";

/// Where the graph is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `-` means stdout, anything else is a file path.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(arg))
        }
    }
}

impl Default for OutputTarget {
    fn default() -> Self {
        OutputTarget::File(PathBuf::from(DEFAULT_OUTPUT))
    }
}

/// Configuration for one graph generation run.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Directory searched for `package.xml` and `*.launch.xml` files.
    pub root: PathBuf,
    pub output: OutputTarget,
    pub layout: Layout,
    pub format: OutputFormat,
}

impl GraphConfig {
    /// A configuration with default output settings for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: OutputTarget::default(),
            layout: Layout::default(),
            format: OutputFormat::default(),
        }
    }
}

/// Returns the default search root: `LAUNCH_GRAPH_ROOT`, else `~/autoware/install`.
pub fn default_root() -> Option<PathBuf> {
    if let Ok(root) = std::env::var(ROOT_ENV_VAR)
        && !root.is_empty()
    {
        return Some(PathBuf::from(root));
    }

    dirs::home_dir().map(|h| h.join("autoware").join("install"))
}

/// Scans `root` and assembles its launch include graph.
pub fn generate(root: &Path) -> Result<LaunchGraph> {
    if !root.is_dir() {
        anyhow::bail!("Search root {} is not a directory", root.display());
    }

    let workspace = Workspace::new(root);
    let groups = workspace.launch_groups()?;
    let graph = LaunchGraph::assemble(&groups);

    info!(
        "{}: {} package(s), {} launch file(s), {} edge(s), {} cluster(s)",
        workspace.name(),
        groups.len(),
        groups.iter().map(|g| g.launch_files.len()).sum::<usize>(),
        graph.edges.len(),
        graph.clusters.len()
    );

    Ok(graph)
}

/// Generates the graph for `config.root` and writes it to `config.output`.
pub fn run(config: &GraphConfig) -> Result<LaunchGraph> {
    info!("search xml {}", config.root.display());
    let graph = generate(&config.root)?;

    match &config.output {
        OutputTarget::Stdout => {
            write_graph(&graph, config.format, config.layout, std::io::stdout().lock())?;
        }
        OutputTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_graph(&graph, config.format, config.layout, BufWriter::new(file))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("wrote {}", path.display());
        }
    }

    Ok(graph)
}
