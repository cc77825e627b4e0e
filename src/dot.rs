use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::graph::{LaunchGraph, NodeId};

/// Graphviz layout engine set in the graph attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    Circo,
    Dot,
    /// Force-directed placement.
    #[default]
    Fdp,
    Neato,
    Osage,
    Sfdp,
    Twopi,
}

impl Layout {
    pub fn as_str(&self) -> &str {
        match self {
            Layout::Circo => "circo",
            Layout::Dot => "dot",
            Layout::Fdp => "fdp",
            Layout::Neato => "neato",
            Layout::Osage => "osage",
            Layout::Sfdp => "sfdp",
            Layout::Twopi => "twopi",
        }
    }
}

/// Output document format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Graphviz DOT.
    #[default]
    Dot,
    /// The assembled graph as JSON.
    Json,
}

/// Renders the graph as a Graphviz digraph.
pub fn render_dot(graph: &LaunchGraph, layout: Layout) -> String {
    let mut out = String::new();
    out.push_str("digraph graph_name {\n");
    out.push_str("    graph [\n");
    out.push_str(&format!("        layout = {}\n", layout.as_str()));
    out.push_str("    ]\n");

    for edge in &graph.edges {
        out.push_str(&format!(
            "    {} -> {};\n",
            quote_node(&edge.from),
            quote_node(&edge.to)
        ));
    }

    for cluster in &graph.clusters {
        let name = quote(&format!("cluster_{}", cluster.package));
        out.push_str(&format!("    subgraph {name}{{\n"));
        out.push_str(&format!("        label={};\n", quote(&cluster.package)));
        for node in &cluster.nodes {
            out.push_str(&format!("        {};\n", quote_node(node)));
        }
        out.push_str("    }\n");
    }

    out.push_str("}\n");
    out
}

/// Writes the graph to `out` in the requested format.
pub fn write_graph<W: Write>(
    graph: &LaunchGraph,
    format: OutputFormat,
    layout: Layout,
    mut out: W,
) -> Result<()> {
    match format {
        OutputFormat::Dot => out
            .write_all(render_dot(graph, layout).as_bytes())
            .context("Failed to write DOT output")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, graph).context("Failed to write JSON output")?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn quote_node(node: &NodeId) -> String {
    quote(&node.to_string())
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
