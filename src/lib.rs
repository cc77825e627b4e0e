//! Include graph of ROS 2 XML launch files.
//!
//! Scans a workspace (usually a colcon `install/` tree) for `package.xml`
//! manifests, reads the `*.launch.xml` files below each package, resolves the
//! `$(find-pkg-share ...)` substitutions of their conditional includes and
//! renders the result as a Graphviz digraph with one cluster per package.

/// Run configuration and the scan-assemble-write pipeline.
pub mod config;
/// DOT and JSON rendering of the assembled graph.
pub mod dot;
/// Edges and per-package clusters.
pub mod graph;
/// Launch file parsing: args, conditional groups and includes.
pub mod launch;
/// Static resolution of include-path substitutions.
pub mod substitution;
/// Package and launch file discovery.
pub mod workspace;
mod xml;

pub use config::{GraphConfig, OutputTarget, default_root, generate, run};
pub use dot::{Layout, OutputFormat, render_dot, write_graph};
pub use graph::{Cluster, Edge, LaunchGraph, NodeId};
pub use launch::{IncludeReference, LaunchArg, LaunchFile, read_launch_file};
pub use substitution::{PackageRef, resolve_package};
pub use workspace::{Package, PackageLaunchGroup, Workspace, read_package_name};
