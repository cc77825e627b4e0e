use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::workspace::PackageLaunchGroup;

/// A launch file node, identified as `<package>::<file>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId {
    pub package: String,
    pub file: String,
}

impl NodeId {
    pub fn new(package: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            file: file.into(),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.package, self.file)
    }
}

/// An include: `from` includes `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

/// All launch files owned by one package name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub package: String,
    pub nodes: Vec<NodeId>,
}

/// The include graph of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LaunchGraph {
    /// One edge per include reference, grouped by source file in discovery order.
    pub edges: Vec<Edge>,
    /// One cluster per distinct package name that owns at least one launch file.
    pub clusters: Vec<Cluster>,
}

impl LaunchGraph {
    /// Builds edges and package clusters from the discovered groups.
    pub fn assemble(groups: &[PackageLaunchGroup]) -> Self {
        Self {
            edges: collect_edges(groups),
            clusters: collect_clusters(groups),
        }
    }

    /// Returns `true` if the graph has neither edges nor clusters.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.clusters.is_empty()
    }

    /// Number of distinct nodes placed in clusters.
    pub fn clustered_node_count(&self) -> usize {
        self.clusters.iter().map(|c| c.nodes.len()).sum()
    }

    /// Returns the cluster of `package`, if it owns any launch file.
    pub fn cluster(&self, package: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.package == package)
    }
}

fn collect_edges(groups: &[PackageLaunchGroup]) -> Vec<Edge> {
    let mut edges = Vec::new();
    for group in groups {
        for file in &group.launch_files {
            let from = NodeId::new(&group.package.name, &file.name);
            for include in &file.includes {
                edges.push(Edge {
                    from: from.clone(),
                    to: NodeId::new(include.target_package.as_str(), &include.target_file),
                });
            }
        }
    }
    edges
}

/// Folds every group sharing a package name into the cluster opened by the
/// first such group that has launch files. A group without launch files never
/// opens a cluster and does not claim its name.
fn collect_clusters(groups: &[PackageLaunchGroup]) -> Vec<Cluster> {
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut clusters = Vec::new();

    for (i, group) in groups.iter().enumerate() {
        let name = group.package.name.as_str();
        if group.launch_files.is_empty() || emitted.contains(name) {
            continue;
        }
        emitted.insert(name);

        let mut seen = HashSet::new();
        let nodes = groups[i..]
            .iter()
            .filter(|g| g.package.name == name)
            .flat_map(|g| &g.launch_files)
            .map(|file| NodeId::new(name, &file.name))
            .filter(|id| seen.insert(id.clone()))
            .collect();

        clusters.push(Cluster {
            package: name.to_string(),
            nodes,
        });
    }

    clusters
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::launch::{IncludeReference, LaunchFile};
    use crate::workspace::Package;

    fn launch_file(name: &str, includes: &[&str]) -> LaunchFile {
        LaunchFile {
            name: name.to_string(),
            full_path: PathBuf::from("/ws").join(name),
            args: Vec::new(),
            includes: includes
                .iter()
                .map(|e| IncludeReference::from_expression(e, None))
                .collect(),
        }
    }

    fn group(package: &str, location: &str, files: Vec<LaunchFile>) -> PackageLaunchGroup {
        PackageLaunchGroup {
            package: Package {
                name: package.to_string(),
                manifest_path: PathBuf::from(location).join("package.xml"),
                location: PathBuf::from(location),
            },
            launch_files: files,
        }
    }

    fn node_names(cluster: &Cluster) -> Vec<String> {
        cluster.nodes.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_edges_follow_document_order() {
        let groups = vec![group(
            "pkg_a",
            "/ws/pkg_a",
            vec![launch_file(
                "parent.launch.xml",
                &[
                    "$(find-pkg-share pkg_b)/launch/child.launch.xml",
                    "$(var some_arg)_description/launch/child.launch.xml",
                    "$(find-pkg-share $(var dyn_pkg))/launch/child.launch.xml",
                    "$(find-pkg-share pkg_b)/launch/child.launch.xml",
                ],
            )],
        )];

        let graph = LaunchGraph::assemble(&groups);
        let edges: Vec<String> = graph
            .edges
            .iter()
            .map(|e| format!("{} -> {}", e.from, e.to))
            .collect();
        assert_eq!(
            edges,
            vec![
                "pkg_a::parent.launch.xml -> pkg_b::child.launch.xml",
                "pkg_a::parent.launch.xml -> ::child.launch.xml",
                "pkg_a::parent.launch.xml -> $(var dyn_pkg)::child.launch.xml",
                "pkg_a::parent.launch.xml -> pkg_b::child.launch.xml",
            ]
        );
    }

    #[test]
    fn test_file_without_includes_is_clustered_without_edges() {
        let groups = vec![group("p", "/ws/p", vec![launch_file("solo.launch.xml", &[])])];
        let graph = LaunchGraph::assemble(&groups);
        assert!(graph.edges.is_empty());
        assert_eq!(node_names(graph.cluster("p").unwrap()), vec!["p::solo.launch.xml"]);
    }

    #[test]
    fn test_same_name_groups_share_one_cluster() {
        let groups = vec![
            group("dup", "/ws/a", vec![launch_file("one.launch.xml", &[])]),
            group("other", "/ws/o", vec![launch_file("x.launch.xml", &[])]),
            group("dup", "/ws/b", vec![launch_file("two.launch.xml", &[])]),
        ];

        let graph = LaunchGraph::assemble(&groups);
        let packages: Vec<&str> = graph.clusters.iter().map(|c| c.package.as_str()).collect();
        assert_eq!(packages, vec!["dup", "other"]);
        assert_eq!(
            node_names(&graph.clusters[0]),
            vec!["dup::one.launch.xml", "dup::two.launch.xml"]
        );
    }

    #[test]
    fn test_duplicate_install_lists_node_once() {
        let groups = vec![
            group("dup", "/ws/install/dup", vec![launch_file("a.launch.xml", &[])]),
            group("dup", "/ws/src/dup", vec![launch_file("a.launch.xml", &[])]),
        ];
        let graph = LaunchGraph::assemble(&groups);
        assert_eq!(graph.clusters.len(), 1);
        assert_eq!(node_names(&graph.clusters[0]), vec!["dup::a.launch.xml"]);
    }

    #[test]
    fn test_empty_then_nonempty_same_name_is_not_dropped() {
        let groups = vec![
            group("pkg", "/ws/first", vec![]),
            group("pkg", "/ws/second", vec![launch_file("late.launch.xml", &[])]),
        ];
        let graph = LaunchGraph::assemble(&groups);
        assert_eq!(graph.clusters.len(), 1);
        assert_eq!(node_names(&graph.clusters[0]), vec!["pkg::late.launch.xml"]);
    }

    #[test]
    fn test_nonempty_then_empty_same_name() {
        let groups = vec![
            group("pkg", "/ws/first", vec![launch_file("a.launch.xml", &[])]),
            group("pkg", "/ws/second", vec![]),
        ];
        let graph = LaunchGraph::assemble(&groups);
        assert_eq!(graph.clusters.len(), 1);
        assert_eq!(node_names(&graph.clusters[0]), vec!["pkg::a.launch.xml"]);
    }

    #[test]
    fn test_package_without_launch_files_has_no_cluster() {
        let groups = vec![group("bare", "/ws/bare", vec![])];
        let graph = LaunchGraph::assemble(&groups);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_empty_package_name_still_clusters() {
        let groups = vec![group("", "/ws/broken", vec![launch_file("x.launch.xml", &[])])];
        let graph = LaunchGraph::assemble(&groups);
        assert_eq!(node_names(graph.cluster("").unwrap()), vec!["::x.launch.xml"]);
    }

    #[test]
    fn test_every_source_node_is_in_exactly_one_cluster() {
        let groups = vec![
            group("a", "/ws/a", vec![launch_file("p.launch.xml", &["$(find-pkg-share b)/q.launch.xml"])]),
            group("b", "/ws/b", vec![launch_file("q.launch.xml", &["$(find-pkg-share a)/p.launch.xml"])]),
            group("a", "/ws/a2", vec![launch_file("p.launch.xml", &[])]),
        ];
        let graph = LaunchGraph::assemble(&groups);
        for edge in &graph.edges {
            let owners = graph
                .clusters
                .iter()
                .filter(|c| c.nodes.contains(&edge.from))
                .count();
            assert_eq!(owners, 1, "{} should be in one cluster", edge.from);
        }
        assert_eq!(graph.clustered_node_count(), 2);
    }
}
