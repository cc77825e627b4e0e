use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};

use crate::substitution::{PackageRef, base_name, resolve_package};
use crate::xml;

/// A declared argument from a ROS 2 launch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchArg {
    /// Argument name as declared in the launch file.
    pub name: String,
    /// Default value for the argument, or empty if none is specified.
    pub default_value: String,
}

/// A `<group>` element directly under `<launch>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchGroup {
    /// The group's `if` attribute, kept verbatim.
    pub condition: Option<String>,
    /// Raw `file` attributes of the group's `<include>` children, in document order.
    pub includes: Vec<String>,
}

/// The parts of a `*.launch.xml` document the graph cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchDocument {
    pub args: Vec<LaunchArg>,
    pub groups: Vec<LaunchGroup>,
}

/// One include site, resolved as far as static text allows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeReference {
    /// Package the included file belongs to.
    pub target_package: PackageRef,
    /// Base filename of the included launch file.
    pub target_file: String,
    /// The raw `file` attribute.
    pub expression: String,
    /// `if` attribute of the enclosing group.
    pub condition: Option<String>,
}

impl IncludeReference {
    /// Builds a reference from the raw `file` attribute of an `<include>`.
    pub fn from_expression(expression: &str, condition: Option<String>) -> Self {
        Self {
            target_package: resolve_package(expression),
            target_file: base_name(expression).to_string(),
            expression: expression.to_string(),
            condition,
        }
    }
}

/// A parsed launch file.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchFile {
    /// Base filename, e.g. `planning.launch.xml`.
    pub name: String,
    pub full_path: PathBuf,
    pub args: Vec<LaunchArg>,
    /// Includes from every conditional group, in document order. Duplicates are kept.
    pub includes: Vec<IncludeReference>,
}

/// Reads a launch file and collects the includes of its conditional groups.
///
/// Fails only if the file cannot be read. Malformed XML yields whatever was
/// recognized before the syntax error.
pub fn read_launch_file(path: &Path) -> Result<LaunchFile> {
    let content = xml::read_source(path)?;
    let (doc, error) = parse_document(&content);
    if let Some(e) = error {
        warn!("{}: malformed launch file, keeping partial content: {e}", path.display());
    }

    let includes: Vec<IncludeReference> = doc
        .groups
        .iter()
        .flat_map(|group| {
            group
                .includes
                .iter()
                .map(|file| IncludeReference::from_expression(file, group.condition.clone()))
        })
        .collect();

    debug!("launch {}: {} include(s)", path.display(), includes.len());

    Ok(LaunchFile {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        full_path: path.to_path_buf(),
        args: doc.args,
        includes,
    })
}

/// Parses launch XML text, ignoring anything after the first syntax error or
/// after the root element closes.
pub fn parse_launch_xml(content: &str) -> LaunchDocument {
    parse_document(content).0
}

fn parse_document(content: &str) -> (LaunchDocument, Option<quick_xml::Error>) {
    let mut reader = Reader::from_str(content);
    let mut doc = LaunchDocument::default();
    let mut open: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = xml::tag_name(&e);
                if !doc.visit(&open, &tag, &e) {
                    return (LaunchDocument::default(), None);
                }
                open.push(tag);
            }
            Ok(Event::Empty(e)) => {
                let tag = xml::tag_name(&e);
                if !doc.visit(&open, &tag, &e) {
                    return (LaunchDocument::default(), None);
                }
                if open.is_empty() {
                    break;
                }
            }
            Ok(Event::End(_)) => {
                open.pop();
                // Only the first root element counts.
                if open.is_empty() {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return (doc, Some(e)),
            _ => {}
        }
    }

    (doc, None)
}

impl LaunchDocument {
    /// Records an element opened under `open`. Returns `false` if the root is not `<launch>`.
    fn visit(&mut self, open: &[String], tag: &str, e: &BytesStart<'_>) -> bool {
        match (open.len(), open.last().map(String::as_str), tag) {
            (0, _, "launch") => {}
            (0, _, _) => return false,
            (1, _, "arg") => self.args.push(LaunchArg {
                name: xml::attribute(e, "name").unwrap_or_default(),
                default_value: xml::attribute(e, "default").unwrap_or_default(),
            }),
            (1, _, "group") => self.groups.push(LaunchGroup {
                condition: xml::attribute(e, "if"),
                includes: Vec::new(),
            }),
            (2, Some("group"), "include") => {
                if let Some(file) = xml::attribute(e, "file")
                    && let Some(group) = self.groups.last_mut()
                {
                    group.includes.push(file);
                }
            }
            _ => {}
        }
        true
    }
}
