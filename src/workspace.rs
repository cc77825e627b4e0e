use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Serialize;

use crate::launch::{LaunchFile, read_launch_file};
use crate::xml;

/// File name of a ROS 2 package manifest.
pub const MANIFEST_FILE_NAME: &str = "package.xml";

/// Suffix shared by all XML launch files.
pub const LAUNCH_FILE_SUFFIX: &str = ".launch.xml";

/// A directory tree (typically a colcon `install/` tree) searched for packages and launch files.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Root directory of the search.
    pub root: PathBuf,
}

/// A package discovered from a `package.xml` manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    /// Package name from `<name>` in `package.xml`; empty if the manifest is malformed.
    pub name: String,
    /// Path to the `package.xml` itself.
    pub manifest_path: PathBuf,
    /// Directory containing the manifest. Launch files are searched below it.
    pub location: PathBuf,
}

/// A package together with every launch file found under its location.
///
/// The same package name can appear in several groups when a manifest is
/// installed more than once, e.g. `share/<pkg>/package.xml` and a symlinked copy.
#[derive(Debug, Clone, Serialize)]
pub struct PackageLaunchGroup {
    pub package: Package,
    pub launch_files: Vec<LaunchFile>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the workspace display name (last path component, or `"."` for cwd).
    pub fn name(&self) -> &str {
        self.root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(".")
    }

    /// Returns every `package.xml` under the root.
    pub fn manifests(&self) -> Result<Vec<PathBuf>> {
        find_files(&self.root, |name| name == MANIFEST_FILE_NAME)
    }

    /// Returns every `*.launch.xml` under the root.
    pub fn launch_file_paths(&self) -> Result<Vec<PathBuf>> {
        find_launch_files(&self.root)
    }

    /// Reads the manifest of every package under the root, in discovery order.
    pub fn packages(&self) -> Result<Vec<Package>> {
        self.manifests()?
            .into_iter()
            .map(|manifest_path| -> Result<Package> {
                let name = read_package_name(&manifest_path)?;
                let location = manifest_path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone());
                debug!("package '{name}' at {}", location.display());
                Ok(Package {
                    name,
                    manifest_path,
                    location,
                })
            })
            .collect()
    }

    /// Discovers all packages and parses the launch files below each of them.
    pub fn launch_groups(&self) -> Result<Vec<PackageLaunchGroup>> {
        self.packages()?
            .into_iter()
            .map(PackageLaunchGroup::from_package)
            .collect()
    }
}

impl PackageLaunchGroup {
    /// Parses every launch file under the package's location.
    pub fn from_package(package: Package) -> Result<Self> {
        let launch_files = find_launch_files(&package.location)?
            .iter()
            .map(|path| read_launch_file(path))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            package,
            launch_files,
        })
    }
}

/// Returns every launch file below `dir`.
pub fn find_launch_files(dir: &Path) -> Result<Vec<PathBuf>> {
    find_files(dir, |name| name.ends_with(LAUNCH_FILE_SUFFIX))
}

/// Walks `root` and returns the files whose base name satisfies `keep`.
///
/// Nothing is filtered out (hidden files and ignore rules included) and
/// symlinked directories are not entered; symlinks to files are kept. Entries
/// are visited in file-name order. Any unreadable directory aborts the walk.
pub fn find_files(root: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;

        let is_file = entry.file_type().is_some_and(|ft| {
            ft.is_file() || (ft.is_symlink() && entry.path().is_file())
        });
        if !is_file {
            continue;
        }

        if keep(&entry.file_name().to_string_lossy()) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Reads the declared package name from a `package.xml`.
///
/// Fails only if the file cannot be read; a malformed manifest yields an empty name.
pub fn read_package_name(manifest: &Path) -> Result<String> {
    let content = xml::read_source(manifest)?;
    let (name, error) = parse_manifest(&content);
    if let Some(e) = error {
        warn!("{}: malformed manifest: {e}", manifest.display());
    }
    Ok(name)
}

/// Extracts the `<name>` of a `<package>` document, or `""` if there is none.
pub fn parse_package_name(content: &str) -> String {
    parse_manifest(content).0
}

fn parse_manifest(content: &str) -> (String, Option<quick_xml::Error>) {
    let mut reader = Reader::from_str(content);

    let mut name: Option<String> = None;
    let mut text = String::new();
    let mut open: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = xml::tag_name(&e);
                if open.is_empty() && tag != "package" {
                    return (String::new(), None);
                }
                open.push(tag);
            }
            Ok(Event::Empty(e)) => {
                if open.is_empty() {
                    // `<package/>` or a wrong root; either way there is no name.
                    return (String::new(), None);
                }
            }
            Ok(Event::Text(e)) if in_name(&open) && name.is_none() => {
                match e.unescape() {
                    Ok(t) => text.push_str(&t),
                    Err(err) => return (String::new(), Some(err.into())),
                }
            }
            Ok(Event::CData(e)) if in_name(&open) && name.is_none() => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(_)) => {
                if in_name(&open) && name.is_none() {
                    name = Some(text.trim().to_string());
                }
                open.pop();
                if open.is_empty() {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return (name.unwrap_or_default(), Some(e)),
            _ => {}
        }
    }

    (name.unwrap_or_default(), None)
}

fn in_name(open: &[String]) -> bool {
    open.len() == 2 && open[1] == "name"
}
