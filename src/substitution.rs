use std::fmt;

use serde::Serialize;

/// Substitutions that name a package by its install location.
const PACKAGE_LOOKUP_KEYWORDS: &[&str] = &["find-pkg-share", "find-pkg-prefix"];

/// Opening of a launch-argument substitution, e.g. `$(var robot_pkg)`.
const VAR_SUBSTITUTION: &str = "$(var ";

/// The package an include reference points into, as far as it can be told
/// from the attribute text without running the launch system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PackageRef {
    /// A literal package name, e.g. `$(find-pkg-share my_pkg)`.
    Named(String),
    /// The package name is itself a substitution, e.g.
    /// `$(find-pkg-share $(var dyn_pkg))`. Holds the inner text verbatim; it
    /// is not a real package name.
    Placeholder(String),
    /// No package lookup at all, e.g. `$(var pkg)_description/...`.
    Unresolved,
}

impl PackageRef {
    /// Returns the identifier used when composing graph node ids.
    pub fn as_str(&self) -> &str {
        match self {
            PackageRef::Named(name) | PackageRef::Placeholder(name) => name,
            PackageRef::Unresolved => "",
        }
    }

    /// Returns `true` if the package is a literal name.
    pub fn is_named(&self) -> bool {
        matches!(self, PackageRef::Named(_))
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the package named by the first path segment of an include expression.
///
/// Only the first `/`-separated segment can carry the package lookup; the rest
/// of the path is ignored. Never fails: anything that cannot be decided
/// statically degrades to [`PackageRef::Placeholder`] or [`PackageRef::Unresolved`].
pub fn resolve_package(expr: &str) -> PackageRef {
    let root = expr.split('/').next().unwrap_or_default();

    let Some(arg) = package_lookup_argument(root) else {
        return PackageRef::Unresolved;
    };

    if arg.contains(VAR_SUBSTITUTION) {
        return PackageRef::Placeholder(arg.to_string());
    }

    match arg.trim() {
        "" => PackageRef::Unresolved,
        name => PackageRef::Named(name.to_string()),
    }
}

/// Returns the argument of the first package-lookup substitution in `segment`.
fn package_lookup_argument(segment: &str) -> Option<&str> {
    let (start, opener_len) = PACKAGE_LOOKUP_KEYWORDS
        .iter()
        .filter_map(|kw| {
            let opener = format!("$({kw} ");
            segment.find(&opener).map(|pos| (pos, opener.len()))
        })
        .min_by_key(|(pos, _)| *pos)?;

    let rest = &segment[start + opener_len..];
    let end = matching_paren(rest).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Byte offset of the `)` closing a substitution whose body starts at `body[0]`.
fn matching_paren(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Last element of a `/`-separated path. Trailing slashes are dropped, `""`
/// becomes `"."` and a path of only slashes becomes `"/"`.
pub fn base_name(expr: &str) -> &str {
    if expr.is_empty() {
        return ".";
    }
    let trimmed = expr.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind('/') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}
