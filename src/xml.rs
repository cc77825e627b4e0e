//! Small helpers shared by the `package.xml` and launch-file readers.

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::BytesStart;

/// Reads an XML file for tolerant parsing.
///
/// A failed read is an error. Invalid UTF-8 is decoded lossily so that only the
/// parser decides what is malformed.
pub(crate) fn read_source(path: &Path) -> Result<String> {
    let raw = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(match String::from_utf8_lossy(&raw) {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    })
}

/// Element name of a start or empty tag.
pub(crate) fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

/// Value of the attribute `name`, or `None` if it is absent or unreadable.
pub(crate) fn attribute(e: &BytesStart<'_>, name: &str) -> Option<String> {
    let attr = e.try_get_attribute(name).ok().flatten()?;
    Some(match attr.unescape_value() {
        Ok(value) => value.to_string(),
        Err(_) => String::from_utf8_lossy(&attr.value).to_string(),
    })
}
