//! Manifest data model

use serde::Deserialize;

/// Classification tag of a manifest file entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum FileKind {
    /// `"E"`: a file from an external repository
    External,
    /// `"G"`: a file produced by the build itself
    Generated,
    /// Any other tag, e.g. `"S"` for checked-in source
    Other(String),
}

impl From<String> for FileKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "E" => FileKind::External,
            "G" => FileKind::Generated,
            _ => FileKind::Other(tag),
        }
    }
}

/// One `{t, p}` entry of the manifest's `files` list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "t")]
    pub kind: FileKind,
    #[serde(rename = "p")]
    pub path: String,
}

/// The dependency manifest written by the build system
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DepsManifest {
    /// Import namespaces, in priority order
    pub imports: Vec<String>,
    pub files: Vec<ManifestEntry>,
}

/// A manifest file resolved to its location inside site-packages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFile {
    /// Path as listed in the manifest, relative to the build's execroot
    pub source_path: String,
    /// Path relative to site-packages
    pub target_path: String,
}

impl EnvFile {
    pub fn new(source_path: impl Into<String>, target_path: impl Into<String>) -> Self {
        EnvFile {
            source_path: source_path.into(),
            target_path: target_path.into(),
        }
    }
}
