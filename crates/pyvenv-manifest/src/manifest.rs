//! Manifest reader
//!
//! Buckets manifest files into external and workspace groups and computes
//! each file's path inside site-packages. External files keep only the part
//! after their import namespace; workspace files keep their path unchanged
//! but are only included when the build generated them.

use crate::errors::ManifestError;
use crate::types::{DepsManifest, EnvFile, FileKind};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Prefix that marks a path as escaping the workspace into an external repository
pub const EXTERNAL_PREFIX: &str = "../";

/// Whether a manifest path points outside the workspace
pub fn is_external(path: &str) -> bool {
    path.starts_with(EXTERNAL_PREFIX)
}

/// Compute the site-packages relative path of a manifest path.
///
/// Workspace paths map to themselves. External paths must live under one of
/// `imports` (first match wins) and lose their `../{import}/` prefix; an
/// external path under no import yields `None`.
pub fn get_env_path<'a>(path: &'a str, imports: &[String]) -> Option<&'a str> {
    if !is_external(path) {
        return Some(path);
    }

    imports.iter().find_map(|import| {
        path.strip_prefix(EXTERNAL_PREFIX)?
            .strip_prefix(import.as_str())?
            .strip_prefix('/')
    })
}

/// Resolve every manifest entry that belongs in the environment, in manifest order
pub fn env_files(manifest: &DepsManifest) -> Vec<EnvFile> {
    let mut files = Vec::new();

    for entry in &manifest.files {
        let Some(env_path) = get_env_path(&entry.path, &manifest.imports) else {
            debug!("Dropping external file outside imports: {}", entry.path);
            continue;
        };
        if env_path.is_empty() {
            continue;
        }

        // External files are always kept; only generated workspace files are
        if is_external(&entry.path) || entry.kind == FileKind::Generated {
            files.push(EnvFile::new(entry.path.as_str(), env_path));
        } else {
            debug!("Skipping non-generated workspace file: {}", entry.path);
        }
    }

    files
}

/// Parse manifest JSON and resolve its files
pub fn parse_deps(content: &str) -> Result<Vec<EnvFile>, ManifestError> {
    let manifest: DepsManifest = serde_json::from_str(content)?;
    let files = env_files(&manifest);
    debug!(
        "Manifest lists {} files, {} belong in the environment",
        manifest.files.len(),
        files.len()
    );
    Ok(files)
}

/// Read and resolve the manifest at `path`
pub fn read_deps_file(path: &Path) -> Result<Vec<EnvFile>, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_deps(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn imports(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_workspace_path_maps_to_itself() {
        assert_eq!(
            get_env_path("pkg/sub/mod.py", &imports(&["libA"])),
            Some("pkg/sub/mod.py")
        );
        assert_eq!(get_env_path("pkg/mod.py", &[]), Some("pkg/mod.py"));
    }

    #[test]
    fn test_external_path_strips_import_prefix() {
        assert_eq!(
            get_env_path("../libA/sub/x.py", &imports(&["libA"])),
            Some("sub/x.py")
        );
    }

    #[test]
    fn test_external_path_requires_full_namespace_component() {
        // "libAB" must not match the "libA" import
        assert_eq!(get_env_path("../libAB/x.py", &imports(&["libA"])), None);
    }

    #[test]
    fn test_first_matching_import_wins() {
        let path = "../pip_deps/requests/api.py";
        assert_eq!(
            get_env_path(path, &imports(&["pip_deps", "pip_deps/requests"])),
            Some("requests/api.py")
        );
        assert_eq!(
            get_env_path(path, &imports(&["pip_deps/requests", "pip_deps"])),
            Some("api.py")
        );
    }

    #[test]
    fn test_unmatched_external_path_is_dropped() {
        assert_eq!(get_env_path("../libB/y.py", &imports(&["libA"])), None);
        let files = parse_deps(r#"{"imports": ["libA"], "files": [{"t": "E", "p": "../libB/y.py"}]}"#);
        assert!(files.is_ok_and(|f| f.is_empty()));
    }

    #[test]
    fn test_reader_scenario() {
        let content = r#"{"imports": ["libA"], "files": [
            {"t":"G","p":"pkg/mod.py"},
            {"t":"E","p":"../libA/sub/x.py"},
            {"t":"E","p":"../libB/y.py"}
        ]}"#;
        let files = parse_deps(content);
        let Ok(files) = files else {
            panic!("manifest should parse");
        };
        assert_eq!(
            files,
            vec![
                EnvFile::new("pkg/mod.py", "pkg/mod.py"),
                EnvFile::new("../libA/sub/x.py", "sub/x.py"),
            ]
        );
    }

    #[test]
    fn test_non_generated_workspace_file_excluded() {
        let content = r#"{"imports": [], "files": [
            {"t":"S","p":"pkg/source.py"},
            {"t":"E","p":"pkg/not_really_external.py"},
            {"t":"G","p":"pkg/generated_pb2.py"}
        ]}"#;
        let files = parse_deps(content);
        assert!(files.is_ok_and(|f| f == vec![EnvFile::new(
            "pkg/generated_pb2.py",
            "pkg/generated_pb2.py"
        )]));
    }

    #[test]
    fn test_external_file_kept_regardless_of_tag() {
        let content = r#"{"imports": ["libA"], "files": [
            {"t":"S","p":"../libA/a.py"},
            {"t":"G","p":"../libA/b.py"}
        ]}"#;
        let files = parse_deps(content);
        assert!(files.is_ok_and(|f| f.len() == 2));
    }

    #[test]
    fn test_empty_mapped_path_is_skipped() {
        let content = r#"{"imports": ["libA"], "files": [{"t":"E","p":"../libA/"}]}"#;
        assert!(parse_deps(content).is_ok_and(|f| f.is_empty()));
    }

    #[test]
    fn test_missing_keys_is_parse_error() {
        let result = parse_deps(r#"{"files": []}"#);
        assert!(matches!(result, Err(ManifestError::Parse(_))));
        let result = parse_deps(r#"{"imports": []}"#);
        assert!(matches!(result, Err(ManifestError::Parse(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = parse_deps("{\"imports\": [");
        assert!(matches!(result, Err(ManifestError::Parse(_))));
    }

    #[test]
    fn test_read_deps_file() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let path = temp.path().join("deps.json");
        assert!(fs::write(
            &path,
            r#"{"imports": ["libA"], "files": [{"t":"E","p":"../libA/x.py"}], "extra": 1}"#
        )
        .is_ok());
        let files = read_deps_file(&path);
        assert!(files.is_ok_and(|f| f == vec![EnvFile::new("../libA/x.py", "x.py")]));

        let missing = read_deps_file(&temp.path().join("missing.json"));
        assert!(matches!(missing, Err(ManifestError::Io { .. })));
    }
}
