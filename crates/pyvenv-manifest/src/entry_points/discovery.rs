use crate::entry_points::parser::{parse_entry_points_txt, Distribution, EntryPoint};
use pyvenv_logger as logger;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Metadata directory suffixes, in the order they are searched
const METADATA_SUFFIXES: &[&str] = &[".dist-info", ".egg-info"];

const ENTRY_POINTS_FILE: &str = "entry_points.txt";

/// Lists entry points registered by installed distributions
pub trait EntryPointSource {
    /// All entry points of `group` found under `search_paths`, in discovery order
    fn list_entry_points(&self, group: &str, search_paths: &[PathBuf]) -> Vec<EntryPoint>;
}

/// Reads entry points from installed-package metadata directories
#[derive(Debug, Default, Clone, Copy)]
pub struct DistInfoEntryPoints;

impl DistInfoEntryPoints {
    pub fn new() -> Self {
        DistInfoEntryPoints
    }

    /// Find `entry_points.txt` files directly under `folder`.
    ///
    /// Returns `(name-version, file)` pairs, dist-info directories first.
    fn metadata_files(folder: &Path) -> Vec<(String, PathBuf)> {
        let mut found = Vec::new();
        if !folder.is_dir() {
            debug!("Skipping non-directory search path: {}", folder.display());
            return found;
        }

        let dirs: Vec<_> = WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .collect();

        for suffix in METADATA_SUFFIXES {
            for entry in &dirs {
                let file_name = entry.file_name().to_string_lossy();
                let Some(name_version) = file_name.strip_suffix(*suffix) else {
                    continue;
                };
                let entry_points = entry.path().join(ENTRY_POINTS_FILE);
                if entry_points.is_file() {
                    found.push((name_version.to_string(), entry_points));
                }
            }
        }

        found
    }
}

impl EntryPointSource for DistInfoEntryPoints {
    fn list_entry_points(&self, group: &str, search_paths: &[PathBuf]) -> Vec<EntryPoint> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();

        for folder in search_paths {
            for (name_version, file) in Self::metadata_files(folder) {
                // The first copy of a distribution name wins, whatever its version
                let distribution = Distribution::from_name_version(&name_version);
                if !seen.insert(distribution.name.clone()) {
                    debug!("Skipping shadowed distribution: {}", file.display());
                    continue;
                }

                let content = match fs::read_to_string(&file) {
                    Ok(content) => content,
                    Err(e) => {
                        logger::warn(&format!("Failed to read {}: {}", file.display(), e));
                        continue;
                    }
                };

                for line in parse_entry_points_txt(&content)
                    .into_iter()
                    .filter(|line| line.section == group)
                {
                    match EntryPoint::parse(&line.name, &line.value, Some(distribution.clone())) {
                        Some(ep) => result.push(ep),
                        None => logger::warn(&format!(
                            "Bad entry point '{} = {}' in {}",
                            line.name,
                            line.value,
                            file.display()
                        )),
                    }
                }
            }
        }

        debug!("Found {} entry points in group {}", result.len(), group);
        result
    }
}
