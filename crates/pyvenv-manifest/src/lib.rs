//! Dependency manifest handling
//!
//! Reads the build-system manifest that lists the files of a dependency
//! closure and maps each one to its location inside the environment's
//! site-packages. Also discovers console-script entry points registered by
//! installed distributions.

pub mod entry_points;
pub mod errors;
pub mod manifest;
pub mod types;

pub use entry_points::{DistInfoEntryPoints, Distribution, EntryPoint, EntryPointSource};
pub use errors::ManifestError;
pub use manifest::{env_files, get_env_path, is_external, parse_deps, read_deps_file};
pub use types::{DepsManifest, EnvFile, FileKind, ManifestEntry};
