//! Entry point discovery
//!
//! Entry points are declared by installed distributions in
//! `*.dist-info/entry_points.txt` (or `*.egg-info/entry_points.txt`), an INI
//! file whose sections are entry point groups such as `console_scripts`.

pub mod discovery;
pub mod parser;

pub use discovery::{DistInfoEntryPoints, EntryPointSource};
pub use parser::{parse_entry_points_txt, Distribution, EntryPoint};
