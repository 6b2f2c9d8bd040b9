//! pyvenv library - expose modules for testing
//!
//! Builds a Python virtual environment from a build-system dependency
//! manifest: create the environment, link the manifest's files into
//! site-packages, write console-script shims, then run extra pip commands.

pub mod commands;
pub mod common;
pub mod env_builder;
pub mod errors;
pub mod linker;
pub mod post_install;
pub mod process;
pub mod scripts;

pub use common::GlobalOpts;
pub use errors::BuildError;
