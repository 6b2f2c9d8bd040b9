use clap::Parser;
use pyvenv::{
    commands::build::{handle_build, BuildContext},
    post_install::Launcher,
    process::ProcessRunner,
    GlobalOpts,
};
use pyvenv_config::BuildConfig;
use pyvenv_logger as logger;
use pyvenv_manifest::DistInfoEntryPoints;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pyvenv")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Build a Python virtual environment from a dependency manifest",
    long_about = "pyvenv creates a virtual environment, symlinks the files listed in the \
                  DEPS_FILE manifest into its site-packages, writes console scripts for \
                  the linked distributions and runs any EXTRA_PIP_COMMANDS."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    /// Destination of the virtual environment, relative to BUILD_WORKING_DIRECTORY
    venv_path: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PYVENV_TRACE")
        .unwrap_or_else(|_| EnvFilter::new(logger::verbosity_to_filter()));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        logger::warn(&format!("Failed to initialize tracing: {}", e));
    }
}

fn main() {
    let cli = Cli::parse();
    logger::set_verbosity(cli.global.verbosity_level());

    // Read before touching the file system so configuration errors have no side effects
    let config = match BuildConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            logger::error(&e.to_string());
            std::process::exit(1);
        }
    };

    let log_file = cli.global.log_file.clone().or_else(|| config.log_file.clone());
    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), log_file.as_deref())
    {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    let source_root = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            logger::error(&format!("Could not determine current directory: {}", e));
            std::process::exit(1);
        }
    };

    let runner = ProcessRunner;
    let entry_points = DistInfoEntryPoints::new();
    let ctx = BuildContext {
        source_root,
        runner: &runner,
        entry_points: &entry_points,
        launcher: Launcher::detect(),
    };

    match handle_build(&cli.venv_path, &config, &ctx) {
        Ok(summary) => {
            logger::success(&format!(
                "Built {} ({} files linked, {} console scripts)",
                summary.venv_path.display(),
                summary.linked,
                summary.scripts
            ));
        }
        Err(e) => {
            logger::error(&e.to_string());
            logger::show_log_path();
            std::process::exit(e.exit_code());
        }
    }
}
