//! pacwall entry point.
//!
//! Resolves the run options and moves into the configuration directory the
//! rest of the run works from. Resolution errors end the process here, and
//! only here.

use anyhow::{Context, Result};
use pacwall_opts::{ConfigLoader, ConfigPaths, Options, ResolveError, logging};
use std::path::Path;
use tracing::{debug, info, warn};

fn main() {
    if let Err(e) = logging::init() {
        eprintln!("Warning: could not initialize logging: {e:#}");
    }

    if let Err(e) = run() {
        // Resolution errors already carry their cause in the message.
        let code = match e.downcast_ref::<ResolveError>() {
            Some(err) => {
                eprintln!("{err}");
                err.exit_code()
            }
            None => {
                eprintln!("{e:#}");
                1
            }
        };
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let paths = ConfigPaths::discover()?;
    enter_config_dir(&paths.config_dir)?;

    let args: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let opts = ConfigLoader::new(paths).resolve(&args)?;

    log_resolved(&opts);
    Ok(())
}

/// Create the configuration directory if needed and make it the working
/// directory. Generated files are written relative to it.
fn enter_config_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create {}", dir.display()))?;
    std::env::set_current_dir(dir)
        .with_context(|| format!("Could not change directory to {}", dir.display()))?;
    debug!(dir = %dir.display(), "Entered configuration directory");
    Ok(())
}

fn log_resolved(opts: &Options) {
    match serde_yaml::to_string(opts) {
        Ok(yaml) => debug!("Resolved options:\n{}", yaml),
        Err(e) => warn!(error = %e, "Could not render resolved options"),
    }
    info!(
        repositories = opts.attributes.package.repository.len(),
        skip_fetch = opts.skip.fetch,
        skip_generate = opts.skip.generate,
        skip_hook = opts.skip.hook,
        "Options resolved"
    );
}
