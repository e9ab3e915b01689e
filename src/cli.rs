//! Command-line front end: argument parsing, config lookup and the listing
//! surface.

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use clap::Parser;
use directories::ProjectDirs;
use log::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::Error;
use crate::metrics::MonospaceMetrics;
use crate::session::Session;

#[derive(Debug, Parser)]
#[command(name = "erdraw", about = "Lay out an ER model and list its draw primitives")]
pub struct Args {
    /// Model source (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Reads the model, draws it and prints one primitive per line.
///
/// Elements whose geometry fails are reported as warnings; the rest of the
/// diagram is still printed.
pub fn run(args: &Args) -> Result<(), Error> {
    let config = load_config(args.config.as_deref())?;
    let source = read_source(args.file.as_deref())?;

    let metrics = MonospaceMetrics::new(config.metrics);
    let session = Session::open(&source, config.layout, &metrics)?;
    let drawing = session.redraw();

    for err in &drawing.errors {
        warn!(error:% = err; "Element not drawn");
    }
    println!("{drawing}");
    Ok(())
}

fn read_source(file: Option<&Path>) -> Result<String, Error> {
    match file {
        Some(path) => {
            debug!(path = path.display().to_string(); "Reading model file");
            Ok(fs::read_to_string(path)?)
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Finds the configuration to use.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (`erdraw/config.toml`)
/// 3. Platform-specific config directory
/// 4. Defaults
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig, Error> {
    if let Some(path) = explicit_path {
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("erdraw/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "erdraw", "erdraw") {
        let system_config = proj_dirs.config_dir().join("config.toml");
        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(&system_config);
        }
        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: &Path) -> Result<AppConfig, Error> {
    if !path.exists() {
        return Err(Error::MissingConfig(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
