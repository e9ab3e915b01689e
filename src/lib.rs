pub mod cli;
pub mod config;
pub mod draw;
pub mod error;
pub mod generalization;
pub mod geometry;
pub mod layout;
pub mod metrics;
pub mod model;
pub mod parser;
pub mod route;
pub mod scene;
pub mod session;
pub mod symbols;

pub use error::{Error, ParseError};
pub use parser::parse;

use config::AppConfig;
use metrics::MonospaceMetrics;
use session::Session;

/// Draws `source` with the default configuration and returns the primitive
/// listing, one primitive per line.
pub fn render(source: &str) -> Result<String, ParseError> {
    render_with_config(source, &AppConfig::default())
}

pub fn render_with_config(source: &str, config: &AppConfig) -> Result<String, ParseError> {
    let metrics = MonospaceMetrics::new(config.metrics);
    let session = Session::open(source, config.layout, &metrics)?;
    Ok(session.redraw().to_string())
}
