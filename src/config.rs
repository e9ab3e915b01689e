//! Settings for grid layout and the monospace size estimator.
//!
//! Every field has a default, so a TOML file only needs the values it
//! overrides:
//!
//! ```toml
//! [layout]
//! padding = 80
//!
//! [metrics]
//! char_width = 7.5
//! ```

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Grid pitch used by [`auto_layout`](crate::layout::auto_layout).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub padding: f32,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 150.0,
            cell_width: 200.0,
            cell_height: 200.0,
        }
    }
}

/// Character-cell metrics for [`MonospaceMetrics`](crate::metrics::MonospaceMetrics).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub char_width: f32,
    pub row_height: f32,
    pub padding: f32,
    pub min_width: f32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            row_height: 20.0,
            padding: 12.0,
            min_width: 120.0,
        }
    }
}
