use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::layout::PADDING_BUFFER;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Margin added around a connector's bounding box on every side.
    pub padding: f32,
    /// Connectors flatter than this are drawn as straight lines.
    pub line_threshold: f32,
    /// Bezier control arm length as a fraction of the connector's extent.
    pub curvature: f32,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            padding: 16.0,
            line_threshold: 4.0,
            curvature: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub max_attempts: usize,
    pub gap: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_attempts: 32,
            gap: 16.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Grid unit drag deltas snap to, in unscaled pixels.
    pub module_size: f32,
    /// Zoom factor between unscaled module units and screen pixels.
    pub scale: f32,
    /// Room kept past the furthest node when sizing canvas padding.
    pub padding_buffer: f32,
    pub connector: ConnectorConfig,
    pub placement: PlacementConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            module_size: 4.0,
            scale: 1.0,
            padding_buffer: PADDING_BUFFER,
            connector: ConnectorConfig::default(),
            placement: PlacementConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self.sanitized()
    }

    /// Replaces values the engine cannot divide or snap by with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.scale.is_finite() && self.scale > 0.0) {
            warn!("invalid scale {}, using {}", self.scale, defaults.scale);
            self.scale = defaults.scale;
        }
        if !(self.module_size.is_finite() && self.module_size > 0.0) {
            warn!(
                "invalid module size {}, using {}",
                self.module_size, defaults.module_size
            );
            self.module_size = defaults.module_size;
        }
        if !(self.padding_buffer.is_finite() && self.padding_buffer >= 0.0) {
            self.padding_buffer = defaults.padding_buffer;
        }
        if self.placement.max_attempts == 0 {
            self.placement.max_attempts = 1;
        }
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub layout: LayoutConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectorConfigFile {
    padding: Option<f32>,
    line_threshold: Option<f32>,
    curvature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacementConfigFile {
    max_attempts: Option<usize>,
    gap: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    module_size: Option<f32>,
    scale: Option<f32>,
    padding_buffer: Option<f32>,
    connector: Option<ConnectorConfigFile>,
    placement: Option<PlacementConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(v) = parsed.module_size {
        config.layout.module_size = v;
    }
    if let Some(v) = parsed.scale {
        config.layout.scale = v;
    }
    if let Some(v) = parsed.padding_buffer {
        config.layout.padding_buffer = v;
    }
    if let Some(connector) = parsed.connector {
        if let Some(v) = connector.padding {
            config.layout.connector.padding = v;
        }
        if let Some(v) = connector.line_threshold {
            config.layout.connector.line_threshold = v;
        }
        if let Some(v) = connector.curvature {
            config.layout.connector.curvature = v;
        }
    }
    if let Some(placement) = parsed.placement {
        if let Some(v) = placement.max_attempts {
            config.layout.placement.max_attempts = v;
        }
        if let Some(v) = placement.gap {
            config.layout.placement.gap = v;
        }
    }

    config.layout = config.layout.sanitized();
    Ok(config)
}
