use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::chart::Margin;
use crate::parser::{FillerPolicy, ParserOptions};
use crate::render::{Backend, RenderStyle};

pub const CONFIG_SCHEMA_VERSION: &str = "replychart.config.v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyChartConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub filler: FillerPolicy,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub render: RenderSection,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderSection {
    #[serde(default)]
    pub palette: Option<Vec<String>>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub margin: Option<Margin>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub terminal_columns: Option<u16>,
}

fn default_schema_version() -> String {
    CONFIG_SCHEMA_VERSION.to_string()
}

impl Default for ReplyChartConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            filler: FillerPolicy::default(),
            backend: Backend::default(),
            render: RenderSection::default(),
        }
    }
}

impl ReplyChartConfig {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            filler: self.filler,
        }
    }

    pub fn render_style(&self) -> RenderStyle {
        let defaults = RenderStyle::default();
        let r = &self.render;
        RenderStyle {
            palette: r
                .palette
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or(defaults.palette),
            width: r.width.unwrap_or(defaults.width),
            height: r.height.unwrap_or(defaults.height),
            margin: r.margin.unwrap_or(defaults.margin),
            currency: r.currency.clone().unwrap_or(defaults.currency),
            terminal_columns: r.terminal_columns.unwrap_or(defaults.terminal_columns),
        }
    }
}

/// Read a config file; JSON is tried first, then YAML.
pub fn load_config(path: &Path) -> anyhow::Result<ReplyChartConfig> {
    let bytes = std::fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg = match serde_json::from_slice::<ReplyChartConfig>(&bytes) {
        Ok(c) => c,
        Err(_) => serde_yaml::from_slice::<ReplyChartConfig>(&bytes)
            .with_context(|| format!("parse config {}", path.display()))?,
    };
    validate_config(&cfg).with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}

pub fn validate_config(cfg: &ReplyChartConfig) -> anyhow::Result<()> {
    if cfg.schema_version != CONFIG_SCHEMA_VERSION {
        anyhow::bail!(
            "unsupported schema_version {} (expected {})",
            cfg.schema_version,
            CONFIG_SCHEMA_VERSION
        );
    }
    let r = &cfg.render;
    for (name, dim) in [("render.width", r.width), ("render.height", r.height)] {
        if let Some(v) = dim {
            if !v.is_finite() || v <= 0.0 {
                anyhow::bail!("{name} must be > 0 when set");
            }
        }
    }
    if let Some(m) = &r.margin {
        if [m.top, m.right, m.bottom, m.left]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            anyhow::bail!("render.margin values must be >= 0");
        }
    }
    if let Some(palette) = &r.palette {
        if palette.iter().any(|c| c.trim().is_empty()) {
            anyhow::bail!("render.palette contains empty entry");
        }
    }
    if r.terminal_columns == Some(0) {
        anyhow::bail!("render.terminal_columns must be > 0 when set");
    }
    Ok(())
}
