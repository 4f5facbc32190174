pub mod geometry;
pub mod svg;
pub mod terminal;

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::chart::{ChartDescriptor, Margin};
use crate::render::geometry::Frame;
use crate::render::svg::SvgRenderer;
use crate::render::terminal::TerminalRenderer;

pub const DEFAULT_PALETTE: [&str; 10] = [
    "#6366f1", "#f43f5e", "#8b5cf6", "#ec4899", "#3b82f6", "#14b8a6", "#f59e0b", "#84cc16",
    "#06b6d4", "#a855f7",
];

pub const DEFAULT_MARGIN: Margin = Margin {
    top: 40.0,
    right: 30.0,
    bottom: 60.0,
    left: 60.0,
};

pub const DEFAULT_WIDTH: f64 = 600.0;
pub const DEFAULT_HEIGHT: f64 = 400.0;
pub const DEFAULT_TERMINAL_COLUMNS: u16 = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Svg,
    Terminal,
}

/// Renderer-wide defaults; per-chart `RenderOptions` take precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub palette: Vec<String>,
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub currency: String,
    pub terminal_columns: u16,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            margin: DEFAULT_MARGIN,
            currency: "$".to_string(),
            terminal_columns: DEFAULT_TERMINAL_COLUMNS,
        }
    }
}

impl RenderStyle {
    pub fn frame_for(&self, chart: &ChartDescriptor) -> Frame {
        let opts = &chart.options;
        Frame {
            width: opts.width.unwrap_or(self.width),
            height: opts.height.unwrap_or(self.height),
            margin: opts.margin.unwrap_or(self.margin),
        }
    }

    pub fn palette_for<'a>(&'a self, chart: &'a ChartDescriptor) -> &'a [String] {
        match chart.options.colors.as_deref() {
            Some(colors) if !colors.is_empty() => colors,
            _ => &self.palette,
        }
    }
}

/// What a renderer hands back. Opaque to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualOutput {
    pub media_type: &'static str,
    pub body: String,
}

impl fmt::Display for VisualOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &ChartDescriptor) -> VisualOutput;
}

/// Picks the backend for a validated descriptor. Each backend then picks the
/// drawing routine from the chart kind.
#[derive(Debug, Clone, Default)]
pub struct ChartDispatcher {
    backend: Backend,
    style: RenderStyle,
}

impl ChartDispatcher {
    pub fn new(backend: Backend, style: RenderStyle) -> Self {
        Self { backend, style }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }
}

impl ChartRenderer for ChartDispatcher {
    fn render(&self, chart: &ChartDescriptor) -> VisualOutput {
        tracing::debug!(
            backend = ?self.backend,
            kind = %chart.kind,
            points = chart.points.len(),
            "rendering chart"
        );
        match self.backend {
            Backend::Svg => SvgRenderer::new(&self.style).render(chart),
            Backend::Terminal => TerminalRenderer::new(&self.style).render(chart),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Backend, ChartDispatcher, ChartRenderer, RenderStyle, DEFAULT_MARGIN};
    use crate::chart::{ChartDescriptor, ChartKind, DataPoint, Margin, RenderOptions};

    fn chart(options: RenderOptions) -> ChartDescriptor {
        ChartDescriptor {
            kind: ChartKind::Bar,
            points: vec![DataPoint::new("a", 1.0)],
            options,
        }
    }

    #[test]
    fn chart_options_override_style_defaults() {
        let style = RenderStyle::default();
        let c = chart(RenderOptions {
            width: Some(800.0),
            margin: Some(Margin {
                top: 1.0,
                right: 2.0,
                bottom: 3.0,
                left: 4.0,
            }),
            colors: Some(vec!["#000".to_string()]),
            ..RenderOptions::default()
        });
        let frame = style.frame_for(&c);
        assert_eq!(frame.width, 800.0);
        assert_eq!(frame.height, style.height);
        assert_eq!(frame.margin.left, 4.0);
        assert_eq!(style.palette_for(&c), ["#000".to_string()]);
    }

    #[test]
    fn empty_palette_falls_back_to_style() {
        let style = RenderStyle::default();
        let c = chart(RenderOptions {
            colors: Some(Vec::new()),
            ..RenderOptions::default()
        });
        assert_eq!(style.palette_for(&c).len(), 10);
        assert_eq!(style.frame_for(&c).margin, DEFAULT_MARGIN);
    }

    #[test]
    fn dispatcher_selects_backend() {
        let c = chart(RenderOptions::default());
        let svg = ChartDispatcher::new(Backend::Svg, RenderStyle::default()).render(&c);
        assert_eq!(svg.media_type, "image/svg+xml");
        let term = ChartDispatcher::new(Backend::Terminal, RenderStyle::default()).render(&c);
        assert_eq!(term.media_type, "text/plain");
    }
}
