use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::chart::{ChartDescriptor, ChartKind};
use crate::render::geometry::{format_amount, pie_layout, series_order};
use crate::render::{ChartRenderer, RenderStyle, VisualOutput};

const MEDIA_TYPE: &str = "text/plain";
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const ROW_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Blue,
    Color::Green,
    Color::Yellow,
    Color::Red,
];
const MAX_LABEL_CHARS: usize = 18;

#[derive(Debug, Clone)]
pub struct TerminalRenderer<'a> {
    style: &'a RenderStyle,
}

struct Row {
    label: String,
    value: f64,
    share: Option<f64>,
}

impl<'a> TerminalRenderer<'a> {
    pub fn new(style: &'a RenderStyle) -> Self {
        Self { style }
    }

    /// Styled lines plus their plain-text twin.
    pub fn render_styled(&self, chart: &ChartDescriptor) -> (Text<'static>, String) {
        let mut lines = Vec::<Line<'static>>::new();
        if let Some(title) = chart.title() {
            lines.push(Line::from(Span::styled(
                title.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
        }
        match chart.kind {
            ChartKind::Pie | ChartKind::Donut => {
                let rows = pie_layout(&chart.points)
                    .into_iter()
                    .map(|s| Row {
                        label: chart.points[s.index].label.clone(),
                        value: chart.points[s.index].value,
                        share: Some(s.fraction),
                    })
                    .collect::<Vec<_>>();
                self.push_bars(&mut lines, &rows);
            }
            ChartKind::Bar => {
                let rows = chart
                    .points
                    .iter()
                    .map(|p| Row {
                        label: p.label.clone(),
                        value: p.value,
                        share: None,
                    })
                    .collect::<Vec<_>>();
                self.push_bars(&mut lines, &rows);
            }
            ChartKind::Line | ChartKind::Area | ChartKind::Scatter => {
                self.push_sparkline(&mut lines, chart);
            }
        }
        for caption in [chart.options.x_axis.as_deref(), chart.options.y_axis.as_deref()]
            .into_iter()
            .flatten()
        {
            lines.push(Line::from(Span::styled(
                format!("axis: {caption}"),
                Style::default().fg(Color::DarkGray),
            )));
        }

        let plain = lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| &*s.content)
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        (Text::from(lines), plain)
    }

    /// The styled lines as SGR-escaped text for colour terminals.
    pub fn render_ansi(&self, chart: &ChartDescriptor) -> String {
        let (text, _) = self.render_styled(chart);
        text.lines
            .iter()
            .map(|line| line.spans.iter().map(ansi_span).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn push_bars(&self, lines: &mut Vec<Line<'static>>, rows: &[Row]) {
        let label_width = rows
            .iter()
            .map(|r| r.label.chars().count().min(MAX_LABEL_CHARS))
            .max()
            .unwrap_or(0);
        let max = rows.iter().map(|r| r.value).fold(0.0, f64::max);
        let bar_width = (self.style.terminal_columns as usize)
            .saturating_sub(label_width + 24)
            .max(8);
        for (i, row) in rows.iter().enumerate() {
            let filled = if max > 0.0 {
                ((row.value.max(0.0) / max) * bar_width as f64).round() as usize
            } else {
                0
            };
            let mut detail = format_amount(&self.style.currency, row.value);
            if let Some(share) = row.share {
                detail.push_str(&format!(" ({:.1}%)", share * 100.0));
            }
            lines.push(Line::from(vec![
                Span::raw(format!(
                    "{:<width$} ",
                    truncate_label(&row.label),
                    width = label_width
                )),
                Span::styled(
                    "█".repeat(filled),
                    Style::default().fg(ROW_COLORS[i % ROW_COLORS.len()]),
                ),
                Span::raw(format!(" {detail}")),
            ]));
        }
    }

    fn push_sparkline(&self, lines: &mut Vec<Line<'static>>, chart: &ChartDescriptor) {
        let (order, _) = series_order(&chart.points);
        let values = order
            .iter()
            .map(|(i, _)| chart.points[*i].value)
            .collect::<Vec<_>>();
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let spark = values
            .iter()
            .map(|v| {
                let level = if hi > lo {
                    (((v - lo) / (hi - lo)) * (SPARK_LEVELS.len() - 1) as f64).round() as usize
                } else {
                    SPARK_LEVELS.len() / 2
                };
                SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
            })
            .collect::<String>();
        lines.push(Line::from(Span::styled(
            spark,
            Style::default().fg(ROW_COLORS[0]),
        )));

        let first = &chart.points[order[0].0];
        let last = &chart.points[order[order.len() - 1].0];
        lines.push(Line::from(Span::raw(format!(
            "{} → {}",
            first.date.as_deref().unwrap_or(&first.label),
            last.date.as_deref().unwrap_or(&last.label)
        ))));
        lines.push(Line::from(Span::raw(format!(
            "min {} · max {}",
            format_amount(&self.style.currency, lo),
            format_amount(&self.style.currency, hi)
        ))));
    }
}

fn ansi_span(span: &Span<'_>) -> String {
    let mut codes = Vec::new();
    if span.style.add_modifier.contains(Modifier::BOLD) {
        codes.push(1u8);
    }
    if let Some(fg) = span.style.fg.and_then(ansi_foreground) {
        codes.push(fg);
    }
    if codes.is_empty() {
        return span.content.to_string();
    }
    let codes = codes.iter().map(u8::to_string).collect::<Vec<_>>().join(";");
    format!("\x1b[{codes}m{}\x1b[0m", span.content)
}

fn ansi_foreground(color: Color) -> Option<u8> {
    match color {
        Color::Red => Some(31),
        Color::Green => Some(32),
        Color::Yellow => Some(33),
        Color::Blue => Some(34),
        Color::Magenta => Some(35),
        Color::Cyan => Some(36),
        Color::DarkGray => Some(90),
        _ => None,
    }
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        return label.to_string();
    }
    let mut out = label
        .chars()
        .take(MAX_LABEL_CHARS.saturating_sub(1))
        .collect::<String>();
    out.push('…');
    out
}

impl ChartRenderer for TerminalRenderer<'_> {
    fn render(&self, chart: &ChartDescriptor) -> VisualOutput {
        let (_, plain) = self.render_styled(chart);
        VisualOutput {
            media_type: MEDIA_TYPE,
            body: plain,
        }
    }
}
