use std::fmt::Write as _;

use crate::chart::{ChartDescriptor, ChartKind};
use crate::render::geometry::{
    arc_centroid, arc_path, fmt, format_amount, pie_layout, series_order, BandScale, Frame,
    LinearScale,
};
use crate::render::{ChartRenderer, RenderStyle, VisualOutput};

const MEDIA_TYPE: &str = "image/svg+xml";
const DONUT_INNER_RATIO: f64 = 0.6;
const LABEL_RADIUS_RATIO: f64 = 1.1;
const PAD_ANGLE: f64 = 0.02;
const BAR_PADDING: f64 = 0.2;
const BAR_HEADROOM: f64 = 1.1;
const Y_TICKS: usize = 5;

/// Standalone SVG documents, one drawing routine per chart kind.
#[derive(Debug, Clone)]
pub struct SvgRenderer<'a> {
    style: &'a RenderStyle,
}

impl<'a> SvgRenderer<'a> {
    pub fn new(style: &'a RenderStyle) -> Self {
        Self { style }
    }

    fn color<'c>(palette: &'c [String], i: usize) -> &'c str {
        palette
            .get(i % palette.len().max(1))
            .map(String::as_str)
            .unwrap_or("currentColor")
    }

    fn open_document(&self, out: &mut String, chart: &ChartDescriptor, frame: &Frame) {
        let _ = writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\" font-family=\"sans-serif\" data-kind=\"{kind}\">",
            w = fmt(frame.width),
            h = fmt(frame.height),
            kind = chart.kind
        );
        out.push_str(
            "<defs><filter id=\"shadow\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"140%\"><feDropShadow dx=\"2\" dy=\"2\" stdDeviation=\"3\" flood-opacity=\"0.2\"/></filter>",
        );
        let top = Self::color(self.style.palette_for(chart), 0);
        let _ = writeln!(
            out,
            "<linearGradient id=\"area-gradient\" x1=\"0%\" y1=\"0%\" x2=\"0%\" y2=\"100%\"><stop offset=\"0%\" stop-color=\"{}\" stop-opacity=\"0.4\"/><stop offset=\"100%\" stop-color=\"{}\" stop-opacity=\"0.05\"/></linearGradient></defs>",
            xml_escape(top),
            xml_escape(top)
        );
        if let Some(title) = chart.title() {
            let _ = writeln!(
                out,
                "<text class=\"title\" x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"16\" font-weight=\"bold\" fill=\"currentColor\">{}</text>",
                fmt(frame.width / 2.0),
                fmt(frame.margin.top / 2.0),
                xml_escape(title)
            );
        }
    }

    fn pie(&self, out: &mut String, chart: &ChartDescriptor, frame: &Frame, donut: bool) {
        let palette = self.style.palette_for(chart);
        let radius = frame.inner_width().min(frame.inner_height()) / 2.0;
        let inner = if donut { radius * DONUT_INNER_RATIO } else { 0.0 };
        let label_radius = radius * LABEL_RADIUS_RATIO;
        let _ = writeln!(
            out,
            "<g transform=\"translate({},{})\">",
            fmt(frame.margin.left + frame.inner_width() / 2.0),
            fmt(frame.margin.top + frame.inner_height() / 2.0)
        );
        for (i, slice) in pie_layout(&chart.points).iter().enumerate() {
            let point = &chart.points[slice.index];
            let _ = writeln!(
                out,
                "<g class=\"arc\"><path d=\"{}\" fill=\"{}\" stroke=\"white\" stroke-width=\"2\" opacity=\"0.9\" filter=\"url(#shadow)\"><title>{}</title></path>",
                arc_path(inner, radius, slice.start_angle, slice.end_angle, PAD_ANGLE),
                xml_escape(Self::color(palette, i)),
                xml_escape(&point.label)
            );
            let (cx, cy) = arc_centroid(inner, radius, slice.start_angle, slice.end_angle);
            let _ = writeln!(
                out,
                "<text class=\"percent\" x=\"{}\" y=\"{}\" dy=\"0.35em\" text-anchor=\"middle\" fill=\"white\" font-size=\"12\">{:.1}%</text>",
                fmt(cx),
                fmt(cy),
                slice.fraction * 100.0
            );
            let (lx, ly) = arc_centroid(
                label_radius,
                label_radius,
                slice.start_angle,
                slice.end_angle,
            );
            let anchor = if lx > 0.0 { "start" } else { "end" };
            let _ = writeln!(
                out,
                "<text class=\"label\" x=\"{}\" y=\"{}\" dy=\"0.35em\" text-anchor=\"{}\" fill=\"currentColor\" font-size=\"12\">{} ({})</text></g>",
                fmt(lx),
                fmt(ly),
                anchor,
                xml_escape(&point.label),
                xml_escape(&format_amount(&self.style.currency, point.value))
            );
        }
        out.push_str("</g>\n");
    }

    fn bar(&self, out: &mut String, chart: &ChartDescriptor, frame: &Frame) {
        let palette = self.style.palette_for(chart);
        let (w, h) = (frame.inner_width(), frame.inner_height());
        let x = BandScale {
            count: chart.points.len(),
            range: (0.0, w),
            padding: BAR_PADDING,
        };
        let top_value = (chart.max_value() * BAR_HEADROOM).max(0.0);
        let y = LinearScale::new((0.0, top_value), (h, 0.0));
        self.open_plot(out, frame);
        self.y_axis(out, &y, w);
        for (i, point) in chart.points.iter().enumerate() {
            let top = y.map(point.value.max(0.0));
            let _ = writeln!(
                out,
                "<rect class=\"bar\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"4\" fill=\"{}\" opacity=\"0.9\" filter=\"url(#shadow)\"><title>{}</title></rect>",
                fmt(x.start(i)),
                fmt(top),
                fmt(x.bandwidth()),
                fmt((h - top).max(0.0)),
                xml_escape(Self::color(palette, i)),
                xml_escape(&point.label)
            );
            let cx = x.start(i) + x.bandwidth() / 2.0;
            let _ = writeln!(
                out,
                "<text class=\"value-label\" x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"currentColor\" font-size=\"12\">{}</text>",
                fmt(cx),
                fmt(top - 5.0),
                xml_escape(&format_amount(&self.style.currency, point.value))
            );
            let _ = writeln!(
                out,
                "<text class=\"tick-x\" transform=\"translate({},{}) rotate(-45)\" text-anchor=\"end\" fill=\"currentColor\" font-size=\"11\">{}</text>",
                fmt(cx),
                fmt(h + 12.0),
                xml_escape(&point.label)
            );
        }
        self.axis_captions(out, chart, frame);
        out.push_str("</g>\n");
    }

    fn series(&self, out: &mut String, chart: &ChartDescriptor, frame: &Frame, fill_area: bool) {
        let palette = self.style.palette_for(chart);
        let stroke = xml_escape(Self::color(palette, 0));
        let (w, h) = (frame.inner_width(), frame.inner_height());
        let (order, temporal) = series_order(&chart.points);
        let keys = order.iter().map(|(_, k)| *k);
        let lo = keys.clone().fold(f64::INFINITY, f64::min);
        let hi = keys.fold(f64::NEG_INFINITY, f64::max);
        let x = LinearScale::new((lo, hi), (0.0, w));
        let y = LinearScale::new((0.0, chart.max_value().max(0.0)), (h, 0.0));
        let coords = order
            .iter()
            .map(|(i, k)| (*i, x.map(*k), y.map(chart.points[*i].value)))
            .collect::<Vec<_>>();

        self.open_plot(out, frame);
        self.y_axis(out, &y, w);
        let line = coords
            .iter()
            .enumerate()
            .map(|(n, (_, px, py))| {
                let cmd = if n == 0 { 'M' } else { 'L' };
                format!("{cmd}{},{}", fmt(*px), fmt(*py))
            })
            .collect::<String>();
        if fill_area {
            if let (Some(first), Some(last)) = (coords.first(), coords.last()) {
                let _ = writeln!(
                    out,
                    "<path class=\"area\" d=\"{}L{},{}L{},{}Z\" fill=\"url(#area-gradient)\"/>",
                    line,
                    fmt(last.1),
                    fmt(h),
                    fmt(first.1),
                    fmt(h)
                );
            }
        }
        let _ = writeln!(
            out,
            "<path class=\"line\" d=\"{line}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"2\"/>"
        );
        for (i, px, py) in &coords {
            let point = &chart.points[*i];
            let tick = match point.date.as_deref() {
                Some(date) if temporal => date,
                _ => point.label.as_str(),
            };
            let _ = writeln!(
                out,
                "<circle class=\"dot\" cx=\"{}\" cy=\"{}\" r=\"4\" fill=\"white\" stroke=\"{}\" stroke-width=\"2\"><title>{}: {}</title></circle>",
                fmt(*px),
                fmt(*py),
                stroke,
                xml_escape(&point.label),
                xml_escape(&format_amount(&self.style.currency, point.value))
            );
            let _ = writeln!(
                out,
                "<text class=\"tick-x\" x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"currentColor\" font-size=\"11\">{}</text>",
                fmt(*px),
                fmt(h + 16.0),
                xml_escape(tick)
            );
        }
        self.axis_captions(out, chart, frame);
        out.push_str("</g>\n");
    }

    fn scatter(&self, out: &mut String, chart: &ChartDescriptor, frame: &Frame) {
        let palette = self.style.palette_for(chart);
        let (w, h) = (frame.inner_width(), frame.inner_height());
        let max = chart.max_value().max(0.0);
        let x = LinearScale::new((0.0, max), (0.0, w));
        let y = LinearScale::new((0.0, max), (h, 0.0));
        self.open_plot(out, frame);
        self.y_axis(out, &y, w);
        for tick in x.ticks(Y_TICKS) {
            let _ = writeln!(
                out,
                "<text class=\"tick-x\" x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"currentColor\" font-size=\"11\">{}</text>",
                fmt(x.map(tick)),
                fmt(h + 16.0),
                fmt(tick)
            );
        }
        for (i, point) in chart.points.iter().enumerate() {
            let _ = writeln!(
                out,
                "<circle class=\"dot\" cx=\"{}\" cy=\"{}\" r=\"5\" fill=\"{}\"><title>{}</title></circle>",
                fmt(x.map(point.value)),
                fmt(y.map(point.value)),
                xml_escape(Self::color(palette, i)),
                xml_escape(&point.label)
            );
        }
        self.axis_captions(out, chart, frame);
        out.push_str("</g>\n");
    }

    fn open_plot(&self, out: &mut String, frame: &Frame) {
        let _ = writeln!(
            out,
            "<g transform=\"translate({},{})\">",
            fmt(frame.margin.left),
            fmt(frame.margin.top)
        );
    }

    fn y_axis(&self, out: &mut String, y: &LinearScale, width: f64) {
        for tick in y.ticks(Y_TICKS) {
            let py = y.map(tick);
            let _ = writeln!(
                out,
                "<line class=\"grid\" x1=\"0\" x2=\"{}\" y1=\"{}\" y2=\"{}\" stroke=\"currentColor\" stroke-opacity=\"0.2\" stroke-dasharray=\"3,3\"/><text class=\"tick-y\" x=\"-8\" y=\"{}\" dy=\"0.32em\" text-anchor=\"end\" fill=\"currentColor\" font-size=\"11\">{}{}</text>",
                fmt(width),
                fmt(py),
                fmt(py),
                fmt(py),
                xml_escape(&self.style.currency),
                fmt(tick)
            );
        }
    }

    fn axis_captions(&self, out: &mut String, chart: &ChartDescriptor, frame: &Frame) {
        let (w, h) = (frame.inner_width(), frame.inner_height());
        if let Some(caption) = chart.options.x_axis.as_deref() {
            let _ = writeln!(
                out,
                "<text class=\"axis-caption\" x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"currentColor\">{}</text>",
                fmt(w / 2.0),
                fmt(h + frame.margin.bottom - 5.0),
                xml_escape(caption)
            );
        }
        if let Some(caption) = chart.options.y_axis.as_deref() {
            let _ = writeln!(
                out,
                "<text class=\"axis-caption\" transform=\"rotate(-90)\" x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"currentColor\">{}</text>",
                fmt(-h / 2.0),
                fmt(-frame.margin.left + 15.0),
                xml_escape(caption)
            );
        }
    }
}

impl ChartRenderer for SvgRenderer<'_> {
    fn render(&self, chart: &ChartDescriptor) -> VisualOutput {
        let frame = self.style.frame_for(chart);
        let mut out = String::new();
        self.open_document(&mut out, chart, &frame);
        match chart.kind {
            ChartKind::Pie => self.pie(&mut out, chart, &frame, false),
            ChartKind::Donut => self.pie(&mut out, chart, &frame, true),
            ChartKind::Bar => self.bar(&mut out, chart, &frame),
            ChartKind::Line => self.series(&mut out, chart, &frame, false),
            ChartKind::Area => self.series(&mut out, chart, &frame, true),
            ChartKind::Scatter => self.scatter(&mut out, chart, &frame),
        }
        out.push_str("</svg>\n");
        VisualOutput {
            media_type: MEDIA_TYPE,
            body: out,
        }
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
