use std::f64::consts::{PI, TAU};

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::chart::{DataPoint, Margin};

/// Outer size, margin and plot area of one chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Frame {
    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(1.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if (d1 - d0).abs() < f64::EPSILON {
            return (r0 + r1) / 2.0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Round tick values (1, 2 or 5 times a power of ten) covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        let span = hi - lo;
        if span <= 0.0 || !span.is_finite() || count == 0 {
            return vec![lo];
        }
        let raw_step = span / count as f64;
        let magnitude = 10f64.powf(raw_step.log10().floor());
        let step = [1.0, 2.0, 5.0, 10.0]
            .into_iter()
            .map(|m| m * magnitude)
            .find(|s| *s >= raw_step)
            .unwrap_or(10.0 * magnitude);
        // Subnormal spans underflow the step to zero.
        if !step.is_finite() || step <= 0.0 {
            return vec![lo];
        }
        let first = (lo / step).ceil();
        let last = (hi / step).floor();
        if !first.is_finite() || !last.is_finite() || last < first {
            return vec![lo];
        }
        let n = ((last - first) as usize).min(count.saturating_mul(2) + 1);
        (0..=n).map(|i| (first + i as f64) * step).collect()
    }
}

/// Evenly spaced bands with equal inner and outer padding, centred in range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    pub count: usize,
    pub range: (f64, f64),
    pub padding: f64,
}

impl BandScale {
    fn step(&self) -> f64 {
        let n = self.count as f64;
        (self.range.1 - self.range.0) / (n - self.padding + 2.0 * self.padding).max(1.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    pub fn start(&self, index: usize) -> f64 {
        let n = self.count as f64;
        let step = self.step();
        let offset = (self.range.1 - self.range.0 - step * (n - self.padding)) / 2.0;
        self.range.0 + offset + step * index as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    /// Position of the point in extraction order.
    pub index: usize,
    pub start_angle: f64,
    pub end_angle: f64,
    pub fraction: f64,
}

/// Slices ordered by descending value, angles clockwise from twelve o'clock.
/// Negative values count as zero.
pub fn pie_layout(points: &[DataPoint]) -> Vec<PieSlice> {
    let mut order = (0..points.len()).collect::<Vec<_>>();
    order.sort_by(|a, b| points[*b].value.total_cmp(&points[*a].value));
    let total: f64 = points.iter().map(|p| p.value.max(0.0)).sum();
    let mut angle = 0.0;
    order
        .into_iter()
        .map(|index| {
            let fraction = if total > 0.0 {
                points[index].value.max(0.0) / total
            } else {
                0.0
            };
            let start_angle = angle;
            angle += fraction * TAU;
            PieSlice {
                index,
                start_angle,
                end_angle: angle,
                fraction,
            }
        })
        .collect()
}

pub fn polar(radius: f64, angle: f64) -> (f64, f64) {
    (radius * angle.sin(), -radius * angle.cos())
}

pub fn arc_centroid(inner: f64, outer: f64, start: f64, end: f64) -> (f64, f64) {
    polar((inner + outer) / 2.0, (start + end) / 2.0)
}

/// SVG path data for an annular sector centred on the origin.
pub fn arc_path(inner: f64, outer: f64, start: f64, end: f64, pad: f64) -> String {
    let sweep = end - start;
    if sweep <= 0.0 {
        return String::new();
    }
    if sweep >= TAU - 1e-9 {
        return full_ring_path(inner, outer);
    }
    let half_pad = (pad / 2.0).min(sweep / 4.0);
    let (s, e) = (start + half_pad, end - half_pad);
    let large = if e - s > PI { 1 } else { 0 };
    let (x0, y0) = polar(outer, s);
    let (x1, y1) = polar(outer, e);
    let mut d = format!(
        "M{},{}A{},{},0,{},1,{},{}",
        fmt(x0),
        fmt(y0),
        fmt(outer),
        fmt(outer),
        large,
        fmt(x1),
        fmt(y1)
    );
    if inner > 0.0 {
        let (x2, y2) = polar(inner, e);
        let (x3, y3) = polar(inner, s);
        d.push_str(&format!(
            "L{},{}A{},{},0,{},0,{},{}Z",
            fmt(x2),
            fmt(y2),
            fmt(inner),
            fmt(inner),
            large,
            fmt(x3),
            fmt(y3)
        ));
    } else {
        d.push_str("L0,0Z");
    }
    d
}

fn full_ring_path(inner: f64, outer: f64) -> String {
    let mut d = format!(
        "M0,{}A{},{},0,1,1,0,{}A{},{},0,1,1,0,{}Z",
        fmt(-outer),
        fmt(outer),
        fmt(outer),
        fmt(outer),
        fmt(outer),
        fmt(outer),
        fmt(-outer)
    );
    if inner > 0.0 {
        d.push_str(&format!(
            "M0,{}A{},{},0,1,0,0,{}A{},{},0,1,0,0,{}Z",
            fmt(-inner),
            fmt(inner),
            fmt(inner),
            fmt(inner),
            fmt(inner),
            fmt(inner),
            fmt(-inner)
        ));
    }
    d
}

/// Compact coordinate formatting for SVG output.
pub fn fmt(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let s = format!("{rounded:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn parse_point_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    let day = format_description!("[year]-[month]-[day]");
    raw.get(..10)
        .and_then(|prefix| Date::parse(prefix, &day).ok())
        .or_else(|| OffsetDateTime::parse(raw, &Rfc3339).ok().map(|dt| dt.date()))
}

/// X positions for series charts.
///
/// When every point carries a parseable date the points are placed on a time
/// axis and visited in date order; otherwise they keep extraction order on an
/// index axis. Returns `(point index, x key)` pairs in drawing order.
pub fn series_order(points: &[DataPoint]) -> (Vec<(usize, f64)>, bool) {
    let dates = points
        .iter()
        .map(|p| p.date.as_deref().and_then(parse_point_date))
        .collect::<Option<Vec<_>>>();
    match dates {
        Some(dates) => {
            let mut keyed = dates
                .iter()
                .enumerate()
                .map(|(i, d)| (i, d.to_julian_day() as f64))
                .collect::<Vec<_>>();
            keyed.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            (keyed, true)
        }
        None => (
            (0..points.len()).map(|i| (i, i as f64)).collect(),
            false,
        ),
    }
}

pub fn format_amount(currency: &str, v: f64) -> String {
    let negative = v < 0.0;
    let fixed = format!("{:.2}", v.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if negative { "-" } else { "" };
    format!("{sign}{currency}{grouped}.{frac}")
}
