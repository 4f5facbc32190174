use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of chart kinds an assistant reply may describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Donut,
    Bar,
    Line,
    Area,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Pie,
        ChartKind::Donut,
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Area,
        ChartKind::Scatter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pie => "pie",
            Self::Donut => "donut",
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Area => "area",
            Self::Scatter => "scatter",
        }
    }

    /// Kinds whose x axis is meaningfully ordered by `DataPoint::date`.
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::Line | Self::Area | Self::Scatter)
    }

    pub fn is_radial(self) -> bool {
        matches!(self, Self::Pie | Self::Donut)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unsupported chart kind: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            category: None,
            date: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Optional rendering hints. Absent fields fall back to renderer defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
}

impl RenderOptions {
    pub fn is_empty(&self) -> bool {
        *self == RenderOptions::default()
    }
}

/// A fully validated chart payload.
///
/// Only `decode_descriptor` produces these from untrusted input; every point
/// has a non-empty label and a finite value and `points` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescriptor {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    #[serde(rename = "data")]
    pub points: Vec<DataPoint>,
    #[serde(default, skip_serializing_if = "RenderOptions::is_empty")]
    pub options: RenderOptions,
}

impl ChartDescriptor {
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    pub fn max_value(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.value)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn title(&self) -> Option<&str> {
        self.options
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartDescriptor, ChartKind, DataPoint, RenderOptions};

    #[test]
    fn kind_round_trips_through_from_str() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.as_str().parse::<ChartKind>(), Ok(kind));
        }
        assert!("radar".parse::<ChartKind>().is_err());
        assert!("Pie".parse::<ChartKind>().is_err());
    }

    #[test]
    fn descriptor_serializes_with_wire_field_names() {
        let d = ChartDescriptor {
            kind: ChartKind::Pie,
            points: vec![DataPoint::new("Rent", 1200.0)],
            options: RenderOptions::default(),
        };
        let v = serde_json::to_value(&d).expect("serialize");
        assert_eq!(v["type"], "pie");
        assert_eq!(v["data"][0]["label"], "Rent");
        assert!(v.get("options").is_none());
    }

    #[test]
    fn options_use_camel_case_axis_names() {
        let opts = RenderOptions {
            x_axis: Some("Month".to_string()),
            ..RenderOptions::default()
        };
        let v = serde_json::to_value(&opts).expect("serialize");
        assert_eq!(v["xAxis"], "Month");
    }

    #[test]
    fn blank_title_is_treated_as_absent() {
        let d = ChartDescriptor {
            kind: ChartKind::Bar,
            points: vec![DataPoint::new("a", 1.0)],
            options: RenderOptions {
                title: Some("   ".to_string()),
                ..RenderOptions::default()
            },
        };
        assert_eq!(d.title(), None);
    }
}
