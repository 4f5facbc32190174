use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::chart::schema::{ChartDescriptor, ChartKind, DataPoint, RenderOptions};

const KIND_KEYS: [&str; 2] = ["type", "kind"];
const POINTS_KEYS: [&str; 2] = ["data", "points"];
const OPTIONS_KEYS: [&str; 2] = ["options", "renderOptions"];

/// Why a candidate fragment did not become a chart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("fragment is not well-formed JSON: {0}")]
    Malformed(String),
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("payload has no chart kind field")]
    MissingKind,
    #[error("unsupported chart kind {0:?}")]
    UnsupportedKind(String),
    #[error("payload has no data point list")]
    MissingPoints,
    #[error("data point list is empty")]
    EmptyPoints,
    #[error("data point {index} is not an object")]
    PointNotObject { index: usize },
    #[error("data point {index} has no label")]
    MissingLabel { index: usize },
    #[error("data point {index} has a non-numeric value")]
    NonNumericValue { index: usize },
    #[error("data point {index} has a non-finite value")]
    NonFiniteValue { index: usize },
    #[error("data point {index} field {field:?} must be a string")]
    InvalidField { index: usize, field: &'static str },
    #[error("invalid render options: {0}")]
    InvalidOptions(String),
}

/// Parse a normalized fragment and decode it into a descriptor.
pub fn decode_fragment(fragment: &str) -> Result<ChartDescriptor, RejectReason> {
    let value: Value =
        serde_json::from_str(fragment).map_err(|e| RejectReason::Malformed(e.to_string()))?;
    decode_descriptor(&value)
}

/// Decode an arbitrary JSON value into a strict `ChartDescriptor`.
///
/// Any structural mismatch rejects the whole payload; no partially populated
/// descriptor ever leaves this function.
pub fn decode_descriptor(value: &Value) -> Result<ChartDescriptor, RejectReason> {
    let obj = value.as_object().ok_or(RejectReason::NotAnObject)?;

    let kind_raw = first_present(obj, &KIND_KEYS).ok_or(RejectReason::MissingKind)?;
    let kind = match kind_raw {
        Value::String(s) => s
            .parse::<ChartKind>()
            .map_err(|_| RejectReason::UnsupportedKind(s.clone()))?,
        other => return Err(RejectReason::UnsupportedKind(other.to_string())),
    };

    let points_raw = first_present(obj, &POINTS_KEYS)
        .and_then(Value::as_array)
        .ok_or(RejectReason::MissingPoints)?;
    if points_raw.is_empty() {
        return Err(RejectReason::EmptyPoints);
    }
    let points = points_raw
        .iter()
        .enumerate()
        .map(|(index, p)| decode_point(index, p))
        .collect::<Result<Vec<_>, _>>()?;

    let options = match first_present(obj, &OPTIONS_KEYS) {
        None | Some(Value::Null) => RenderOptions::default(),
        Some(raw) => {
            let opts = RenderOptions::deserialize(raw)
                .map_err(|e| RejectReason::InvalidOptions(e.to_string()))?;
            validate_options(&opts)?;
            opts
        }
    };

    Ok(ChartDescriptor {
        kind,
        points,
        options,
    })
}

fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

fn decode_point(index: usize, raw: &Value) -> Result<DataPoint, RejectReason> {
    let obj = raw
        .as_object()
        .ok_or(RejectReason::PointNotObject { index })?;
    let label = obj
        .get("label")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or(RejectReason::MissingLabel { index })?;
    let value = obj
        .get("value")
        .and_then(Value::as_f64)
        .ok_or(RejectReason::NonNumericValue { index })?;
    if !value.is_finite() {
        return Err(RejectReason::NonFiniteValue { index });
    }
    Ok(DataPoint {
        label: label.to_string(),
        value,
        category: optional_string(obj, index, "category")?,
        date: optional_string(obj, index, "date")?,
    })
}

fn optional_string(
    obj: &Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<Option<String>, RejectReason> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(RejectReason::InvalidField { index, field }),
    }
}

fn validate_options(opts: &RenderOptions) -> Result<(), RejectReason> {
    for (name, dim) in [("width", opts.width), ("height", opts.height)] {
        if let Some(v) = dim {
            if !v.is_finite() || v <= 0.0 {
                return Err(RejectReason::InvalidOptions(format!(
                    "{name} must be a positive number"
                )));
            }
        }
    }
    if let Some(m) = &opts.margin {
        if [m.top, m.right, m.bottom, m.left]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(RejectReason::InvalidOptions(
                "margin values must be non-negative numbers".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{decode_descriptor, decode_fragment, RejectReason};
    use crate::chart::ChartKind;

    #[test]
    fn decodes_minimal_pie() {
        let d = decode_descriptor(&json!({
            "type": "pie",
            "data": [{"label": "Rent", "value": 1200}]
        }))
        .expect("valid");
        assert_eq!(d.kind, ChartKind::Pie);
        assert_eq!(d.points.len(), 1);
        assert_eq!(d.points[0].value, 1200.0);
        assert!(d.options.is_empty());
    }

    #[test]
    fn accepts_alias_field_names() {
        let d = decode_descriptor(&json!({
            "kind": "bar",
            "points": [{"label": "a", "value": 1.5}],
            "renderOptions": {"title": "T", "yAxis": "USD"}
        }))
        .expect("valid");
        assert_eq!(d.kind, ChartKind::Bar);
        assert_eq!(d.options.title.as_deref(), Some("T"));
        assert_eq!(d.options.y_axis.as_deref(), Some("USD"));
    }

    #[test]
    fn one_bad_point_rejects_everything() {
        let err = decode_descriptor(&json!({
            "type": "pie",
            "data": [
                {"label": "Rent", "value": 1200},
                {"label": "Food"}
            ]
        }))
        .expect_err("must reject");
        assert_eq!(err, RejectReason::NonNumericValue { index: 1 });
    }

    #[test]
    fn string_values_are_not_numbers() {
        let err = decode_descriptor(&json!({
            "type": "bar",
            "data": [{"label": "Rent", "value": "1200"}]
        }))
        .expect_err("must reject");
        assert_eq!(err, RejectReason::NonNumericValue { index: 0 });
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = decode_descriptor(&json!({
            "type": "radar",
            "data": [{"label": "a", "value": 1}]
        }))
        .expect_err("must reject");
        assert_eq!(err, RejectReason::UnsupportedKind("radar".to_string()));
    }

    #[test]
    fn empty_points_and_blank_labels_are_rejected() {
        assert_eq!(
            decode_descriptor(&json!({"type": "line", "data": []})),
            Err(RejectReason::EmptyPoints)
        );
        assert_eq!(
            decode_descriptor(&json!({"type": "line", "data": [{"label": "  ", "value": 1}]})),
            Err(RejectReason::MissingLabel { index: 0 })
        );
    }

    #[test]
    fn bad_options_reject_the_payload() {
        let err = decode_descriptor(&json!({
            "type": "bar",
            "data": [{"label": "a", "value": 1}],
            "options": {"height": "tall"}
        }))
        .expect_err("must reject");
        assert!(matches!(err, RejectReason::InvalidOptions(_)));

        let err = decode_descriptor(&json!({
            "type": "bar",
            "data": [{"label": "a", "value": 1}],
            "options": {"width": 0}
        }))
        .expect_err("must reject");
        assert!(matches!(err, RejectReason::InvalidOptions(_)));
    }

    #[test]
    fn non_string_category_is_rejected() {
        let err = decode_descriptor(&json!({
            "type": "pie",
            "data": [{"label": "a", "value": 1, "category": 7}]
        }))
        .expect_err("must reject");
        assert_eq!(
            err,
            RejectReason::InvalidField {
                index: 0,
                field: "category"
            }
        );
    }

    #[test]
    fn malformed_text_reports_syntax_error() {
        assert!(matches!(
            decode_fragment("{\"type\": pie}"),
            Err(RejectReason::Malformed(_))
        ));
    }
}
