use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::chart::{ChartDescriptor, ChartKind};
use crate::parser::{FillerPolicy, ParseResult, ParseTrace};

pub const PARSE_REPORT_SCHEMA_VERSION: &str = "replychart.parse.v1";
pub const TRANSCRIPT_REPORT_SCHEMA_VERSION: &str = "replychart.transcript.v1";

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Hash of the descriptor's canonical JSON. Two replies carrying the same
/// chart fingerprint identically regardless of formatting or fencing.
pub fn chart_fingerprint(chart: &ChartDescriptor) -> String {
    let canonical = serde_json::to_string(chart).unwrap_or_default();
    sha256_hex(canonical.as_bytes())
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub matcher: String,
    pub start: usize,
    pub end: usize,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChartKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    pub schema_version: String,
    pub filler: FillerPolicy,
    pub prose: String,
    pub chart: Option<ChartDescriptor>,
    pub chart_fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<Vec<AttemptRecord>>,
}

impl ParseReport {
    pub fn from_result(result: ParseResult, filler: FillerPolicy, trace: Option<&ParseTrace>) -> Self {
        let attempts = trace.map(|t| {
            t.attempts
                .iter()
                .map(|a| AttemptRecord {
                    matcher: a.matcher.to_string(),
                    start: a.span.start,
                    end: a.span.end,
                    accepted: a.outcome.is_ok(),
                    kind: a.outcome.as_ref().ok().copied(),
                    reason: a.outcome.as_ref().err().map(|r| r.to_string()),
                })
                .collect()
        });
        Self {
            schema_version: PARSE_REPORT_SCHEMA_VERSION.to_string(),
            filler,
            chart_fingerprint: result.chart.as_ref().map(chart_fingerprint),
            prose: result.prose,
            chart: result.chart,
            attempts,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageChart {
    /// Position of the message in the transcript.
    pub message_index: usize,
    pub kind: ChartKind,
    pub points: usize,
    pub title: Option<String>,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptReport {
    pub schema_version: String,
    pub messages: usize,
    pub assistant_messages: usize,
    pub charts: usize,
    pub by_kind: BTreeMap<String, usize>,
    pub found: Vec<MessageChart>,
}

impl TranscriptReport {
    pub fn from_results(messages: usize, assistant_messages: usize, found: Vec<MessageChart>) -> Self {
        let mut by_kind = BTreeMap::new();
        for c in &found {
            *by_kind.entry(c.kind.as_str().to_string()).or_insert(0) += 1;
        }
        Self {
            schema_version: TRANSCRIPT_REPORT_SCHEMA_VERSION.to_string(),
            messages,
            assistant_messages,
            charts: found.len(),
            by_kind,
            found,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = format!(
            "messages: {}  assistant: {}  charts: {}\n",
            self.messages, self.assistant_messages, self.charts
        );
        for (kind, n) in &self.by_kind {
            out.push_str(&format!("  {kind}: {n}\n"));
        }
        for c in &self.found {
            out.push_str(&format!(
                "#{} {} ({} points){}\n",
                c.message_index,
                c.kind,
                c.points,
                c.title
                    .as_deref()
                    .map(|t| format!(" \"{t}\""))
                    .unwrap_or_default()
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{chart_fingerprint, sha256_hex, MessageChart, ParseReport, TranscriptReport};
    use crate::chart::ChartKind;
    use crate::parser::{parse_message_content, ContentParser, FillerPolicy};

    #[test]
    fn sha256_hex_is_lowercase_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn fingerprint_ignores_payload_formatting() {
        let a = parse_message_content("{\"type\":\"bar\",\"data\":[{\"label\":\"a\",\"value\":1}]}");
        let b = parse_message_content(
            "```json\n{\n  \"type\": \"bar\",\n  \"data\": [ {\"label\": \"a\", \"value\": 1.0}, ]\n}\n```",
        );
        let (a, b) = (a.chart.expect("a"), b.chart.expect("b"));
        assert_eq!(chart_fingerprint(&a), chart_fingerprint(&b));
    }

    #[test]
    fn parse_report_carries_trace_when_requested() {
        let text = "{\"type\":\"pie\",\"data\":[]} {\"type\":\"bar\",\"data\":[{\"label\":\"a\",\"value\":2}]}";
        let (result, trace) = ContentParser::default().parse_traced(text);
        let report = ParseReport::from_result(result, FillerPolicy::FragmentOnly, Some(&trace));
        assert_eq!(report.schema_version, "replychart.parse.v1");
        assert!(report.chart_fingerprint.is_some());
        let attempts = report.attempts.expect("attempts");
        assert!(!attempts[0].accepted);
        assert!(attempts[0].reason.is_some());
        assert!(attempts.iter().any(|a| a.accepted && a.kind == Some(ChartKind::Bar)));

        let json = serde_json::to_value(
            ParseReport::from_result(parse_message_content("plain"), FillerPolicy::FragmentOnly, None),
        )
        .expect("json");
        assert!(json.get("attempts").is_none());
        assert!(json["chart"].is_null());
        assert_eq!(json["filler"], "fragment-only");
    }

    #[test]
    fn transcript_report_counts_per_kind() {
        let found = vec![
            MessageChart {
                message_index: 1,
                kind: ChartKind::Pie,
                points: 3,
                title: Some("Spend".to_string()),
                fingerprint: "x".to_string(),
            },
            MessageChart {
                message_index: 3,
                kind: ChartKind::Pie,
                points: 2,
                title: None,
                fingerprint: "y".to_string(),
            },
        ];
        let report = TranscriptReport::from_results(4, 2, found);
        assert_eq!(report.charts, 2);
        assert_eq!(report.by_kind.get("pie"), Some(&2));
        let text = report.render_text();
        assert!(text.starts_with("messages: 4  assistant: 2  charts: 2"));
        assert!(text.contains("#1 pie (3 points) \"Spend\""));
    }
}
