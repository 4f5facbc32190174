use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::parser::ContentParser;
use crate::report::{chart_fingerprint, MessageChart, TranscriptReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "assistant")]
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Accepts either a JSON array of messages or one message per line (JSONL).
pub fn load_transcript(text: &str) -> anyhow::Result<Vec<ChatMessage>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("parse transcript JSON array");
    }
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let msg = serde_json::from_str::<ChatMessage>(line)
            .with_context(|| format!("parse transcript line {}", i + 1))?;
        out.push(msg);
    }
    Ok(out)
}

/// Runs the parser over assistant messages only; user text is never
/// interpreted as chart data.
pub fn scan_transcript(parser: &ContentParser, messages: &[ChatMessage]) -> TranscriptReport {
    let mut assistant = 0;
    let mut found = Vec::new();
    for (i, msg) in messages.iter().enumerate() {
        if msg.role != Role::Ai {
            continue;
        }
        assistant += 1;
        if let Some(chart) = parser.parse(&msg.content).chart {
            found.push(MessageChart {
                message_index: i,
                kind: chart.kind,
                points: chart.points.len(),
                title: chart.title().map(str::to_string),
                fingerprint: chart_fingerprint(&chart),
            });
        }
    }
    tracing::debug!(
        messages = messages.len(),
        assistant,
        charts = found.len(),
        "scanned transcript"
    );
    TranscriptReport::from_results(messages.len(), assistant, found)
}
