pub mod filler;
pub mod matchers;
pub mod normalize;

use std::ops::Range;

use serde::Serialize;

use crate::chart::{decode_fragment, ChartDescriptor, ChartKind, RejectReason};
use crate::parser::filler::apply_filler_policy;
use crate::parser::matchers::{default_matchers, FragmentMatcher};
use crate::parser::normalize::{normalize_fragment, unescape_quotes};

pub use filler::FillerPolicy;
pub use matchers::Fragment;

/// Prose and the optional chart extracted from one assistant message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    pub prose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartDescriptor>,
}

impl ParseResult {
    fn prose_only(text: &str) -> Self {
        Self {
            prose: text.trim().to_string(),
            chart: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
    pub filler: FillerPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseAttempt {
    pub matcher: &'static str,
    pub span: Range<usize>,
    pub outcome: Result<ChartKind, RejectReason>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseTrace {
    pub attempts: Vec<ParseAttempt>,
}

impl ParseTrace {
    pub fn accepted(&self) -> Option<&ParseAttempt> {
        self.attempts.iter().find(|a| a.outcome.is_ok())
    }
}

/// Separates assistant prose from an embedded chart payload.
///
/// Matchers run from most to least specific; the first candidate that decodes
/// into a valid `ChartDescriptor` wins. Nothing here fails: a miss returns the
/// trimmed input as prose.
#[derive(Debug)]
pub struct ContentParser {
    matchers: Vec<Box<dyn FragmentMatcher>>,
    options: ParserOptions,
}

impl Default for ContentParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

impl ContentParser {
    pub fn new(options: ParserOptions) -> Self {
        Self::with_matchers(default_matchers(), options)
    }

    pub fn with_matchers(matchers: Vec<Box<dyn FragmentMatcher>>, options: ParserOptions) -> Self {
        Self { matchers, options }
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    pub fn parse(&self, text: &str) -> ParseResult {
        self.parse_traced(text).0
    }

    pub fn parse_traced(&self, text: &str) -> (ParseResult, ParseTrace) {
        let mut trace = ParseTrace::default();
        let Some((span, chart)) = self.first_chart(text, Some(&mut trace)) else {
            tracing::debug!(
                attempts = trace.attempts.len(),
                "no chart payload accepted; returning prose only"
            );
            return (ParseResult::prose_only(text), trace);
        };
        tracing::debug!(
            kind = %chart.kind,
            points = chart.points.len(),
            start = span.start,
            end = span.end,
            "accepted chart payload"
        );

        let mut prose = remove_span(text, span);
        // Further valid payloads are removed too so the prose never re-parses
        // into a chart.
        while let Some((extra, _)) = self.first_chart(&prose, None) {
            prose = remove_span(&prose, extra);
        }
        let prose = apply_filler_policy(&prose, self.options.filler);
        (
            ParseResult {
                prose,
                chart: Some(chart),
            },
            trace,
        )
    }

    fn first_chart(
        &self,
        text: &str,
        mut trace: Option<&mut ParseTrace>,
    ) -> Option<(Range<usize>, ChartDescriptor)> {
        for matcher in &self.matchers {
            for fragment in matcher.candidates(text) {
                let outcome = decode_candidate(fragment.body);
                if let Some(t) = trace.as_deref_mut() {
                    t.attempts.push(ParseAttempt {
                        matcher: matcher.name(),
                        span: fragment.span.clone(),
                        outcome: outcome.as_ref().map(|c| c.kind).map_err(Clone::clone),
                    });
                }
                match outcome {
                    Ok(chart) => return Some((fragment.span, chart)),
                    Err(reason) => tracing::debug!(
                        matcher = matcher.name(),
                        %reason,
                        "rejected chart candidate"
                    ),
                }
            }
        }
        None
    }
}

fn decode_candidate(body: &str) -> Result<ChartDescriptor, RejectReason> {
    decode_fragment(&normalize_fragment(body)).or_else(|first| match unescape_quotes(body) {
        Some(unescaped) => decode_fragment(&normalize_fragment(&unescaped)).map_err(|_| first),
        None => Err(first),
    })
}

fn remove_span(text: &str, span: Range<usize>) -> String {
    let mut joined = String::with_capacity(text.len());
    joined.push_str(&text[..span.start]);
    joined.push_str(&text[span.end..]);
    joined
}

/// Parse with default options.
pub fn parse_message_content(text: &str) -> ParseResult {
    ContentParser::default().parse(text)
}
