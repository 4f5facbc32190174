use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

const STRUCTURED_FENCE_TAGS: [&str; 4] = ["json", "jsonc", "json5", "chart"];
const MAX_KIND_CANDIDATES: usize = 64;

static FENCE_REGEX: OnceLock<Regex> = OnceLock::new();
static KIND_FIELD_REGEX: OnceLock<Regex> = OnceLock::new();

fn fence_regex() -> &'static Regex {
    FENCE_REGEX.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*([A-Za-z0-9_+\-]*)[ \t]*\r?\n?(.*?)```")
            .expect("Failed to compile fence regex")
    })
}

fn kind_field_regex() -> &'static Regex {
    KIND_FIELD_REGEX.get_or_init(|| {
        Regex::new(
            r#"\\?"(?:type|kind)\\?"\s*:\s*\\?"(?:pie|donut|bar|line|area|scatter)\\?""#,
        )
        .expect("Failed to compile chart kind regex")
    })
}

/// A region of the input believed to carry a chart payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment<'a> {
    /// Bytes removed from the prose when this fragment is accepted.
    pub span: Range<usize>,
    /// Text handed to the decoder.
    pub body: &'a str,
}

/// One extraction strategy. Matchers only locate candidates; decoding and
/// validation happen in the parser.
pub trait FragmentMatcher: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Candidates in the order they should be tried.
    fn candidates<'a>(&self, text: &'a str) -> Vec<Fragment<'a>>;
}

/// Fenced code blocks whose info string marks structured data.
#[derive(Debug, Clone, Copy, Default)]
pub struct FencedBlockMatcher;

impl FragmentMatcher for FencedBlockMatcher {
    fn name(&self) -> &'static str {
        "fenced_block"
    }

    fn candidates<'a>(&self, text: &'a str) -> Vec<Fragment<'a>> {
        fence_regex()
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let tag = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                if !STRUCTURED_FENCE_TAGS
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(tag))
                {
                    return None;
                }
                Some(Fragment {
                    span: whole.range(),
                    body: caps.get(2)?.as_str(),
                })
            })
            .collect()
    }
}

/// Balanced `{ ... }` objects that carry a recognised chart kind field.
#[derive(Debug, Clone, Copy, Default)]
pub struct KindFieldMatcher;

impl FragmentMatcher for KindFieldMatcher {
    fn name(&self) -> &'static str {
        "kind_field"
    }

    fn candidates<'a>(&self, text: &'a str) -> Vec<Fragment<'a>> {
        // A kind field never spans a brace, so each hit lies wholly inside or
        // outside any object. Hits are sorted and disjoint.
        let hits = kind_field_regex()
            .find_iter(text)
            .map(|m| m.range())
            .collect::<Vec<_>>();
        if hits.is_empty() {
            return Vec::new();
        }
        balanced_objects(text)
            .into_iter()
            .filter(|span| {
                let first = hits.partition_point(|h| h.start < span.start);
                hits.get(first).is_some_and(|h| h.end <= span.end)
            })
            .take(MAX_KIND_CANDIDATES)
            .map(|span| Fragment {
                body: &text[span.clone()],
                span,
            })
            .collect()
    }
}

/// Everything from the first `{` to the last `}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidestBracesMatcher;

impl FragmentMatcher for WidestBracesMatcher {
    fn name(&self) -> &'static str {
        "widest_braces"
    }

    fn candidates<'a>(&self, text: &'a str) -> Vec<Fragment<'a>> {
        let (Some(start), Some(last)) = (text.find('{'), text.rfind('}')) else {
            return Vec::new();
        };
        if last <= start {
            return Vec::new();
        }
        let span = start..last + 1;
        vec![Fragment {
            body: &text[span.clone()],
            span,
        }]
    }
}

/// Matchers from most to least specific.
pub fn default_matchers() -> Vec<Box<dyn FragmentMatcher>> {
    vec![
        Box::new(FencedBlockMatcher),
        Box::new(KindFieldMatcher),
        Box::new(WidestBracesMatcher),
    ]
}

/// Spans of every balanced object, nested ones included, ordered by their
/// opening brace. One pass over the text with a stack of open braces.
///
/// Quotes only open strings inside an object, so apostrophes and quoted words
/// in the surrounding prose do not hide a payload. A `\"` outside a string is
/// skipped so double-escaped payloads still balance.
pub(crate) fn balanced_objects(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut open = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match b {
            b'\\' if bytes.get(i + 1) == Some(&b'"') => {
                i += 2;
                continue;
            }
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push(i),
            b'}' => {
                if let Some(start) = open.pop() {
                    spans.push(start..i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    spans.sort_unstable_by_key(|span| span.start);
    spans
}
