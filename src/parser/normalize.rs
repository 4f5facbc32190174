fn is_structural(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | ',' | ':')
}

/// Tidy a model-written JSON fragment before it reaches `serde_json`.
///
/// Outside string literals: newlines become whitespace, whitespace touching
/// structural punctuation is dropped, remaining runs collapse to one space,
/// and trailing commas before `}`/`]` are removed. Inside string literals raw
/// line breaks and tabs become single spaces; everything else is kept.
pub fn normalize_fragment(raw: &str) -> String {
    let chars = raw.trim().chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(chars.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            match c {
                _ if escaped => {
                    escaped = false;
                    out.push(c);
                }
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\r' if chars.get(i + 1) == Some(&'\n') => {}
                '\r' | '\n' | '\t' => out.push(' '),
                _ => out.push(c),
            }
            i += 1;
            continue;
        }

        if c.is_whitespace() {
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            let prev = out.chars().last();
            let next = chars.get(j).copied();
            let touches_structure =
                prev.map_or(true, is_structural) || next.map_or(true, is_structural);
            if !touches_structure {
                out.push(' ');
            }
            i = j;
            continue;
        }

        if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                i += 1;
                continue;
            }
        }

        if c == '"' {
            in_string = true;
        }
        out.push(c);
        i += 1;
    }
    out
}

/// Undo one level of quote escaping for payloads written as `{\"type\": ...}`.
///
/// Returns `None` when the fragment does not start its first key with an
/// escaped quote.
pub fn unescape_quotes(raw: &str) -> Option<String> {
    let first_quote = raw.find('"')?;
    if first_quote == 0 || raw.as_bytes()[first_quote - 1] != b'\\' {
        return None;
    }
    Some(raw.replace("\\\"", "\""))
}

#[cfg(test)]
mod tests {
    use super::{normalize_fragment, unescape_quotes};

    #[test]
    fn collapses_pretty_printing() {
        let raw = "{\n  \"type\": \"pie\",\n  \"data\": [\n    { \"label\": \"Rent\", \"value\": 1200 }\n  ]\n}";
        assert_eq!(
            normalize_fragment(raw),
            "{\"type\":\"pie\",\"data\":[{\"label\":\"Rent\",\"value\":1200}]}"
        );
    }

    #[test]
    fn drops_trailing_commas() {
        assert_eq!(
            normalize_fragment("{\"a\": [1, 2, ], \"b\": 3, }"),
            "{\"a\":[1,2],\"b\":3}"
        );
    }

    #[test]
    fn leaves_string_contents_alone() {
        assert_eq!(
            normalize_fragment("{\"label\": \"Rent , }  and food\"}"),
            "{\"label\":\"Rent , }  and food\"}"
        );
    }

    #[test]
    fn line_breaks_inside_strings_become_spaces() {
        assert_eq!(
            normalize_fragment("{\"title\": \"Monthly\r\nSpend\"}"),
            "{\"title\":\"Monthly Spend\"}"
        );
    }

    #[test]
    fn keeps_separation_between_bare_tokens() {
        assert_eq!(normalize_fragment("[1   2]"), "[1 2]");
    }

    #[test]
    fn unescapes_double_escaped_payloads_only() {
        assert_eq!(
            unescape_quotes("{\\\"type\\\":\\\"pie\\\"}").as_deref(),
            Some("{\"type\":\"pie\"}")
        );
        assert_eq!(unescape_quotes("{\"type\":\"pie\"}"), None);
        assert_eq!(unescape_quotes("no quotes"), None);
    }
}
