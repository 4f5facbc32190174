use replychart::chart::RejectReason;
use replychart::{parse_message_content, ChartKind, ContentParser, FillerPolicy, ParserOptions};

fn fenced(kind: &str, n: usize) -> String {
    let points = (0..n)
        .map(|i| format!("{{\"label\":\"p{i}\",\"value\":{}}}", i * 10 + 1))
        .collect::<Vec<_>>()
        .join(",");
    format!("Summary below.\n```json\n{{\"type\":\"{kind}\",\"data\":[{points}]}}\n```\nThanks!")
}

#[test]
fn scenario_a_fenced_pie() {
    let out = parse_message_content(
        "Here's your spending:\n```json\n{\"type\":\"pie\",\"data\":[{\"label\":\"Rent\",\"value\":1200}]}\n```",
    );
    let chart = out.chart.expect("chart");
    assert_eq!(chart.kind, ChartKind::Pie);
    assert_eq!(chart.points.len(), 1);
    assert_eq!(chart.points[0].label, "Rent");
    assert_eq!(chart.points[0].value, 1200.0);
    assert!(!out.prose.contains("```"));
    assert!(!out.prose.contains('{'));
}

#[test]
fn scenario_b_plain_text_is_untouched() {
    let text = "Your balance is $500 this month.";
    let out = parse_message_content(text);
    assert!(out.chart.is_none());
    assert_eq!(out.prose, text);
}

#[test]
fn scenario_c_trailing_comma_is_tolerated() {
    let out = parse_message_content(
        "```json\n{\"type\":\"bar\",\"data\":[{\"label\":\"a\",\"value\":1,},],}\n```",
    );
    assert_eq!(out.chart.expect("chart").kind, ChartKind::Bar);
    assert_eq!(out.prose, "");
}

#[test]
fn scenario_d_later_fragment_is_found() {
    let text = "First {\"type\":\"radar\",\"data\":[{\"label\":\"x\",\"value\":1}]} then {\"type\":\"scatter\",\"data\":[{\"label\":\"y\",\"value\":2}]}";
    let (out, trace) = ContentParser::default().parse_traced(text);
    assert_eq!(out.chart.expect("chart").kind, ChartKind::Scatter);
    assert!(out.prose.starts_with("First {\"type\":\"radar\""));
    assert!(out.prose.ends_with("then"));
    assert_eq!(trace.accepted().expect("accepted").matcher, "kind_field");
}

#[test]
fn scenario_d_rejected_first_chart_falls_through() {
    let text = "{\"type\":\"line\",\"data\":[{\"label\":\"\",\"value\":1}]}\n{\"type\":\"line\",\"data\":[{\"label\":\"ok\",\"value\":1}]}";
    let (out, trace) = ContentParser::default().parse_traced(text);
    assert_eq!(out.chart.expect("chart").points[0].label, "ok");
    assert_eq!(
        trace.attempts[0].outcome,
        Err(RejectReason::MissingLabel { index: 0 })
    );
}

#[test]
fn brace_free_text_yields_trimmed_prose() {
    for text in [
        "",
        "   ",
        "  Groceries were $320 (up 4%).\n",
        "Line one\n\nLine two\t",
        "```\nplain code\n```",
    ] {
        let out = parse_message_content(text);
        assert!(out.chart.is_none(), "{text:?}");
        assert_eq!(out.prose, text.trim(), "{text:?}");
    }
}

#[test]
fn fenced_payload_keeps_kind_and_point_count() {
    for kind in ChartKind::ALL {
        for n in [1, 3, 12] {
            let out = parse_message_content(&fenced(kind.as_str(), n));
            let chart = out.chart.expect("chart");
            assert_eq!(chart.kind, kind);
            assert_eq!(chart.points.len(), n);
            assert_eq!(out.prose, "Summary below.\n\nThanks!");
        }
    }
}

#[test]
fn prose_never_reparses_into_a_chart() {
    let inputs = [
        fenced("donut", 2),
        "a {\"type\":\"bar\",\"data\":[{\"label\":\"a\",\"value\":1}]} b {\"type\":\"bar\",\"data\":[{\"label\":\"b\",\"value\":2}]}".to_string(),
        "```json\n{\"type\":\"pie\",\"data\":[{\"label\":\"a\",\"value\":1}]}\n```\n```json\n{\"type\":\"line\",\"data\":[{\"label\":\"b\",\"value\":2}]}\n```".to_string(),
    ];
    for text in &inputs {
        let first = parse_message_content(text);
        assert!(first.chart.is_some());
        let second = parse_message_content(&first.prose);
        assert!(second.chart.is_none(), "{text:?}");
        assert_eq!(second.prose, first.prose);
    }
}

#[test]
fn one_bad_point_rejects_the_whole_descriptor() {
    let out = parse_message_content(
        "{\"type\":\"pie\",\"data\":[{\"label\":\"a\",\"value\":1},{\"label\":\"b\"}]}",
    );
    assert!(out.chart.is_none());

    let (_, trace) = ContentParser::default().parse_traced(
        "{\"type\":\"pie\",\"data\":[{\"label\":\"a\",\"value\":\"12\"}]}",
    );
    assert!(trace.accepted().is_none());
    assert_eq!(
        trace.attempts[0].outcome,
        Err(RejectReason::NonNumericValue { index: 0 })
    );
}

#[test]
fn kinds_outside_the_closed_set_are_rejected() {
    for kind in ["radar", "PIE", "histogram", ""] {
        let text = format!("```json\n{{\"type\":\"{kind}\",\"data\":[{{\"label\":\"a\",\"value\":1}}]}}\n```");
        assert!(parse_message_content(&text).chart.is_none(), "{kind}");
    }
}

#[test]
fn strip_filler_is_opt_in() {
    let text = "Here's a chart of your monthly spending:\n\n```json\n{\"type\":\"bar\",\"data\":[{\"label\":\"Jan\",\"value\":900}]}\n```\n\nJanuary was your lightest month.";
    let default = parse_message_content(text);
    assert_eq!(
        default.prose,
        "Here's a chart of your monthly spending:\n\n\n\nJanuary was your lightest month."
    );

    let stripped = ContentParser::new(ParserOptions {
        filler: FillerPolicy::StripFiller,
    })
    .parse(text);
    assert_eq!(stripped.prose, "January was your lightest month.");
    assert_eq!(stripped.chart, default.chart);
}

#[test]
fn fragment_only_removal_is_a_plain_splice() {
    let text = "Totals:\r\n\r\n\r\n```json\r\n{\"type\":\"bar\",\"data\":[{\"label\":\"Q1\",\"value\":7}]}\r\n```\r\n\r\n\r\nQ1 closed strong.\r\n";
    let out = parse_message_content(text);
    assert_eq!(out.chart.expect("chart").points[0].value, 7.0);
    assert_eq!(out.prose, "Totals:\r\n\r\n\r\n\r\n\r\n\r\nQ1 closed strong.");
}
