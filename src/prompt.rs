/// Assistant instructions describing the payload shape the parser accepts.
pub const CHART_FORMAT_INSTRUCTIONS: &str = r#"You help users understand their bookkeeping and personal finances.

To show a chart, put a single JSON object in a fenced code block tagged json.
Fields:

- "type": one of pie, donut, bar, line, area, scatter
- "data": a non-empty list of points, each with a text "label" and a numeric
  "value"; optional "category" (text) and "date" (YYYY-MM-DD)
- "options" (optional): "title", "xAxis", "yAxis", "colors" (list of CSS
  colors), "width", "height", and "margin" with top, right, bottom and left

Values must be plain JSON numbers such as 1200 or 15.5, never quoted strings
or formatted amounts like "$1,200".

Spending by category as a pie chart:

```json
{
  "type": "pie",
  "data": [
    { "label": "Rent", "value": 1200, "category": "Housing" },
    { "label": "Utilities", "value": 200, "category": "Housing" },
    { "label": "Groceries", "value": 400, "category": "Food" }
  ],
  "options": { "title": "Monthly Expenses by Category" }
}
```

Income over time as a line chart:

```json
{
  "type": "line",
  "data": [
    { "label": "January", "value": 5000, "date": "2024-01-01" },
    { "label": "February", "value": 5500, "date": "2024-02-01" },
    { "label": "March", "value": 6000, "date": "2024-03-01" }
  ],
  "options": { "title": "Monthly Income Trend", "xAxis": "Month", "yAxis": "Income ($)" }
}
```

Use pie or donut for shares of a whole, bar for comparisons, line or area for
trends over time and scatter for spread. Give every chart a title, keep dates
in YYYY-MM-DD form and include at most one chart per reply. Explain the
numbers in plain sentences outside the JSON block.
"#;

/// The fenced example payloads embedded in the instructions.
pub fn example_payloads() -> Vec<&'static str> {
    CHART_FORMAT_INSTRUCTIONS
        .split("```json")
        .skip(1)
        .filter_map(|rest| rest.split_once("```").map(|(body, _)| body.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{example_payloads, CHART_FORMAT_INSTRUCTIONS};
    use crate::chart::ChartKind;
    use crate::parser::parse_message_content;

    #[test]
    fn every_example_parses_as_a_chart() {
        let examples = example_payloads();
        assert_eq!(examples.len(), 2);
        let kinds = examples
            .iter()
            .map(|e| parse_message_content(e).chart.expect("example chart").kind)
            .collect::<Vec<_>>();
        assert_eq!(kinds, vec![ChartKind::Pie, ChartKind::Line]);
    }

    #[test]
    fn instructions_name_every_kind() {
        for kind in ChartKind::ALL {
            assert!(CHART_FORMAT_INSTRUCTIONS.contains(kind.as_str()));
        }
    }
}
