use std::sync::OnceLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FILLER_LEAD_REGEX: OnceLock<Regex> = OnceLock::new();
static CHART_WORD_REGEX: OnceLock<Regex> = OnceLock::new();
static STRUCTURAL_NOISE_REGEX: OnceLock<Regex> = OnceLock::new();

/// How much of the prose around an accepted chart is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillerPolicy {
    /// Remove only the chart fragment itself.
    #[default]
    FragmentOnly,
    /// Also drop lines that merely announce the chart, and leftover
    /// punctuation-only lines.
    StripFiller,
}

fn filler_lead_regex() -> &'static Regex {
    FILLER_LEAD_REGEX.get_or_init(|| {
        Regex::new(
            r"(?ix)
            ^\s*(?:
                here(?:'|’)?s | here\s+is | here\s+are
                | below\s+is | below\s+are | the\s+following
                | this\s+(?:chart|graph|visuali[sz]ation)?\s*(?:shows?|displays?|represents?)
                | showing | displaying
            )\b",
        )
        .expect("Failed to compile filler lead regex")
    })
}

fn chart_word_regex() -> &'static Regex {
    CHART_WORD_REGEX.get_or_init(|| {
        Regex::new(r"(?i)\b(?:chart|graph|plot|visuali[sz]ation|visual|breakdown|json)\b")
            .expect("Failed to compile chart word regex")
    })
}

fn structural_noise_regex() -> &'static Regex {
    STRUCTURAL_NOISE_REGEX.get_or_init(|| {
        Regex::new(r#"^[\s{}\[\]"',:.\d-]+$"#).expect("Failed to compile structural noise regex")
    })
}

fn is_filler_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    if structural_noise_regex().is_match(trimmed) || trimmed == "```" {
        return true;
    }
    filler_lead_regex().is_match(trimmed)
        && (chart_word_regex().is_match(trimmed) || trimmed.ends_with(':'))
}

pub(crate) fn apply_filler_policy(prose: &str, policy: FillerPolicy) -> String {
    match policy {
        FillerPolicy::FragmentOnly => prose.trim().to_string(),
        FillerPolicy::StripFiller => {
            let kept = prose
                .lines()
                .filter(|l| !is_filler_line(l))
                .collect::<Vec<_>>()
                .join("\n");
            collapse_blank_runs(kept.trim())
        }
    }
}

/// Collapse runs of blank lines left behind by removals into one blank line.
pub(crate) fn collapse_blank_runs(text: &str) -> String {
    let mut out = Vec::new();
    let mut blank_run = 0usize;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push("");
        } else {
            blank_run = 0;
            out.push(line);
        }
    }
    out.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::{apply_filler_policy, collapse_blank_runs, is_filler_line, FillerPolicy};

    #[test]
    fn announces_are_filler() {
        assert!(is_filler_line("Here's a chart of your spending:"));
        assert!(is_filler_line("here is the breakdown"));
        assert!(is_filler_line("This chart shows your income."));
        assert!(is_filler_line("  ],"));
        assert!(!is_filler_line("Rent is your largest expense this month."));
        assert!(!is_filler_line("Here the numbers look healthy."));
    }

    #[test]
    fn fragment_only_keeps_everything() {
        let prose = "Here's your spending:\r\n\r\n\r\nRent dominates.";
        assert_eq!(
            apply_filler_policy(prose, FillerPolicy::FragmentOnly),
            prose
        );
        assert_eq!(
            apply_filler_policy("\n  kept \n", FillerPolicy::FragmentOnly),
            "kept"
        );
    }

    #[test]
    fn strip_filler_drops_announcements() {
        let prose = "Here's your spending:\n\n\nRent dominates.\n}";
        assert_eq!(
            apply_filler_policy(prose, FillerPolicy::StripFiller),
            "Rent dominates."
        );
    }

    #[test]
    fn blank_runs_collapse() {
        assert_eq!(collapse_blank_runs("a\n\n \n\nb\n"), "a\n\nb");
    }
}
