use std::io::{IsTerminal, Read};
use std::path::Path;

use anyhow::Context;
use replychart::config::{load_config, validate_config, ReplyChartConfig};
use replychart::parser::{ContentParser, FillerPolicy};
use replychart::render::terminal::TerminalRenderer;
use replychart::render::{Backend, ChartDispatcher, ChartRenderer};
use replychart::report::ParseReport;
use replychart::transcript::{load_transcript, scan_transcript};

use crate::cli_args::{ColorChoice, ParseArgs, RenderArgs, TranscriptArgs};

pub(crate) const EXIT_NO_CHART: i32 = 2;

pub(crate) fn load_effective_config(path: Option<&Path>) -> anyhow::Result<ReplyChartConfig> {
    match path {
        Some(p) => load_config(p),
        None => Ok(ReplyChartConfig::default()),
    }
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read_to_string(p).with_context(|| format!("read input {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read input from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(out: Option<&Path>, body: &str) -> anyhow::Result<()> {
    match out {
        Some(p) => {
            std::fs::write(p, body).with_context(|| format!("write output {}", p.display()))?;
            eprintln!("wrote {}", p.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}

pub(crate) fn handle_parse_command(args: &ParseArgs, cfg: &ReplyChartConfig) -> anyhow::Result<()> {
    let mut options = cfg.parser_options();
    if args.strip_filler {
        options.filler = FillerPolicy::StripFiller;
    }
    let text = read_input(args.input.as_deref())?;
    let parser = ContentParser::new(options);
    let report = if args.explain {
        let (result, trace) = parser.parse_traced(&text);
        ParseReport::from_result(result, options.filler, Some(&trace))
    } else {
        ParseReport::from_result(parser.parse(&text), options.filler, None)
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

pub(crate) fn handle_render_command(args: &RenderArgs, cfg: &ReplyChartConfig) -> anyhow::Result<()> {
    let mut cfg = cfg.clone();
    if let Some(backend) = args.backend {
        cfg.backend = backend;
    }
    if args.width.is_some() {
        cfg.render.width = args.width;
    }
    if args.height.is_some() {
        cfg.render.height = args.height;
    }
    validate_config(&cfg).context("invalid render overrides")?;

    let text = read_input(args.input.as_deref())?;
    let result = ContentParser::new(cfg.parser_options()).parse(&text);
    let Some(chart) = result.chart else {
        eprintln!("no chart payload found");
        std::process::exit(EXIT_NO_CHART);
    };
    let color = cfg.backend == Backend::Terminal
        && use_color(
            args.color,
            args.out.is_some(),
            std::io::stdout().is_terminal(),
            std::env::var_os("NO_COLOR").is_some(),
        );
    let body = if color {
        TerminalRenderer::new(&cfg.render_style()).render_ansi(&chart)
    } else {
        ChartDispatcher::new(cfg.backend, cfg.render_style())
            .render(&chart)
            .body
    };
    write_output(args.out.as_deref(), &body)
}

fn use_color(choice: ColorChoice, to_file: bool, stdout_tty: bool, no_color: bool) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => !to_file && stdout_tty && !no_color,
    }
}

pub(crate) fn handle_transcript_command(
    args: &TranscriptArgs,
    cfg: &ReplyChartConfig,
) -> anyhow::Result<()> {
    let text = read_input(Some(&args.input))?;
    let messages = load_transcript(&text)?;
    let report = scan_transcript(&ContentParser::new(cfg.parser_options()), &messages);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

pub(crate) fn version_text() -> String {
    format!(
        "replychart {}\ngit_sha: {}\ntarget: {}\nbuild_time_utc: {}",
        env!("CARGO_PKG_VERSION"),
        env!("REPLYCHART_GIT_SHA"),
        env!("REPLYCHART_TARGET"),
        env!("REPLYCHART_BUILD_TIME_UTC")
    )
}

#[cfg(test)]
mod tests {
    use super::use_color;
    use crate::cli_args::ColorChoice;

    #[test]
    fn auto_colour_needs_a_terminal_on_stdout() {
        assert!(use_color(ColorChoice::Auto, false, true, false));
        assert!(!use_color(ColorChoice::Auto, true, true, false));
        assert!(!use_color(ColorChoice::Auto, false, false, false));
        assert!(!use_color(ColorChoice::Auto, false, true, true));
        assert!(use_color(ColorChoice::Always, true, false, true));
        assert!(!use_color(ColorChoice::Never, false, true, false));
    }
}
