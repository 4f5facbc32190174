use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use replychart::render::Backend;

/// Extract and render charts embedded in assistant replies.
#[derive(Debug, Parser)]
#[command(name = "replychart")]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Config file (JSON or YAML)
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// Debug logging on stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Split a reply into prose and chart; prints a JSON report
    Parse(ParseArgs),
    /// Parse a reply and render its chart
    Render(RenderArgs),
    /// Summarize the charts found in a chat transcript
    Transcript(TranscriptArgs),
    /// Print the assistant instructions for the chart payload format
    Prompt,
    /// Print build information
    Version,
}

#[derive(Debug, clap::Args)]
pub(crate) struct ParseArgs {
    /// Reply text file; stdin when omitted or "-"
    pub(crate) input: Option<PathBuf>,

    /// Also drop filler lines that only announce the chart
    #[arg(long)]
    pub(crate) strip_filler: bool,

    /// Include every matcher attempt in the report
    #[arg(long)]
    pub(crate) explain: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub(crate) pretty: bool,
}

#[derive(Debug, clap::Args)]
pub(crate) struct RenderArgs {
    /// Reply text file; stdin when omitted or "-"
    pub(crate) input: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub(crate) backend: Option<Backend>,

    /// Write the rendered chart here instead of stdout
    #[arg(long, value_name = "PATH")]
    pub(crate) out: Option<PathBuf>,

    #[arg(long)]
    pub(crate) width: Option<f64>,

    #[arg(long)]
    pub(crate) height: Option<f64>,

    /// Colour terminal output (auto: only when stdout is a terminal)
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub(crate) color: ColorChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, clap::Args)]
pub(crate) struct TranscriptArgs {
    /// JSON array or JSONL of {role, content} messages
    pub(crate) input: PathBuf,

    /// Print the JSON report instead of the text summary
    #[arg(long)]
    pub(crate) json: bool,
}
