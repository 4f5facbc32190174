mod cli_args;
mod cli_dispatch;
mod logging;

use clap::Parser;

use crate::cli_args::{Cli, Commands};
use crate::cli_dispatch::{
    handle_parse_command, handle_render_command, handle_transcript_command, load_effective_config,
    version_text,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    match &cli.command {
        Commands::Parse(args) => handle_parse_command(args, &load_effective_config(config_path)?),
        Commands::Render(args) => handle_render_command(args, &load_effective_config(config_path)?),
        Commands::Transcript(args) => {
            handle_transcript_command(args, &load_effective_config(config_path)?)
        }
        Commands::Prompt => {
            print!("{}", replychart::prompt::CHART_FORMAT_INSTRUCTIONS);
            Ok(())
        }
        Commands::Version => {
            println!("{}", version_text());
            Ok(())
        }
    }
}
