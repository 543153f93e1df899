use clap::Parser;
use std::sync::Arc;

mod commands;
mod execute;

use commands::Commands;
use groundwork_core::events::ConsoleVerbosity;

#[derive(Parser)]
#[command(name = "groundwork")]
#[command(about = "Idempotent provisioning of remote hosts", long_about = None)]
#[command(version)]
struct Cli {
    /// More output; repeat for debug logs
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report failures
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output preferences shared by every command
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub verbosity: ConsoleVerbosity,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let level = if cli.quiet {
        -1
    } else {
        i8::try_from(cli.verbose).unwrap_or(i8::MAX)
    };
    if let Err(e) = groundwork_utils::init(level) {
        eprintln!("failed to initialise logging: {e}");
    }

    let output = Arc::new(Output {
        verbosity: match (cli.quiet, cli.verbose) {
            (true, _) => ConsoleVerbosity::Quiet,
            (false, 0) => ConsoleVerbosity::Normal,
            _ => ConsoleVerbosity::Verbose,
        },
    });

    execute::execute_command(cli.command, output).await
}
