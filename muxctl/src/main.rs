// SPDX-License-Identifier: MIT

mod commands;
mod config;
mod utils;

use clap::{Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::ToolConfig;
use crate::utils::{LogLevel, init_logger, parse_bytes};

#[derive(Parser)]
#[command(name = "muxctl", version, about = "Multiplexed FAT volume tool", long_about = None)]
struct Cli {
    /// Backend and image configuration
    #[arg(short, long, default_value = "muxctl.toml", global = true)]
    config: PathBuf,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Also print driver and mount traces
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the drive index of a volume token (SD, USB, SDRAM, SPIFLASH or 0-3)
    Resolve { token: String },
    /// List every volume with its backend state
    Volumes,
    /// Print total and free space of a volume
    Size { token: String },
    /// Remove the first COUNT bytes of a file, e.g. `USB:logs/today.txt`
    Truncate { target: String, count: u64 },
    /// Create a FAT filesystem on a volume
    Format {
        token: String,
        /// Create the image file with this size first (e.g. 64M)
        #[arg(long)]
        create: Option<String>,
    },
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ToolConfig::from_file(&cli.config)?;

    match cli.command {
        Commands::Resolve { token } => commands::resolve(&config, &token),
        Commands::Volumes => commands::volumes(&config),
        Commands::Size { token } => commands::size(&config, &token),
        Commands::Truncate { target, count } => commands::truncate(&config, &target, count),
        Commands::Format { token, create } => {
            let create = create.as_deref().map(parse_bytes).transpose()?;
            commands::format(&config, &token, create)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(LogLevel::from_flags(cli.quiet, cli.verbose));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_truncate() {
        let cli = Cli::try_parse_from(["muxctl", "-v", "truncate", "USB:log.txt", "5"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Truncate { target, count } => {
                assert_eq!(target, "USB:log.txt");
                assert_eq!(count, 5);
            }
            _ => panic!("expected truncate"),
        }
    }
}
