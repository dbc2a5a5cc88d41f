use anyhow::Result;
use clap::Parser;

use choromap::cli::{Cli, Commands};
use choromap::commands::map;

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Map(args) => map::run_map(&cli, args),
    }
}
