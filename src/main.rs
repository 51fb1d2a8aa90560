use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = trip::cli::Cli::parse();
    trip::commands::run_blocking(cli)
}
