pub use trip_core::config::*;

use crate::cli::{Cli, CliCommand};

pub fn from_cli(cli: &Cli) -> anyhow::Result<AppConfig> {
    let out_dir = match &cli.command {
        Some(CliCommand::Build(args)) => args.out.clone(),
        _ => None,
    };
    AppConfig::discover(ConfigOverrides {
        data_dir: cli.data_dir.clone(),
        data_url: cli.data_url.clone(),
        out_dir,
        locale: cli.locale,
        notes_url: cli.notes_url.clone(),
    })
}
