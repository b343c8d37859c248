use anyhow::Result;
use ku_cli::config::{init_logging, Settings};

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse_with_networks();
    let settings = Settings::from_env()?;
    init_logging(&settings.log_filter);

    cli::run(&cli, &settings)
}
