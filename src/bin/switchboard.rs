//! Switchboard CLI Binary

use clap::Parser;
use std::process;
use switchboard::config::ConfigLoader;
use switchboard::logging::init_logging;
use switchboard::tooling::cli::{Cli, CliContext};

async fn run(cli: Cli) -> anyhow::Result<String> {
    let mut config = ConfigLoader::load_with_override(cli.config.as_deref())?;
    cli.apply_logging_overrides(&mut config);
    init_logging(Some(&config.logging))?;

    let context = CliContext::from_config(config, cli.store.clone())?;
    Ok(context.execute(&cli.command).await?)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
