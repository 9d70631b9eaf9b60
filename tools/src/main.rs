mod lookup;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scholia_core::Config;

#[derive(Parser)]
#[command(name = "scholia", about = "Latin and Greek word lookup for commentaries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve words and print their definitions
    Lookup(lookup::LookupArgs),
    /// Print the default configuration as TOML
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    match Cli::parse().command {
        Command::Lookup(args) => lookup::run(args),
        Command::Config => {
            print!("{}", Config::default().to_toml_string()?);
            Ok(())
        }
    }
}
