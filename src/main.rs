use clap::Parser;
use scopegate::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Sign(args) => cli::sign::run(args).await,
        Command::Verify(args) => cli::verify::run(args).await,
        Command::Inspect(args) => cli::inspect::run(args).await,
    }
}
