//! Assay binary entry point.

use assay::cli::{Cli, CliError, Commands, build_engine, cmd_ask, cmd_check, cmd_serve};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let engine = build_engine(&cli)?;
    match cli.command {
        Commands::Ask { query, json } => println!("{}", cmd_ask(&engine, &query, json).await?),
        Commands::Check { query, json } => print!("{}", cmd_check(&engine, &query, json)?),
        Commands::Serve { addr } => cmd_serve(engine, addr).await?,
    }
    Ok(())
}
