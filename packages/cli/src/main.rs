use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use confentry_cli::{format_result, run, Args, ClientConfig, CommandResult};

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_env("CONFENTRY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = ClientConfig::load(&args.overrides(), |key| std::env::var(key).ok())
        .and_then(|config| run(&config, &args.command, std::io::stdin().lock()));

    match result {
        Ok(outcome @ CommandResult::Ok(_)) => {
            println!("{}", format_result(&outcome));
            ExitCode::SUCCESS
        }
        Ok(outcome) => {
            eprintln!("{}", format_result(&outcome));
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            eprintln!("{}", format_result(&CommandResult::Error(e.to_string())));
            ExitCode::FAILURE
        }
    }
}
