mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use log::LevelFilter;
use pagescope_lib::logging::{init_logger, level_for};

use cli::Commands;
use commands::{run_analyze, run_serve};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().collect();
    let args = cli::parse();

    match args.command {
        Commands::Analyze(analyze) => {
            init_logger(level_for(args.verbose, LevelFilter::Warn));
            run_analyze(&raw_args, args.config, analyze).await
        }
        Commands::Serve(serve) => {
            init_logger(level_for(args.verbose, LevelFilter::Info));
            run_serve(&raw_args, args.config, serve).await
        }
    }
}
