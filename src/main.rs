use std::process::ExitCode;

use blogweave::{Args, Command, build_site, serve};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match &args.command {
        Command::Build(build) => build
            .load_config()
            .and_then(|config| build_site(&config).map(|_| ())),
        Command::Serve { build, port } => build
            .load_config()
            .and_then(|config| serve::serve(config, *port)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
