use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use buildcore::command::{self, Cli, Command};
use buildcore::config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = run(cli).await;
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> i32 {
    let overrides = config::CliOverrides::from(cli.config);
    let config = match config::load(&overrides) {
        Ok(config) => config,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            return code;
        }
    };

    let cancellation = CancellationToken::new();
    let result = match &cli.command {
        Command::Changelog(args) => command::changelog::run(&config, args, &cancellation).await,
        Command::FindBuild(args) => command::find_build::run(&config, args, &cancellation).await,
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            code
        }
    }
}

/// Initialize `tracing-subscriber` once, at process start (§4.L). `-v`
/// raises the default filter level; `RUST_LOG` always takes precedence when
/// set.
fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
