//! utsbox CLI
//!
//! Runs a command with an isolated hostname by re-executing itself into a new
//! UTS namespace.

use clap::Parser;
use std::process;
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod cli;
mod dispatch;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command-line arguments; usage errors exit with status 2
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            exit_code(&e)
        }
    };

    process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let invocation = cli.command.into_invocation()?;
    Ok(dispatch::dispatch(invocation, cli.verbose).await?)
}

/// Setup logging based on verbosity; `RUST_LOG` takes precedence
fn init_logging(verbose: bool) {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<utsbox_core::Error>()
        .map_or(utsbox_core::Error::SETUP_EXIT_CODE, utsbox_core::Error::exit_code)
}
