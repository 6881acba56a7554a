use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fnrun_runtime::DispatchError;
use tracing_subscriber::{EnvFilter, fmt};

mod build;
mod config;
mod run;

use config::FnrunConfig;

#[derive(Parser)]
#[command(
    name = "fnrun",
    version,
    about = "fnrun — invoke a function container locally the way the platform would"
)]
struct Cli {
    /// Config file (default: ./fnrun.toml, then the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the function image and run it once (or hot, several times)
    Run(run::RunArgs),
    /// Build the function image
    Build(build::BuildArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so they never mix with the function's stdout
    fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FNRUN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            exit_code(&err)
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let config = FnrunConfig::load(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Command::Run(args) => run::run(args, &config).await,
        Command::Build(args) => build::build(args, &config).await,
    }
}

/// Mirror the container's own exit status when it failed.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<DispatchError>() {
        Some(DispatchError::NonZeroExit { code: Some(code) }) => {
            u8::try_from(*code).map(ExitCode::from).unwrap_or(ExitCode::FAILURE)
        }
        _ => ExitCode::FAILURE,
    }
}

/// Function directory from an optional path argument, joined onto the
/// current directory.
pub(crate) fn function_dir(path: Option<&str>) -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(fnrun_funcfile::resolve_function_dir(&cwd, path))
}
