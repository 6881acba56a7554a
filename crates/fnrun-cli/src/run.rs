use std::io::IsTerminal;

use anyhow::Context;
use clap::Args;
use fnrun_core::{ExecutionFormat, ProcessEnv};
use fnrun_funcfile::{ImageBuilder, check_expectations, parse_env_flags};
use fnrun_runtime::{Dispatcher, InvocationRequest};
use http::Method;
use tokio::io::AsyncReadExt;

use crate::config::FnrunConfig;
use crate::function_dir;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Function directory, relative to the current directory
    pub path: Option<String>,

    /// Environment variable for the function, as KEY=VALUE or KEY (value
    /// taken from this shell)
    #[arg(short = 'e', long = "env", value_name = "KEY[=VALUE]")]
    pub env: Vec<String>,

    /// Container link for the function
    #[arg(long = "link", value_name = "NAME[:ALIAS]")]
    pub links: Vec<String>,

    /// HTTP method (default: POST with input on stdin, GET without)
    #[arg(long, value_parser = parse_method)]
    pub method: Option<Method>,

    /// Execution format: default, http or json (default: as declared)
    #[arg(long)]
    pub format: Option<ExecutionFormat>,

    /// Hot formats only: send this many requests to one container
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub runs: i64,

    /// Memory for the function in MB (default: as declared)
    #[arg(long, value_name = "MB")]
    pub memory: Option<u64>,

    /// Don't use the image build cache
    #[arg(long)]
    pub no_cache: bool,

    /// Run the existing image without building it first
    #[arg(long)]
    pub skip_build: bool,
}

fn parse_method(s: &str) -> Result<Method, http::method::InvalidMethod> {
    Method::from_bytes(s.trim().to_uppercase().as_bytes())
}

pub async fn run(args: RunArgs, config: &FnrunConfig) -> anyhow::Result<()> {
    let dir = function_dir(args.path.as_deref())?;
    if args.path.is_some() {
        tracing::info!(dir = %dir.display(), "Running function");
    }

    let mut function = fnrun_funcfile::load(&dir)?;
    let env = parse_env_flags(&args.env, &ProcessEnv);
    let env = check_expectations(&function.declaration, env, &ProcessEnv)?;

    let dispatcher = Dispatcher::new()
        .with_bin(config.docker.bin.clone())
        .with_registry(config.registry_prefix(&ProcessEnv));

    if args.skip_build {
        tracing::debug!("Skipping image build");
    } else {
        let image = dispatcher.image_for(&function.declaration);
        ImageBuilder::new()
            .with_bin(config.docker.bin.clone())
            .build(&function, &image, args.no_cache)
            .await?;
    }

    function.declaration.apply_memory_override(args.memory);

    let request = InvocationRequest {
        method: args.method,
        input: read_input().await?,
        env,
        links: args.links,
        format: args.format,
        runs: args.runs,
    };

    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();
    let outcome = dispatcher
        .invoke(&function.declaration, request, &mut stdout, &mut stderr)
        .await?;

    tracing::debug!(format = %outcome.format, records = ?outcome.records, "Run complete");
    Ok(())
}

/// The request body: everything on stdin, or `None` when stdin is a
/// terminal.
async fn read_input() -> anyhow::Result<Option<Vec<u8>>> {
    if std::io::stdin().is_terminal() {
        return Ok(None);
    }
    let mut input = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut input)
        .await
        .context("error reading from stdin")?;
    Ok(Some(input))
}
