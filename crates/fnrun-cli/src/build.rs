use clap::Args;
use fnrun_core::ProcessEnv;
use fnrun_funcfile::ImageBuilder;

use crate::config::FnrunConfig;
use crate::function_dir;

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Function directory, relative to the current directory
    pub path: Option<String>,

    /// Don't use the image build cache
    #[arg(long)]
    pub no_cache: bool,
}

pub async fn build(args: BuildArgs, config: &FnrunConfig) -> anyhow::Result<()> {
    let dir = function_dir(args.path.as_deref())?;
    let function = fnrun_funcfile::load(&dir)?;
    let image = function
        .declaration
        .image_name(config.registry_prefix(&ProcessEnv).as_deref());

    ImageBuilder::new()
        .with_bin(config.docker.bin.clone())
        .build(&function, &image, args.no_cache)
        .await?;

    eprintln!("Function {image} built successfully.");
    Ok(())
}
