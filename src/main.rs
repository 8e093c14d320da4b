use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

/// Embed SPIR-V binaries into a C header as `uint32_t` arrays
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Header file to write
    output: PathBuf,

    /// SPIR-V binaries to embed, in declaration order
    inputs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    spirv_embed::generate(&args.output, &args.inputs)
        .with_context(|| format!("failed to generate {}", args.output.display()))
}
