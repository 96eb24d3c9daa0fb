use anyhow::Result;
use clap::Args;
use std::path::Path;

use super::{write_form, Env};

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Number of blocks (default: one placeholder)
    #[arg(short, long)]
    pub count: Option<usize>,

    /// Block type for --count (default: the default block type)
    #[arg(short = 't', long = "type")]
    pub block_type: Option<String>,
}

pub fn new(args: NewArgs, env: &Env) -> Result<()> {
    let ctx = env.context()?;

    let form = match args.count {
        None => ctx.empty_blocks_form(),
        Some(count) => {
            let block_type = args
                .block_type
                .unwrap_or_else(|| ctx.default_block_type().to_string());
            ctx.blocks_form_generator(count, &block_type)
        }
    };

    write_form(env, Path::new("-"), form, false)
}
