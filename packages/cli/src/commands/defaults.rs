use anyhow::Result;
use blockform_editor::{BlockDefaults, Intl};
use clap::Args;
use serde_json::{Map, Value};
use std::path::PathBuf;

use super::{read_json, Env};

#[derive(Debug, Args)]
pub struct DefaultsArgs {
    /// Block payload (`-` for stdin)
    pub block: PathBuf,

    /// Locale handed to dynamic schemas
    #[arg(short, long, default_value = "en")]
    pub locale: String,
}

pub fn defaults(args: DefaultsArgs, env: &Env) -> Result<()> {
    let block = with_defaults(&args, env)?;
    println!("{}", serde_json::to_string_pretty(&block)?);
    Ok(())
}

/// The block of `args` with its configured schema defaults filled in
fn with_defaults(args: &DefaultsArgs, env: &Env) -> Result<Value> {
    let ctx = env.context()?;
    let data = read_json(env, &args.block)?;

    let block = ctx.apply_block_defaults(BlockDefaults {
        data: &data,
        intl: &Intl::new(args.locale.clone()),
        extra: &Map::new(),
    });
    if block == data {
        tracing::info!("no defaults to apply");
    }

    Ok(block)
}
