use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::{read_form, write_form, Env};

#[derive(Debug, Args)]
pub struct CleanupArgs {
    /// Form document (`-` for stdin)
    pub doc: PathBuf,

    /// Write the result back to the document
    #[arg(short, long)]
    pub in_place: bool,
}

pub fn cleanup(args: CleanupArgs, env: &Env) -> Result<()> {
    let ctx = env.context()?;
    let form = read_form(env, &args.doc)?;

    let cleaned = ctx.cleanup_last_placeholders(&form);
    if cleaned == form {
        tracing::info!("no trailing placeholders in {}", args.doc.display());
    }

    write_form(env, &args.doc, cleaned, args.in_place)
}
