use anyhow::{anyhow, Context, Result};
use blockform_editor::Mutation;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::{read_form, read_json, write_form, Env};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Form document (`-` for stdin)
    pub doc: PathBuf,

    /// Mutation as JSON, e.g. '{"op":"add","blockType":"image"}'
    pub mutation: Option<String>,

    /// Read the mutation (or a list of them) from a file instead
    #[arg(short, long, conflicts_with = "mutation")]
    pub file: Option<PathBuf>,

    /// Write the result back to the document
    #[arg(short, long)]
    pub in_place: bool,
}

pub fn apply(args: ApplyArgs, env: &Env) -> Result<()> {
    let mutations = match (&args.mutation, &args.file) {
        (Some(json), None) => parse_mutations(serde_json::from_str(json)?)?,
        (None, Some(file)) => parse_mutations(read_json(env, file)?)?,
        _ => return Err(anyhow!("Pass a mutation or --file")),
    };

    let ctx = env.context()?;
    let mut form = read_form(env, &args.doc)?;

    for (index, mutation) in mutations.iter().enumerate() {
        let result = mutation
            .apply(&ctx, &form)
            .with_context(|| format!("mutation #{index} ({}) failed", mutation.name()))?;

        if let Some(id) = &result.block_id {
            eprintln!("{} {} {}", "✓".green(), mutation.name(), id.bright_white());
        }
        form = result.form;
    }

    write_form(env, &args.doc, form, args.in_place)
}

/// One mutation object, or an array of them applied in order
fn parse_mutations(value: serde_json::Value) -> Result<Vec<Mutation>> {
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}
