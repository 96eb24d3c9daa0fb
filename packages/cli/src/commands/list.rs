use anyhow::Result;
use blockform_common::block_type;
use blockform_editor::{BlockVisitor, EditorContext};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use super::{read_form, Env};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Form document (`-` for stdin)
    pub doc: PathBuf,

    /// Only blocks of these types
    #[arg(short = 't', long = "type")]
    pub types: Vec<String>,

    #[arg(short, long, value_enum, default_value = "text")]
    pub format: ListFormat,
}

/// One visited block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedBlock {
    pub depth: usize,
    pub id: String,
    #[serde(rename = "@type")]
    pub block_type: Option<String>,
    pub placeholder: bool,
}

struct Lister<'a> {
    ctx: &'a EditorContext,
    types: &'a [String],
    blocks: Vec<ListedBlock>,
}

impl BlockVisitor for Lister<'_> {
    fn visit_block(&mut self, id: &str, block: &Value, depth: usize) {
        let block_type = block_type(block);
        if !self.types.is_empty() && !block_type.is_some_and(|t| self.types.iter().any(|x| x == t)) {
            return;
        }

        self.blocks.push(ListedBlock {
            depth,
            id: id.to_string(),
            block_type: block_type.map(str::to_string),
            placeholder: self.ctx.is_placeholder_block(block),
        });
    }
}

/// Every block of `form` in breadth-first order
pub fn collect(ctx: &EditorContext, form: &blockform_editor::FormData, types: &[String]) -> Result<Vec<ListedBlock>> {
    let mut lister = Lister {
        ctx,
        types,
        blocks: Vec::new(),
    };
    ctx.visit_blocks(form, &mut lister)?;
    Ok(lister.blocks)
}

pub fn list(args: ListArgs, env: &Env) -> Result<()> {
    let ctx = env.context()?;
    let form = read_form(env, &args.doc)?;
    let blocks = collect(&ctx, &form, &args.types)?;

    match args.format {
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&blocks)?),
        ListFormat::Text => {
            for block in &blocks {
                let indent = "  ".repeat(block.depth);
                let block_type = block.block_type.as_deref().unwrap_or("?");
                let marker = if block.placeholder {
                    " (placeholder)".dimmed().to_string()
                } else {
                    String::new()
                };
                println!("{indent}{} {}{marker}", block.id.bright_white(), block_type.cyan());
            }
            println!();
            println!("{} blocks", blocks.len());
        }
    }

    Ok(())
}
