use crate::config::{BlockTypeConfig, Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

use super::Env;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Default block type for placeholders
    #[arg(short = 't', long, default_value = "slate")]
    pub default_type: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, env: &Env) -> Result<()> {
    let config_path = PathBuf::from(&env.cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing blockform config...".bright_blue().bold());

    let mut config = Config::default();
    if args.default_type != config.editor.default_block_type {
        let slate = config
            .block_types
            .remove(&config.editor.default_block_type)
            .unwrap_or_default();
        config.block_types.insert(args.default_type.clone(), slate);
        config.editor.default_block_type = args.default_type.clone();
    }

    // Sample non-default type showing every option
    config.block_types.insert(
        "image".to_string(),
        BlockTypeConfig {
            value_fields: vec!["url".to_string()],
            schema: serde_json::from_value(json!({
                "title": "Image",
                "properties": { "align": { "default": "center" } }
            }))?,
            initial_value: json!({ "size": "l" }).as_object().cloned(),
        },
    );

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, format!("{config_json}\n"))?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("Next steps:");
    println!("  1. Run: blockform new > page.json");
    println!(
        "  2. Run: blockform apply page.json '{{\"op\":\"add\",\"blockType\":\"image\"}}' --in-place"
    );
    println!("  3. Run: blockform list page.json");

    Ok(())
}
