mod commands;
mod config;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, cleanup, defaults, init, list, new, ApplyArgs, CleanupArgs, DefaultsArgs, Env,
    InitArgs, ListArgs, NewArgs,
};
use config::IdStrategy;
use tracing_subscriber::filter::LevelFilter;

/// Blockform CLI - edit block-based form documents from the shell
#[derive(Parser, Debug)]
#[command(name = "blockform")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: ./blockform.config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Block id generator
    #[arg(long, global = true, value_enum, default_value = "uuid")]
    ids: IdStrategy,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default blockform.config.json
    Init(InitArgs),

    /// Print a new form document
    New(NewArgs),

    /// Apply a mutation to a form document
    Apply(ApplyArgs),

    /// Strip trailing placeholder blocks
    Cleanup(CleanupArgs),

    /// List every block, nested ones included
    List(ListArgs),

    /// Fill in schema defaults of a block
    Defaults(DefaultsArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();
    let env = Env {
        cwd,
        config_path: cli.config,
        ids: cli.ids,
    };

    match cli.command {
        Command::Init(args) => init(args, &env),
        Command::New(args) => new(args, &env),
        Command::Apply(args) => apply(args, &env),
        Command::Cleanup(args) => cleanup(args, &env),
        Command::List(args) => list(args, &env),
        Command::Defaults(args) => defaults(args, &env),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["blockform", "list", "page.json", "--ids", "sequential", "-vv"])
            .unwrap();

        assert_eq!(cli.ids, IdStrategy::Sequential);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::List(_)));
    }
}
