mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{ast, check, fix, AstArgs, CheckArgs, FixArgs};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Silent Code Mentor - quiet fixes and notes for JavaScript, TypeScript, Vue and HTML
#[derive(Parser, Debug)]
#[command(name = "mentor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Show debug diagnostics and unchanged files
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to mentor.config.json in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply fixes and notes, rewriting changed files
    Fix(FixArgs),

    /// Report files that would change, without writing
    Check(CheckArgs),

    /// Print the parsed tree of a file as JSON
    Ast(AstArgs),
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd, cli.config.as_deref())?;

    match cli.command {
        Command::Fix(args) => fix(args, &config, cli.verbose),
        Command::Check(args) => check(args, &config, cli.verbose),
        Command::Ast(args) => ast(args),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
