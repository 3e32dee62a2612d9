use super::{discover, print_reports, process_files, OutputFormat};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mentor_editor::{Dispatcher, TracingSink};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct FixArgs {
    /// File or directory to improve (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Language id to use instead of inferring it from file names
    #[arg(short, long)]
    pub language: Option<String>,

    /// Report changes without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn fix(args: FixArgs, config: &Config, verbose: bool) -> Result<()> {
    let files = discover(&args.path, args.language.as_deref(), config)?;
    let dispatcher = Dispatcher::new(&config.rules, Arc::new(TracingSink));

    let reports = process_files(&dispatcher, files, !args.dry_run)?;
    print_reports(&reports, args.format, verbose)?;

    if args.format == OutputFormat::Text {
        let changed = reports.iter().filter(|report| report.changed).count();
        let verb = if args.dry_run { "Would update" } else { "Updated" };
        println!();
        println!(
            "{} {} of {} files",
            verb.green().bold(),
            changed,
            reports.len()
        );
    }

    Ok(())
}
