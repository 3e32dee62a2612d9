use super::{discover, print_reports, process_files, OutputFormat};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mentor_editor::{Dispatcher, TracingSink};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// File or directory to check (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Language id to use instead of inferring it from file names
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Report files that `fix` would change, exiting with status 1 if there are any
pub fn check(args: CheckArgs, config: &Config, verbose: bool) -> Result<()> {
    let files = discover(&args.path, args.language.as_deref(), config)?;
    let dispatcher = Dispatcher::new(&config.rules, Arc::new(TracingSink));

    let reports = process_files(&dispatcher, files, false)?;
    print_reports(&reports, args.format, verbose)?;

    let changed = reports.iter().filter(|report| report.changed).count();
    if args.format == OutputFormat::Text {
        println!();
        if changed == 0 {
            println!("{} {} files checked", "✓".green(), reports.len());
        } else {
            println!(
                "{} {} of {} files would change",
                "✗".red(),
                changed,
                reports.len()
            );
        }
    }

    if changed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
