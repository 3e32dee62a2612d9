use anyhow::{anyhow, Result};
use clap::Args;
use mentor_editor::Language;
use mentor_parser::format_error;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct AstArgs {
    /// File to parse
    pub file: PathBuf,

    /// Language id to use instead of inferring it from the file name
    #[arg(short, long)]
    pub language: Option<String>,
}

/// Print the parsed tree of a file as JSON
pub fn ast(args: AstArgs) -> Result<()> {
    let language = match args.language.as_deref() {
        Some(id) => {
            Language::from_id(id).ok_or_else(|| anyhow!("No processor for language '{}'", id))?
        }
        None => Language::from_path(&args.file).ok_or_else(|| {
            anyhow!(
                "Cannot infer the language of {}, pass --language",
                args.file.display()
            )
        })?,
    };

    let source = fs::read_to_string(&args.file)?;
    let tree = language.syntax().parse(&source).map_err(|e| {
        let file_name = args
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        anyhow!("\n{}", format_error(&source, file_name, &e))
    })?;

    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}
