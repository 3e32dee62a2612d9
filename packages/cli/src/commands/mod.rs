pub mod ast;
pub mod check;
pub mod fix;

pub use ast::{ast, AstArgs};
pub use check::{check, CheckArgs};
pub use fix::{fix, FixArgs};

use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::ValueEnum;
use colored::Colorize;
use glob::Pattern;
use mentor_editor::{Dispatcher, Language, SaveAction, TransformResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// One processed file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: PathBuf,
    pub language: Language,
    pub changed: bool,
    #[serde(flatten)]
    pub result: TransformResult,
}

/// Files under `path` to process, paired with their language.
///
/// A file named directly is always processed. Inside a directory only files
/// with a known extension that no exclude pattern matches are taken.
pub fn discover(
    path: &Path,
    language: Option<&str>,
    config: &Config,
) -> Result<Vec<(PathBuf, Language)>> {
    let forced = language
        .map(|id| {
            Language::from_id(id).ok_or_else(|| anyhow!("No processor for language '{}'", id))
        })
        .transpose()?;

    if path.is_file() {
        let language = forced
            .or_else(|| Language::from_path(path))
            .ok_or_else(|| {
                anyhow!(
                    "Cannot infer the language of {}, pass --language",
                    path.display()
                )
            })?;
        return Ok(vec![(path.to_path_buf(), language)]);
    }

    if !path.is_dir() {
        return Err(anyhow!("Input path does not exist: {}", path.display()));
    }

    let excluded = config.exclude_patterns()?;
    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file = entry.path();
        if !file.is_file() {
            continue;
        }
        let relative = file.strip_prefix(path).unwrap_or(file);
        if is_excluded(relative, &excluded) {
            debug!(path = %relative.display(), "excluded");
            continue;
        }
        let detected = Language::from_path(file);
        if let Some(language) = detected.map(|detected| forced.unwrap_or(detected)) {
            files.push((file.to_path_buf(), language));
        }
    }

    Ok(files)
}

fn is_excluded(relative: &Path, patterns: &[Pattern]) -> bool {
    let normalized = relative.to_string_lossy().replace('\\', "/");
    patterns.iter().any(|pattern| pattern.matches(&normalized))
}

/// Run every discovered file through the dispatcher, writing changed files
/// back unless `write` is false
pub fn process_files(
    dispatcher: &Dispatcher,
    files: Vec<(PathBuf, Language)>,
    write: bool,
) -> Result<Vec<FileReport>> {
    let mut reports = Vec::with_capacity(files.len());

    for (path, language) in files {
        debug!(path = %path.display(), %language, "processing file");
        let original = fs::read_to_string(&path)?;
        let result = dispatcher.process(&original, language.id());
        let changed = match result.action(&original) {
            SaveAction::Replace { text, .. } => {
                if write {
                    fs::write(&path, text)?;
                }
                true
            }
            SaveAction::Unchanged | SaveAction::Unsupported => false,
        };
        reports.push(FileReport {
            path,
            language,
            changed,
            result,
        });
    }

    Ok(reports)
}

pub fn print_reports(reports: &[FileReport], format: OutputFormat, verbose: bool) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        if !report.changed {
            if verbose {
                println!("{} {}", "✓".green(), report.path.display());
            }
            continue;
        }

        println!("{} {}", "✎".yellow(), report.path.display().to_string().bold());
        for entry in &report.result.changes_log {
            println!("    {} {}", "•".dimmed(), entry);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn patterns() -> Vec<Pattern> {
        Config::default().exclude_patterns().unwrap()
    }

    #[test]
    fn test_default_excludes() {
        assert!(is_excluded(Path::new("node_modules/lib/index.js"), &patterns()));
        assert!(is_excluded(Path::new("dist/app.js"), &patterns()));
        assert!(!is_excluded(Path::new("src/app.js"), &patterns()));
    }

    #[test]
    fn test_discover_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("src/app.js"), "var a = 1;\n").unwrap();
        fs::write(root.join("src/app.module.ts"), "export class AppModule {}\n").unwrap();
        fs::write(root.join("src/notes.md"), "# notes\n").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "var b = 2;\n").unwrap();

        let files = discover(root, None, &Config::default()).unwrap();
        let found: Vec<(String, Language)> = files
            .iter()
            .map(|(path, language)| {
                let relative = path.strip_prefix(root).unwrap();
                (relative.to_string_lossy().replace('\\', "/"), *language)
            })
            .collect();

        assert_eq!(
            found,
            vec![
                ("src/app.js".to_string(), Language::JavaScript),
                ("src/app.module.ts".to_string(), Language::Angular),
            ]
        );
    }

    #[test]
    fn test_forced_language_must_exist() {
        let error = discover(Path::new("."), Some("cobol"), &Config::default()).unwrap_err();
        assert!(error.to_string().contains("cobol"));
    }

    #[test]
    fn test_process_files_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("index.js");
        fs::write(&file, "var a = 1;\n").unwrap();

        let reports = process_files(
            &Dispatcher::default(),
            vec![(file.clone(), Language::JavaScript)],
            false,
        )
        .unwrap();

        assert!(reports[0].changed);
        assert_eq!(reports[0].result.changes_log.len(), 1);
        assert_eq!(fs::read_to_string(&file).unwrap(), "var a = 1;\n");
    }
}
