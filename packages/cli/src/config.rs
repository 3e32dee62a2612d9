use anyhow::{anyhow, Context};
use glob::Pattern;
use mentor_linter::RuleOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "mentor.config.json";

/// Mentor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Which rules get registered
    #[serde(flatten)]
    pub rules: RuleOptions,

    /// Glob patterns, relative to the processed directory, of files to skip
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_exclude() -> Vec<String> {
    vec!["node_modules/**".to_string(), "dist/**".to_string()]
}

impl Config {
    /// Load `explicit` if given, otherwise `mentor.config.json` in `cwd` when present
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => cwd.join(path),
            None => {
                let path = cwd.join(DEFAULT_CONFIG_NAME);
                if !path.exists() {
                    return Ok(Config::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Cannot read config file {}", config_path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid config file {}", config_path.display()))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.exclude_patterns()?;
        Ok(config)
    }

    pub fn exclude_patterns(&self) -> anyhow::Result<Vec<Pattern>> {
        self.exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern)
                    .map_err(|err| anyhow!("Invalid exclude pattern '{}': {}", pattern, err))
            })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: RuleOptions::default(),
            exclude: default_exclude(),
        }
    }
}
