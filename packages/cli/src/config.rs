use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "spark.config.json";

/// spark-gen configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing the templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_dir: Option<String>,

    /// Output directory, a leading `@` stands for the template directory
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Template file extension
    #[serde(default = "default_ext")]
    pub ext: String,

    /// Name of the generated module
    #[serde(default = "default_pkg")]
    pub pkg: String,

    /// Crate path of the component runtime
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Also write the parsed components as JSON
    #[serde(default = "default_write_ir")]
    pub write_ir: bool,
}

fn default_out_dir() -> String {
    "@/dist".to_string()
}

fn default_ext() -> String {
    "st".to_string()
}

fn default_pkg() -> String {
    "dist".to_string()
}

fn default_runtime() -> String {
    "spark".to_string()
}

fn default_write_ir() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Absolute path to the template directory, if one is configured
    pub fn get_src_dir(&self, cwd: &Path) -> Option<PathBuf> {
        self.src_dir.as_ref().map(|dir| cwd.join(dir))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: None,
            out_dir: default_out_dir(),
            ext: default_ext(),
            pkg: default_pkg(),
            runtime: default_runtime(),
            write_ir: default_write_ir(),
        }
    }
}

/// Resolve an output directory, replacing a leading `@` with `src_dir`
pub fn resolve_out_dir(out_dir: &str, src_dir: &Path, cwd: &Path) -> PathBuf {
    match out_dir.strip_prefix('@') {
        Some(rest) => src_dir.join(rest.trim_start_matches(['/', '\\'])),
        None => cwd.join(out_dir),
    }
}
