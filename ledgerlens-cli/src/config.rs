//! TOML configuration for the `ledgerlens` binary.
//!
//! Loaded once per invocation and passed into the pipeline; nothing reads
//! it again afterwards. Command-line flags override the file, the file
//! overrides the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "ledgerlens.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataSection,
    pub llm: LlmSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSection {
    /// Ledger CSV export.
    pub path: PathBuf,
    /// Directory the report and its chart fragments are written into.
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the config file.
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataSection {
                path: PathBuf::from("data/cost_data.csv"),
                out_dir: PathBuf::from("."),
            },
            llm: LlmSection {
                base_url: "https://ark.cn-beijing.volces.com/api/v3".to_string(),
                model: "doubao-1-5-pro-32k-character-250715".to_string(),
                api_key_env: "LEDGERLENS_API_KEY".to_string(),
                temperature: 0.7,
                max_tokens: 2048,
            },
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    let s = toml::to_string_pretty(&Config::default()).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
