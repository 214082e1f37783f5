use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detection: Detection,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub conversion: Conversion,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Detection {
    pub sample_lines: usize,
    pub max_sample_bytes: u64,
    pub min_confidence: f32,
    // Share of non-whitespace C0 bytes above which a sample is binary.
    pub max_control_ratio: f32,
}
impl Default for Detection {
    fn default() -> Self {
        Self {
            sample_lines: 100,
            max_sample_bytes: 64 * 1024,
            min_confidence: 0.5,
            max_control_ratio: 0.10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_input_file_bytes: u64,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_file_bytes: 100 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappablePolicy {
    #[default]
    Fail,
    Drop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Conversion {
    pub backup_suffix: String,
    pub unmappable: UnmappablePolicy,
    pub verify_backup: bool,
    pub read_buffer_bytes: usize,
}
impl Default for Conversion {
    fn default() -> Self {
        Self {
            backup_suffix: ".bak".into(),
            unmappable: UnmappablePolicy::Fail,
            verify_backup: true,
            read_buffer_bytes: 64 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "subrecode.log".into(),
        }
    }
}
