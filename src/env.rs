use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://study.db";
pub const DEFAULT_UPLOAD_DIR: &str = "static/uploads";
pub const DEFAULT_ICON_UPLOAD_LIMIT_MIB: u64 = 5;

pub fn load_environment() -> Result<(), Box<dyn std::error::Error>> {
    let is_production =
        dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string()) == "production";

    let env_files = if is_production {
        vec!["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        vec!["config/common.env", "config/dev.env", ".secrets.env"]
    };

    for env_file in env_files {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        warn!("Warning: Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)?;
    info!("Loaded environment from: {}", path);
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub icon_upload_limit_mib: u64,
    pub otlp_endpoint: Option<String>,
    pub honeycomb_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            icon_upload_limit_mib: DEFAULT_ICON_UPLOAD_LIMIT_MIB,
            otlp_endpoint: None,
            honeycomb_api_key: None,
        }
    }
}

impl AppConfig {
    /// Reads the process environment, after [`load_environment`] has merged
    /// the env files into it. Unset or blank variables fall back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let icon_upload_limit_mib = match non_empty_var("ICON_UPLOAD_LIMIT_MIB") {
            Some(raw) => raw.parse::<u64>().with_context(|| {
                format!("ICON_UPLOAD_LIMIT_MIB must be a whole number, got {raw:?}")
            })?,
            None => defaults.icon_upload_limit_mib,
        };
        if icon_upload_limit_mib == 0 {
            anyhow::bail!("ICON_UPLOAD_LIMIT_MIB must be greater than zero");
        }

        Ok(Self {
            database_url: non_empty_var("DATABASE_URL").unwrap_or(defaults.database_url),
            upload_dir: non_empty_var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            icon_upload_limit_mib,
            otlp_endpoint: non_empty_var("OTEL_EXPORTER_OTLP_ENDPOINT"),
            honeycomb_api_key: non_empty_var("HONEYCOMB_API_KEY"),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
