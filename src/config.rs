use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::invoices::InvoiceStatus;

pub const PROJECT_CONFIG_FILE: &str = ".freshlog.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub account_id: String,
    pub business_id: u64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub client_rates: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<String>,
    #[serde(default)]
    pub invoice_status: InvoiceStatus,
}

/// Per-directory defaults for time logging, read from `.freshlog.json` in
/// the working directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<u64>,
}

pub fn path() -> Result<PathBuf, Error> {
    let dir = dirs::config_dir()
        .ok_or_else(|| Error::Config("could not locate the user config directory".to_string()))?;
    Ok(dir.join("freshlog").join("config.json"))
}

pub fn load() -> Result<Config, Error> {
    load_from(&path()?)
}

pub fn save(config: &Config) -> Result<(), Error> {
    save_to(&path()?, config)
}

fn load_from(path: &Path) -> Result<Config, Error> {
    let contents = fs::read_to_string(path).map_err(|_| {
        Error::Config("config not found. Run `freshlog setup` to configure your token".to_string())
    })?;
    serde_json::from_str(&contents)
        .map_err(|err| Error::Config(format!("invalid config file: {err}")))
}

fn save_to(path: &Path, config: &Config) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(config)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

pub fn load_project_config(dir: &Path) -> Result<ProjectConfig, Error> {
    let path = dir.join(PROJECT_CONFIG_FILE);
    let contents = fs::read_to_string(&path)
        .map_err(|_| Error::Config(format!("no {PROJECT_CONFIG_FILE} found in {}", dir.display())))?;
    serde_json::from_str(&contents)
        .map_err(|err| Error::Config(format!("invalid {PROJECT_CONFIG_FILE}: {err}")))
}

pub fn load_project_config_from_cwd() -> Option<ProjectConfig> {
    let cwd = std::env::current_dir().ok()?;
    load_project_config(&cwd).ok()
}

pub fn save_project_config(dir: &Path, config: &ProjectConfig) -> Result<(), Error> {
    let mut json = serde_json::to_string_pretty(config)?;
    json.push('\n');
    fs::write(dir.join(PROJECT_CONFIG_FILE), json)?;
    Ok(())
}
