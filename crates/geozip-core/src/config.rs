use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_archive_suffix() -> String {
    ".zip".to_string()
}

fn default_readme_name() -> String {
    "readme.txt".to_string()
}

fn default_max_concurrent() -> usize {
    4
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    3600
}

/// Global configuration loaded from `~/.config/geozip/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeozipConfig {
    /// Base URL of the remote directory listing.
    pub source_url: String,
    /// Local directory the archives are downloaded into and extracted under.
    pub output_dir: PathBuf,
    /// Case-sensitive filename tail an anchor text must have to be downloaded.
    #[serde(default = "default_archive_suffix")]
    pub archive_suffix: String,
    /// Auxiliary resource fetched best-effort from the same base URL.
    #[serde(default = "default_readme_name")]
    pub readme_name: String,
    /// Maximum number of download+extract workers in flight at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Connect timeout per request, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Overall timeout per request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GeozipConfig {
    fn default() -> Self {
        Self {
            source_url: "https://download.geonames.org/export/zip/".to_string(),
            output_dir: PathBuf::from("postal-codes"),
            archive_suffix: default_archive_suffix(),
            readme_name: default_readme_name(),
            max_concurrent: default_max_concurrent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("geozip")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GeozipConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GeozipConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GeozipConfig = toml::from_str(&data)?;
    Ok(cfg)
}
