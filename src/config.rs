use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::{Context, OptionExt, eyre};
use serde::{Deserialize, Serialize};

const DEFAULT_ODESLI_ENDPOINT: &str = "https://api.song.link/v1-alpha.1/links";
const DEFAULT_CATALOG_ENDPOINT: &str = "https://itunes.apple.com/search";
const DEFAULT_SETLISTFM_ENDPOINT: &str = "https://api.setlist.fm/rest/1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preferred storefront, ISO 3166 alpha-2.
    pub country: String,
    /// Language sent in `Accept-Language` to the aggregator.
    pub language: String,
    pub odesli: OdesliConfig,
    pub scrape: ScrapeConfig,
    pub catalog: CatalogConfig,
    pub setlistfm: SetlistFmConfig,
    pub sessions: SessionsConfig,
    pub setlist: SetlistConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OdesliConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: String,
    pub requests_per_minute: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub timeout: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub endpoint: String,
    pub timeout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SetlistFmConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub track_capacity: usize,
    pub setlist_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SetlistConfig {
    pub max_concurrency: usize,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            country: "CL".to_string(),
            language: "es".to_string(),
            odesli: OdesliConfig::default(),
            scrape: ScrapeConfig::default(),
            catalog: CatalogConfig::default(),
            setlistfm: SetlistFmConfig::default(),
            sessions: SessionsConfig::default(),
            setlist: SetlistConfig::default(),
        }
    }
}

impl Default for OdesliConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ODESLI_ENDPOINT.to_string(),
            api_key: None,
            timeout: "12s".to_string(),
            requests_per_minute: 60,
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout: "12s".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CATALOG_ENDPOINT.to_string(),
            timeout: "10s".to_string(),
        }
    }
}

impl Default for SetlistFmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SETLISTFM_ENDPOINT.to_string(),
            api_key: None,
            timeout: "15s".to_string(),
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            track_capacity: 300,
            setlist_capacity: 120,
        }
    }
}

impl Default for SetlistConfig {
    fn default() -> Self {
        Self {
            max_concurrency: crate::services::fanout::DEFAULT_MAX_CONCURRENCY,
            page_size: 5,
        }
    }
}

fn parse_timeout(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value)
        .wrap_err_with(|| format!("Invalid duration for {field}: {value:?}"))
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("songlink-relay").join("config.toml"))
    }

    /// Load the default config file, falling back to built-in defaults when
    /// it does not exist.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config to the default path, if nothing is there yet.
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_eyre("No config directory on this platform")?;
        if path.exists() {
            tracing::info!(path = %path.display(), "Config already exists, leaving it untouched");
            return Ok(path);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents =
            toml::to_string_pretty(&Self::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(path)
    }

    /// Check everything that can be wrong without touching the network.
    pub fn validate(&self) -> Result<()> {
        if self.country.chars().count() != 2 || !self.country.chars().all(char::is_alphabetic) {
            return Err(eyre!(
                "country must be a two-letter code, got {:?}",
                self.country
            ));
        }
        self.odesli_timeout()?;
        self.scrape_timeout()?;
        self.catalog_timeout()?;
        self.setlistfm_timeout()?;
        Ok(())
    }

    /// Country code in the upper-case form the aggregator expects.
    pub fn country_code(&self) -> String {
        self.country.to_uppercase()
    }

    pub fn odesli_timeout(&self) -> Result<Duration> {
        parse_timeout("odesli.timeout", &self.odesli.timeout)
    }

    pub fn scrape_timeout(&self) -> Result<Duration> {
        parse_timeout("scrape.timeout", &self.scrape.timeout)
    }

    pub fn catalog_timeout(&self) -> Result<Duration> {
        parse_timeout("catalog.timeout", &self.catalog.timeout)
    }

    pub fn setlistfm_timeout(&self) -> Result<Duration> {
        parse_timeout("setlistfm.timeout", &self.setlistfm.timeout)
    }

    /// setlist.fm key from the config file, or `SETLISTFM_API_KEY` as fallback.
    pub fn setlistfm_api_key(&self) -> Option<String> {
        self.setlistfm
            .api_key
            .clone()
            .or_else(|| std::env::var("SETLISTFM_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}
