//! Product list configuration.
//!
//! The product list is a YAML document (or TOML, when the source ends in
//! `.toml`) read from a local path or fetched over HTTP:
//!
//! ```yaml
//! currency: "₹"          # optional
//! products:
//!   - name: Pixel 9
//!     flipkart_url: https://www.flipkart.com/...
//!     amazon_url: https://www.amazon.in/...
//!     target_price: 60000
//! ```

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::engine::comparator::DEFAULT_CURRENCY;
use crate::types::{Product, TrackerError};

/// Default product list location, relative to the working directory.
pub const DEFAULT_CONFIG: &str = "products.yaml";

/// Top-level product list document.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TrackerConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub products: Vec<Product>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Document syntax, picked from the source's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    fn detect(location: &str) -> Self {
        // Ignore any query string on remote sources.
        let path = location.split(['?', '#']).next().unwrap_or(location);
        if path.to_ascii_lowercase().ends_with(".toml") {
            ConfigFormat::Toml
        } else {
            ConfigFormat::Yaml
        }
    }
}

/// Where the product list lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Path(PathBuf),
    Url(String),
}

impl ConfigSource {
    /// Anything starting with `http://` or `https://` is remote.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            ConfigSource::Url(location.to_string())
        } else {
            ConfigSource::Path(PathBuf::from(location))
        }
    }

    pub fn format(&self) -> ConfigFormat {
        match self {
            ConfigSource::Path(p) => ConfigFormat::detect(&p.to_string_lossy()),
            ConfigSource::Url(u) => ConfigFormat::detect(u),
        }
    }

    /// Read and parse the product list.
    pub async fn load(&self, http: &Client) -> Result<TrackerConfig> {
        let contents = match self {
            ConfigSource::Path(path) => {
                info!(path = %path.display(), "Loading local config");
                read_local(path)?
            }
            ConfigSource::Url(url) => {
                info!(url = %url, "Fetching config from URL");
                fetch_remote(http, url).await?
            }
        };

        let config = TrackerConfig::parse(&contents, self.format())
            .with_context(|| format!("Failed to parse config from {self}"))?;
        config.validate()?;

        if config.products.is_empty() {
            warn!(source = %self, "Config lists no products");
        }
        info!(products = config.products.len(), "Config loaded");
        Ok(config)
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Path(p) => write!(f, "{}", p.display()),
            ConfigSource::Url(u) => write!(f, "{u}"),
        }
    }
}

fn read_local(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(TrackerError::Config(format!(
            "Local config file not found: {}",
            path.display()
        ))
        .into());
    }
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))
}

async fn fetch_remote(http: &Client, url: &str) -> Result<String> {
    let resp = http
        .get(url)
        .send()
        .await
        .with_context(|| format!("Config request failed: {url}"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        return Err(TrackerError::Config(format!(
            "Error fetching remote config. HTTP Status: {status}"
        ))
        .into());
    }

    resp.text()
        .await
        .with_context(|| format!("Failed to read config body from {url}"))
}

impl TrackerConfig {
    /// Parse a document in the given syntax.
    pub fn parse(contents: &str, format: ConfigFormat) -> Result<Self> {
        let config: TrackerConfig = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
            ConfigFormat::Toml => toml::from_str(contents)?,
        };
        Ok(config)
    }

    /// Reject entries the tracker can't act on.
    pub fn validate(&self) -> Result<()> {
        for (i, p) in self.products.iter().enumerate() {
            if p.name.trim().is_empty() {
                return Err(TrackerError::Config(format!("Product #{} has an empty name", i + 1)).into());
            }
            if p.target_price.is_sign_negative() {
                return Err(TrackerError::Config(format!(
                    "Product {:?} has a negative target price",
                    p.name
                ))
                .into());
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
