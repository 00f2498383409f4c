use crate::core::cache::{DEFAULT_FETCH_TIMEOUT, DEFAULT_TTL};
use crate::core::currency::{CurrencyCode, CurrencyInfo, CurrencyRegistry};
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Bundled configuration, used when no config file exists yet.
pub const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

pub const DEFAULT_RATES_URL: &str = "https://open.er-api.com/v6/latest/RUB";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CurrencyEntry {
    pub code: CurrencyCode,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            url: DEFAULT_RATES_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_secs()
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_separators() -> Vec<String> {
    vec!["в".to_string(), "to".to_string(), "in".to_string()]
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Supported currencies, in display order
    pub currencies: Vec<CurrencyEntry>,
    #[serde(default)]
    pub main_currencies: Vec<CurrencyCode>,
    #[serde(default)]
    pub shortcuts: BTreeMap<String, CurrencyCode>,
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Loads the config from the default location, or the bundled one if none exists.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using bundled defaults",
                config_path.display()
            );
            return Self::default_config();
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "kursbot", "kursbot")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config = Self::from_yaml(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Result<Self> {
        Self::from_yaml(EXAMPLE_CONFIG).context("Bundled config is invalid")
    }

    pub fn validate(&self) -> Result<()> {
        if self.currencies.is_empty() {
            bail!("At least one currency must be configured");
        }

        let mut seen = HashSet::new();
        for entry in &self.currencies {
            if !seen.insert(entry.code) {
                bail!("Currency {} is listed more than once", entry.code);
            }
            if entry.name.trim().is_empty() {
                bail!("Currency {} has an empty name", entry.code);
            }
        }
        if !seen.contains(&CurrencyCode::RUB) {
            bail!("The pivot currency {} must be configured", CurrencyCode::RUB);
        }

        if let Some(code) = self.main_currencies.iter().find(|c| !seen.contains(*c)) {
            bail!("Main currency {code} is not a configured currency");
        }
        if let Some((alias, code)) = self.shortcuts.iter().find(|(_, c)| !seen.contains(*c)) {
            bail!("Shortcut '{alias}' points to unconfigured currency {code}");
        }
        if self.separators.iter().any(|s| s.trim().is_empty()) {
            bail!("Separator words must not be empty");
        }
        if self.provider.timeout_secs == 0 {
            bail!("provider.timeout_secs must be positive");
        }
        if self.cache.ttl_secs == 0 {
            bail!("cache.ttl_secs must be positive");
        }
        Ok(())
    }

    pub fn registry(&self) -> CurrencyRegistry {
        CurrencyRegistry::new(
            self.currencies
                .iter()
                .map(|entry| CurrencyInfo {
                    code: entry.code,
                    name: entry.name.clone(),
                })
                .collect(),
            self.main_currencies.clone(),
            self.shortcuts.iter().map(|(alias, code)| (alias, *code)),
        )
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }
}
