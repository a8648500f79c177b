use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for tpl (~/.config/tpl/config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub visibility: VisibilityConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub context: ContextConfig,
}

/// Where the remote template catalog lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_search_path")]
    pub search_path: String,

    #[serde(default = "default_pages_path")]
    pub pages_path: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Which designs must never be offered
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisibilityConfig {
    #[serde(default)]
    pub hide_premium_templates: bool,

    /// Feature flags (e.g. "ecommerce") that hide a design when set
    #[serde(default)]
    pub hide_features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_min_results")]
    pub min_results_before_top_up: usize,
}

/// Business details sent along with every catalog query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default)]
    pub business_name: String,

    #[serde(default = "default_business_type")]
    pub business_type: String,

    /// Suggested keywords, used when no keyword is typed
    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default = "default_page_builder")]
    pub page_builder: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_path: default_search_path(),
            pages_path: default_pages_path(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            min_results_before_top_up: default_min_results(),
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            business_name: String::new(),
            business_type: default_business_type(),
            keywords: Vec::new(),
            page_builder: default_page_builder(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_search_path() -> String {
    "templates".to_string()
}

fn default_pages_path() -> String {
    "all-templates".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("tpl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_page_size() -> u32 {
    9
}

fn default_min_results() -> usize {
    4
}

fn default_business_type() -> String {
    "others".to_string()
}

fn default_page_builder() -> String {
    "spectra".to_string()
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::from_path(&path)
        } else {
            // Create default config file
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write config file: {}", path.display()))?;
            Ok(config)
        }
    }

    /// Load and validate config from an explicit path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.page_size == 0 {
            bail!("search.page_size must be > 0");
        }

        let url = &self.catalog.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("catalog.base_url must start with http:// or https://: {}", url);
        }

        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "tpl", "tpl") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.tpl/config.toml")
        }
    }
}
