use super::schema::BookrunnerConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid login_url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./bookrunner.yaml
    /// 2. ~/.bookrunner/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<BookrunnerConfig, ConfigError> {
        let local_config = PathBuf::from("./bookrunner.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".bookrunner").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(BookrunnerConfig::default())
    }

    /// An explicit path wins over the default locations.
    pub async fn load(path: Option<&Path>) -> Result<BookrunnerConfig, ConfigError> {
        match path {
            Some(path) => Self::load_from(path).await,
            None => Self::load_default().await,
        }
    }

    pub async fn load_from(path: &Path) -> Result<BookrunnerConfig, ConfigError> {
        debug!(path = %path.display(), "loading config");
        let content = tokio::fs::read_to_string(path).await?;
        let config: BookrunnerConfig = if content.trim().is_empty() {
            BookrunnerConfig::default()
        } else {
            serde_yaml::from_str(&content)?
        };
        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &BookrunnerConfig) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: config.site.login_url.clone(),
            reason,
        };
        let parsed = url::Url::parse(&config.site.login_url).map_err(|e| invalid(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" | "file" => Ok(()),
            other => Err(invalid(format!("unsupported scheme {}", other))),
        }
    }
}
