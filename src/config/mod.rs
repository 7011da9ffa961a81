use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Root of the remote service, without the `/api` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// File holding the persisted credential, user id and role
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

/// Per-user config directory, e.g. `~/.config/taskboard/session.json`.
/// Without a home directory the session is kept next to the working directory.
fn default_session_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "taskboard").map_or_else(
        || PathBuf::from(".taskboard").join(SESSION_FILENAME),
        |dirs| dirs.config_dir().join(SESSION_FILENAME),
    )
}

const SESSION_FILENAME: &str = "session.json";

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(content).with_context(|| "Failed to parse configuration file")?;
        config.api.base_url = normalize_base_url(&config.api.base_url);
        Ok(config)
    }

    /// Apply command-line and environment overrides on top of the file values
    pub fn with_overrides(
        mut self,
        api_url: Option<&str>,
        session_file: Option<&Path>,
        log_level: Option<&str>,
    ) -> Self {
        if let Some(url) = api_url {
            self.api.base_url = normalize_base_url(url);
        }
        if let Some(path) = session_file {
            self.session.path = path.to_path_buf();
        }
        if let Some(level) = log_level {
            self.logging.level = level.to_string();
        }
        self
    }

    /// Non-fatal problems worth pointing out to the user
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let url = self.api.base_url.as_str();

        if url.starts_with("http://") && !is_local(url) {
            warnings.push(format!(
                "API base URL {} uses plain HTTP - credentials will be sent unencrypted",
                url
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            warnings.push(format!("API base URL {} has no http(s) scheme", url));
        }
        if url.ends_with("/api") {
            warnings.push(
                "API base URL should not include the /api suffix; it is added per request"
                    .to_string(),
            );
        }

        warnings
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn is_local(url: &str) -> bool {
    let host = url
        .trim_start_matches("http://")
        .split(['/', ':'])
        .next()
        .unwrap_or_default();
    matches!(host, "localhost" | "127.0.0.1")
}
