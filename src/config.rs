use crate::error::{ProxyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com/v1/responses";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub mode: ProxyMode,
    /// Largest request body accepted on the proxy routes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Whether requests are inspected and translated, or always forwarded as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyMode {
    #[default]
    Translate,
    Passthrough,
}

impl ProxyMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Passthrough => "passthrough",
        }
    }
}

impl fmt::Display for ProxyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProxyMode {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "translate" => Ok(Self::Translate),
            "passthrough" => Ok(Self::Passthrough),
            other => Err(ProxyError::config(format!(
                "Unknown mode '{}'. Expected 'translate' or 'passthrough'",
                other
            ))),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            mode: ProxyMode::default(),
            max_body_bytes: default_max_body_bytes(),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Load config from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProxyError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Search standard locations for a config file.
    /// Priority: CLI arg > CWD > XDG config > home dir > built-in defaults
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        for candidate in &config_search_paths() {
            if candidate.exists() {
                tracing::info!(path = %candidate.display(), "Loading config");
                return Self::load(candidate);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Resolve the upstream credential from the configured environment variable.
    /// Called once at startup; the value is handed to the upstream client.
    pub fn resolve_api_key(&self) -> Result<String> {
        match std::env::var(&self.upstream.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ProxyError::config(format!(
                "Environment variable '{}' not set. Set it with your OpenAI API key.",
                self.upstream.api_key_env
            ))),
        }
    }
}

pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("responses-bridge.toml")];

    if cfg!(target_os = "macos") {
        if let Some(home) = home_dir() {
            paths.push(
                home.join("Library")
                    .join("Application Support")
                    .join("responses-bridge")
                    .join("config.toml"),
            );
        }
    } else {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("responses-bridge").join("config.toml"));
        }
        if let Some(home) = home_dir() {
            paths.push(home.join(".config").join("responses-bridge").join("config.toml"));
        }
    }

    if let Some(home) = home_dir() {
        paths.push(home.join(".responses-bridge.toml"));
    }

    paths
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
port = 5000
mode = "passthrough"
max_body_bytes = 1024

[upstream]
url = "http://localhost:9999/v1/responses"
api_key_env = "BRIDGE_TEST_KEY"
"#
        )
        .unwrap();

        let config = ProxyConfig::load(f.path()).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.mode, ProxyMode::Passthrough);
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.upstream.url, "http://localhost:9999/v1/responses");
        assert_eq!(config.upstream.api_key_env, "BRIDGE_TEST_KEY");
        assert_eq!(config.upstream.timeout_secs, 300);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let f = NamedTempFile::new().unwrap();
        let config = ProxyConfig::load(f.path()).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.mode, ProxyMode::Translate);
        assert_eq!(config.max_body_bytes, 2 * 1024 * 1024);
        assert_eq!(config.upstream.url, DEFAULT_UPSTREAM_URL);
        assert_eq!(config.upstream.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, r#"mode = "router""#).unwrap();
        assert!(matches!(
            ProxyConfig::load(f.path()),
            Err(ProxyError::Toml(_))
        ));
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let err = ProxyConfig::find_and_load(Some(Path::new("/nonexistent/bridge.toml")))
            .unwrap_err();
        assert!(matches!(err, ProxyError::Config { .. }));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Translate".parse::<ProxyMode>().unwrap(), ProxyMode::Translate);
        assert_eq!("passthrough".parse::<ProxyMode>().unwrap(), ProxyMode::Passthrough);
        assert!("other".parse::<ProxyMode>().is_err());
    }

    #[test]
    fn test_resolve_api_key() {
        let mut config = ProxyConfig::default();
        config.upstream.api_key_env = "RESPONSES_BRIDGE_TEST_KEY_PRESENT".to_string();
        std::env::set_var("RESPONSES_BRIDGE_TEST_KEY_PRESENT", "sk-test");
        assert_eq!(config.resolve_api_key().unwrap(), "sk-test");

        config.upstream.api_key_env = "RESPONSES_BRIDGE_TEST_KEY_ABSENT".to_string();
        assert!(matches!(
            config.resolve_api_key(),
            Err(ProxyError::Config { .. })
        ));
    }
}
