//! Configuration loading and validation for Rekkari.
//!
//! Loads configuration from a TOML file (default `rekkari.toml` in the
//! working directory) with environment variable overrides for the values
//! that differ between deployments: port, completion-service credential,
//! and allowed origins.

use rekkari_core::PlateShape;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Completion-service settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Vehicle lookup settings
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Session store settings
    #[serde(default)]
    pub session: SessionConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("gateway", &self.gateway)
            .field("provider", &self.provider)
            .field("lookup", &self.lookup)
            .field("session", &self.session)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by the CORS layer. Empty list means same-origin only.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for the completion service. Overridable via
    /// `REKKARI_API_KEY` / `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_provider_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    500
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_provider_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Base URL of the third-party lookup site.
    #[serde(default = "default_lookup_url")]
    pub base_url: String,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// Bounded wait for network idleness after navigation.
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Fixed settle window after triggering the search.
    #[serde(default = "default_settle")]
    pub settle_secs: u64,

    /// Shorter confirmation window after the settle window.
    #[serde(default = "default_confirm")]
    pub confirm_secs: u64,

    /// Expected plate shape for the registration normalizer.
    #[serde(default)]
    pub plate_shape: PlateShape,
}

fn default_lookup_url() -> String {
    "https://kolariautot.com".into()
}
fn default_navigation_timeout() -> u64 {
    30
}
fn default_settle() -> u64 {
    10
}
fn default_confirm() -> u64 {
    3
}
fn default_true() -> bool {
    true
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_lookup_url(),
            headless: true,
            navigation_timeout_secs: default_navigation_timeout(),
            settle_secs: default_settle(),
            confirm_secs: default_confirm(),
            plate_shape: PlateShape::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sessions older than this are removed by the opportunistic sweep.
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// How many recent messages the context assembler sends to the model.
    #[serde(default = "default_window")]
    pub message_window: usize,
}

fn default_ttl() -> u64 {
    3600
}
fn default_window() -> usize {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            message_window: default_window(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> rekkari_core::Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                rekkari_core::Error::Config {
                    message: format!("cannot read {}: {e}", path.display()),
                }
            })?;
            toml::from_str(&raw).map_err(|e| rekkari_core::Error::Config {
                message: format!("invalid TOML in {}: {e}", path.display()),
            })?
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse()
        {
            self.gateway.port = port;
        }
        if let Ok(key) = std::env::var("REKKARI_API_KEY") {
            self.provider.api_key = Some(key);
        } else if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.provider.api_key = Some(key);
        }
        if let Ok(origins) = std::env::var("REKKARI_ALLOWED_ORIGINS") {
            self.gateway.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(url) = std::env::var("REKKARI_LOOKUP_URL") {
            self.lookup.base_url = url;
        }
    }

    fn validate(&self) -> rekkari_core::Result<()> {
        if self.session.message_window == 0 {
            return Err(rekkari_core::Error::Config {
                message: "session.message_window must be at least 1".into(),
            });
        }
        if self.lookup.base_url.is_empty() {
            return Err(rekkari_core::Error::Config {
                message: "lookup.base_url must not be empty".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.session.ttl_secs, 3600);
        assert_eq!(config.session.message_window, 10);
        assert_eq!(config.lookup.navigation_timeout_secs, 30);
        assert_eq!(config.lookup.settle_secs, 10);
        assert_eq!(config.lookup.confirm_secs, 3);
        assert!(config.lookup.base_url.contains("kolariautot"));
    }

    #[test]
    fn loads_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[gateway]\nport = 8080\n\n[lookup]\nsettle_secs = 2"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.lookup.settle_secs, 2);
        // Untouched sections keep defaults
        assert_eq!(config.session.ttl_secs, 3600);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load("/nonexistent/rekkari.toml").unwrap();
        assert_eq!(config.gateway.port, 5000);
    }

    #[test]
    fn rejects_zero_message_window() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session]\nmessage_window = 0").unwrap();
        assert!(AppConfig::load(file.path()).is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("sk-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
