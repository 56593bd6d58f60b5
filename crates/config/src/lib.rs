//! Configuration loading, validation, and management for Locas.
//!
//! Loads configuration from `~/.locas/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Placeholder key shipped in sample env files; treated as "no key".
pub const PLACEHOLDER_API_KEY: &str = "your_api_key";

/// The root configuration structure.
///
/// Maps directly to `~/.locas/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat-completion provider settings
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Google Maps platform settings (places, air quality, pollen, geocoding)
    #[serde(default)]
    pub maps: MapsConfig,

    /// Open geocoder settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Session persistence
    #[serde(default)]
    pub session: SessionConfig,

    /// HTTP gateway
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Outbound HTTP client
    #[serde(default)]
    pub http: HttpConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Provider name, used in logs and `doctor` output
    #[serde(default = "default_provider")]
    pub provider: String,

    /// OpenAI-compatible base URL (without `/chat/completions`)
    #[serde(default = "default_completion_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens for summaries and tool-loop turns
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Max tokens for land / business analyses
    #[serde(default = "default_analysis_max_tokens")]
    pub analysis_max_tokens: u32,

    /// Round-trip budget for the tool-calling loop
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_completion_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_analysis_max_tokens() -> u32 {
    1500
}
fn default_max_turns() -> usize {
    5
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_completion_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            analysis_max_tokens: default_analysis_max_tokens(),
            max_turns: default_max_turns(),
        }
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("analysis_max_tokens", &self.analysis_max_tokens)
            .field("max_turns", &self.max_turns)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Search radius in meters when a request doesn't give one
    #[serde(default = "default_radius")]
    pub default_radius: u32,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_places_url")]
    pub places_url: String,

    #[serde(default = "default_air_quality_url")]
    pub air_quality_url: String,

    #[serde(default = "default_pollen_url")]
    pub pollen_url: String,

    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,

    /// Days of pollen forecast to request
    #[serde(default = "default_pollen_days")]
    pub pollen_days: u8,
}

fn default_radius() -> u32 {
    1500
}
fn default_language() -> String {
    "en".into()
}
fn default_places_url() -> String {
    "https://maps.googleapis.com/maps/api/place/nearbysearch/json".into()
}
fn default_air_quality_url() -> String {
    "https://airquality.googleapis.com/v1/currentConditions:lookup".into()
}
fn default_pollen_url() -> String {
    "https://pollen.googleapis.com/v1/forecast:lookup".into()
}
fn default_geocode_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".into()
}
fn default_pollen_days() -> u8 {
    3
}

impl MapsConfig {
    /// A key is usable when present, non-blank and not the sample placeholder.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_radius: default_radius(),
            language: default_language(),
            places_url: default_places_url(),
            air_quality_url: default_air_quality_url(),
            pollen_url: default_pollen_url(),
            geocode_url: default_geocode_url(),
            pollen_days: default_pollen_days(),
        }
    }
}

impl std::fmt::Debug for MapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_radius", &self.default_radius)
            .field("language", &self.language)
            .field("places_url", &self.places_url)
            .field("air_quality_url", &self.air_quality_url)
            .field("pollen_url", &self.pollen_url)
            .field("geocode_url", &self.geocode_url)
            .field("pollen_days", &self.pollen_days)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// Nominatim's usage policy requires an identifying agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org/search".into()
}
fn default_user_agent() -> String {
    "location_assistant".into()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// Which `SessionStore` implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub backend: SessionBackend,

    /// Retention per session, refreshed on every write
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Directory for the file backend (defaults to `~/.locas/sessions`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn default_ttl_secs() -> u64 {
    86_400
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("sessions"))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::default(),
            ttl_secs: default_ttl_secs(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    5000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-call timeout for every outbound request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.locas/config.toml).
    ///
    /// Environment variables override the file:
    /// - `OPENAI_API_KEY`, `LOCAS_MODEL`
    /// - `GOOGLE_MAPS_API_KEY`, `DEFAULT_RADIUS`, `DEFAULT_LANGUAGE`
    /// - `PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup (highest priority).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.completion.api_key = Some(key);
        }
        if let Some(model) = lookup("LOCAS_MODEL") {
            self.completion.model = model;
        }
        if let Some(key) = lookup("GOOGLE_MAPS_API_KEY") {
            self.maps.api_key = Some(key);
        }
        if let Some(radius) = lookup("DEFAULT_RADIUS") {
            self.maps.default_radius = parse_env("DEFAULT_RADIUS", &radius)?;
        }
        if let Some(language) = lookup("DEFAULT_LANGUAGE") {
            self.maps.language = language;
        }
        if let Some(port) = lookup("PORT") {
            self.gateway.port = parse_env("PORT", &port)?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".locas")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ConfigError::ValidationError(
                "completion.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.completion.max_tokens == 0 || self.completion.analysis_max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "completion max token limits must be > 0".into(),
            ));
        }

        if self.completion.max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "completion.max_turns must be at least 1".into(),
            ));
        }

        // Nearby search caps radius at 50 km
        if self.maps.default_radius == 0 || self.maps.default_radius > 50_000 {
            return Err(ConfigError::ValidationError(
                "maps.default_radius must be between 1 and 50000 meters".into(),
            ));
        }

        if self.session.ttl_secs == 0 {
            return Err(ConfigError::ValidationError("session.ttl_secs must be > 0".into()));
        }

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::ValidationError("http.timeout_secs must be > 0".into()));
        }

        Ok(())
    }

    /// Check if a completion API key is available.
    pub fn has_completion_key(&self) -> bool {
        self.completion.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{name} has an invalid value: {value:?}")))
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.completion.model, "gpt-4o");
        assert_eq!(config.maps.default_radius, 1500);
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.session.ttl_secs, 86_400);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.geocoding.user_agent, "location_assistant");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.completion.model, config.completion.model);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.session.backend, SessionBackend::Memory);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.completion.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_radius_rejected() {
        let mut config = AppConfig::default();
        config.maps.default_radius = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        let config = result.unwrap();
        assert_eq!(config.completion.provider, "openai");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[session]\nbackend = \"file\"\nttl_secs = 60\n\n[maps]\nlanguage = \"fr\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.session.backend, SessionBackend::File);
        assert_eq!(config.session.ttl(), Duration::from_secs(60));
        assert_eq!(config.maps.language, "fr");
        assert_eq!(config.maps.default_radius, 1500);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gateway\nport = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("GOOGLE_MAPS_API_KEY", "maps-key"),
            ("LOCAS_MODEL", "gpt-4o-mini"),
            ("DEFAULT_RADIUS", "2500"),
            ("DEFAULT_LANGUAGE", "de"),
            ("PORT", "8080"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert!(config.has_completion_key());
        assert_eq!(config.maps.usable_api_key(), Some("maps-key"));
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.maps.default_radius, 2500);
        assert_eq!(config.maps.language, "de");
        assert_eq!(config.gateway.port, 8080);
    }

    #[test]
    fn bad_env_number_is_validation_error() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(|k| (k == "PORT").then(|| "not-a-port".to_string()));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn placeholder_maps_key_is_not_usable() {
        let mut maps = MapsConfig::default();
        assert_eq!(maps.usable_api_key(), None);
        maps.api_key = Some(PLACEHOLDER_API_KEY.into());
        assert_eq!(maps.usable_api_key(), None);
        maps.api_key = Some("   ".into());
        assert_eq!(maps.usable_api_key(), None);
        maps.api_key = Some("AIza-real".into());
        assert_eq!(maps.usable_api_key(), Some("AIza-real"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::default();
        config.completion.api_key = Some("sk-secret".into());
        config.maps.api_key = Some("maps-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("maps-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4o"));
        assert!(toml_str.contains("5000"));
    }
}
