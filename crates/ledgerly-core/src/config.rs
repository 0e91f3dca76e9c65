//! Application configuration
//!
//! Resolution order, later layers winning:
//! 1. Built-in defaults
//! 2. TOML file (explicit path, else `~/.config/ledgerly/config.toml` if present)
//! 3. Environment variables
//! 4. CLI flags (applied by the caller)
//!
//! ```toml
//! default_user_id = 1
//!
//! [storage]
//! backend = "sqlite"
//! path = "/var/lib/ledgerly/ledgerly.db"
//!
//! [ai]
//! backend = "ollama"
//! host = "http://localhost:11434"
//! model = "llama3.2"
//!
//! [renderer]
//! backend = "http"
//! url = "http://localhost:8090/render"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::UserId;

pub const DEFAULT_USER_ID: UserId = 1;
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Where transactions, insights and reports live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process-local; gone on exit
    Memory,
    Sqlite { path: PathBuf },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: default_db_path(),
        }
    }
}

impl StorageConfig {
    pub fn describe(&self) -> String {
        match self {
            Self::Memory => "memory".to_string(),
            Self::Sqlite { path } => format!("sqlite ({})", path.display()),
        }
    }
}

/// LLM backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AiBackendKind {
    /// Insight and report generation disabled
    None,
    #[default]
    Ollama,
    OpenaiCompatible,
    Mock,
}

impl AiBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ollama => "ollama",
            Self::OpenaiCompatible => "openai_compatible",
            Self::Mock => "mock",
        }
    }
}

impl std::str::FromStr for AiBackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" | "disabled" => Ok(Self::None),
            "ollama" => Ok(Self::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                Ok(Self::OpenaiCompatible)
            }
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown AI backend: {}", s)),
        }
    }
}

impl std::fmt::Display for AiBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub backend: AiBackendKind,
    /// Base URL of the LLM server; the backend is unavailable without it
    pub host: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Directory of prompt overrides; defaults to the platform data dir
    pub prompts_dir: Option<PathBuf>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: AiBackendKind::default(),
            host: None,
            model: None,
            api_key: None,
            timeout_secs: 60,
            prompts_dir: None,
        }
    }
}

impl AiConfig {
    /// Configured model, or the usual default for the backend
    pub fn model_or_default(&self) -> String {
        self.model.clone().unwrap_or_else(|| match self.backend {
            AiBackendKind::OpenaiCompatible => DEFAULT_OPENAI_MODEL.to_string(),
            _ => DEFAULT_OLLAMA_MODEL.to_string(),
        })
    }
}

/// Document renderer selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    None,
    #[default]
    Http,
    Mock,
}

impl RendererKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Http => "http",
            Self::Mock => "mock",
        }
    }
}

impl std::str::FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" | "disabled" => Ok(Self::None),
            "http" => Ok(Self::Http),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown renderer: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub backend: RendererKind,
    /// Endpoint accepting a JSON document and answering with PDF bytes
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: RendererKind::default(),
            url: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Extra CORS origins; same-origin only when empty
    pub allowed_origins: Vec<String>,
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            allowed_origins: Vec::new(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub ai: AiConfig,
    pub renderer: RendererConfig,
    pub server: ServerSettings,
    /// User assumed when a request does not name one
    pub default_user_id: UserId,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            ai: AiConfig::default(),
            renderer: RendererConfig::default(),
            server: ServerSettings::default(),
            default_user_id: DEFAULT_USER_ID,
        }
    }
}

/// `~/.local/share/ledgerly/ledgerly.db` on Linux
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ledgerly").join("ledgerly.db"))
        .unwrap_or_else(|| PathBuf::from("ledgerly.db"))
}

/// `~/.config/ledgerly/config.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ledgerly").join("config.toml"))
}

impl AppConfig {
    /// Load from file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load from file and an arbitrary environment lookup
    pub fn load_with<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::default(),
            },
        };

        config.apply_env(env)?;
        debug!(
            storage = %config.storage.describe(),
            ai = %config.ai.backend,
            renderer = config.renderer.backend.as_str(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))
    }

    /// Apply environment overrides
    pub fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get("LEDGERLY_DB") {
            self.storage = StorageConfig::Sqlite {
                path: PathBuf::from(path),
            };
        }
        if let Some(storage) = get("LEDGERLY_STORAGE") {
            match storage.to_lowercase().as_str() {
                "memory" => self.storage = StorageConfig::Memory,
                "sqlite" => {
                    if self.storage == StorageConfig::Memory {
                        self.storage = StorageConfig::default();
                    }
                }
                other => {
                    return Err(Error::Config(format!(
                        "LEDGERLY_STORAGE must be memory or sqlite, got {}",
                        other
                    )))
                }
            }
        }

        if let Some(user) = get("LEDGERLY_DEFAULT_USER") {
            self.default_user_id = user.trim().parse().map_err(|_| {
                Error::Config(format!("LEDGERLY_DEFAULT_USER is not a number: {}", user))
            })?;
        }

        if let Some(backend) = get("AI_BACKEND") {
            self.ai.backend = backend.parse().map_err(Error::Config)?;
        }
        let (host_var, model_var) = match self.ai.backend {
            AiBackendKind::OpenaiCompatible => ("OPENAI_COMPATIBLE_HOST", "OPENAI_COMPATIBLE_MODEL"),
            _ => ("OLLAMA_HOST", "OLLAMA_MODEL"),
        };
        if let Some(host) = get(host_var) {
            self.ai.host = Some(host);
        }
        if let Some(model) = get(model_var) {
            self.ai.model = Some(model);
        }
        if let Some(key) = get("OPENAI_COMPATIBLE_API_KEY") {
            self.ai.api_key = Some(key);
        }
        if let Some(secs) = get("LEDGERLY_AI_TIMEOUT_SECS") {
            self.ai.timeout_secs = parse_secs("LEDGERLY_AI_TIMEOUT_SECS", &secs)?;
        }
        if let Some(dir) = get("LEDGERLY_PROMPTS_DIR") {
            self.ai.prompts_dir = Some(PathBuf::from(dir));
        }

        if let Some(renderer) = get("LEDGERLY_RENDERER") {
            self.renderer.backend = renderer.parse().map_err(Error::Config)?;
        }
        if let Some(url) = get("LEDGERLY_RENDERER_URL") {
            self.renderer.url = Some(url);
        }
        if let Some(secs) = get("LEDGERLY_RENDERER_TIMEOUT_SECS") {
            self.renderer.timeout_secs = parse_secs("LEDGERLY_RENDERER_TIMEOUT_SECS", &secs)?;
        }

        if let Some(origins) = get("LEDGERLY_ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        Ok(())
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(Error::Config(format!(
            "{} must be a positive number of seconds, got {}",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.default_user_id, 1);
        assert_eq!(config.ai.backend, AiBackendKind::Ollama);
        assert_eq!(config.ai.timeout_secs, 60);
        assert!(config.ai.host.is_none());
        assert_eq!(config.renderer.timeout_secs, 30);
        assert!(matches!(config.storage, StorageConfig::Sqlite { .. }));
    }

    #[test]
    fn test_parse_toml_file() {
        let config = AppConfig::from_toml_str(
            r#"
            default_user_id = 42

            [storage]
            backend = "memory"

            [ai]
            backend = "openai_compatible"
            host = "http://localhost:8000"

            [renderer]
            backend = "mock"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_user_id, 42);
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.ai.backend, AiBackendKind::OpenaiCompatible);
        assert_eq!(config.ai.model_or_default(), "gpt-4o");
        assert_eq!(config.ai.timeout_secs, 60);
        assert_eq!(config.renderer.backend, RendererKind::Mock);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_parse_sqlite_storage() {
        let config = AppConfig::from_toml_str(
            "[storage]\nbackend = \"sqlite\"\npath = \"/tmp/ledgerly-test.db\"\n",
        )
        .unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite {
                path: PathBuf::from("/tmp/ledgerly-test.db")
            }
        );
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("[ai]\nbackend = \"skynet\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("LEDGERLY_STORAGE", "memory"),
                ("LEDGERLY_DEFAULT_USER", "7"),
                ("AI_BACKEND", "vllm"),
                ("OPENAI_COMPATIBLE_HOST", "http://gpu:8000"),
                ("OPENAI_COMPATIBLE_MODEL", "qwen2.5"),
                ("OPENAI_COMPATIBLE_API_KEY", "sk-test"),
                ("OLLAMA_HOST", "http://ignored:11434"),
                ("LEDGERLY_RENDERER_URL", "http://pdf:8090/render"),
                ("LEDGERLY_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ]))
            .unwrap();

        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.default_user_id, 7);
        assert_eq!(config.ai.backend, AiBackendKind::OpenaiCompatible);
        assert_eq!(config.ai.host.as_deref(), Some("http://gpu:8000"));
        assert_eq!(config.ai.model.as_deref(), Some("qwen2.5"));
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.renderer.url.as_deref(),
            Some("http://pdf:8090/render")
        );
        assert_eq!(
            config.server.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_db_path_env_selects_sqlite() {
        let mut config = AppConfig {
            storage: StorageConfig::Memory,
            ..Default::default()
        };
        config
            .apply_env(env(&[("LEDGERLY_DB", "/data/books.db")]))
            .unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite {
                path: PathBuf::from("/data/books.db")
            }
        );
    }

    #[test]
    fn test_bad_env_values_rejected() {
        let mut config = AppConfig::default();
        assert!(config
            .apply_env(env(&[("LEDGERLY_DEFAULT_USER", "alice")]))
            .is_err());
        assert!(config
            .apply_env(env(&[("LEDGERLY_AI_TIMEOUT_SECS", "0")]))
            .is_err());
        assert!(config
            .apply_env(env(&[("LEDGERLY_STORAGE", "postgres")]))
            .is_err());
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[("OLLAMA_HOST", "  "), ("AI_BACKEND", "")]))
            .unwrap();
        assert!(config.ai.host.is_none());
        assert_eq!(config.ai.backend, AiBackendKind::Ollama);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err =
            AppConfig::load_with(Some(Path::new("/nonexistent/ledgerly.toml")), |_| None)
                .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_load_with_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nbackend = \"memory\"\n[ai]\nbackend = \"mock\"\n")
            .unwrap();

        let config = AppConfig::load_with(Some(path.as_path()), env(&[("LEDGERLY_DEFAULT_USER", "3")]))
            .unwrap();
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.ai.backend, AiBackendKind::Mock);
        assert_eq!(config.default_user_id, 3);
    }
}
