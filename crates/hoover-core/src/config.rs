use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{HooverError, Result};

/// Environment variable holding the search service admin/query key.
pub const SEARCH_KEY_ENV: &str = "HOOVER_SEARCH_KEY";

/// Environment variable holding the bearer token for the HTTP API.
pub const API_TOKEN_ENV: &str = "HOOVER_API_TOKEN";

/// Top-level configuration for the Hoover service.
///
/// Loaded from `~/.hoover/config.toml` by default. Each section maps to one
/// crate of the workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HooverConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl HooverConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HooverConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file if it exists.
    ///
    /// A missing file yields defaults. A file that exists but cannot be read
    /// or parsed is still an error.
    pub fn load_if_present(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// SQLite file for the local backend: `search.local_index_path` when set,
    /// otherwise `documents.db` under the data directory.
    pub fn local_index_path(&self) -> PathBuf {
        match &self.search.local_index_path {
            Some(path) => expand_home(path),
            None => expand_home(&self.general.data_dir).join("documents.db"),
        }
    }

    /// Overlay secrets supplied through the environment.
    ///
    /// `lookup` is `std::env::var(..).ok()` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(SEARCH_KEY_ENV).filter(|k| !k.is_empty()) {
            self.search.api_key = key;
        }
        if let Some(token) = lookup(API_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.api.token = Some(token);
        }
    }

    /// Check that the configuration is usable before accepting turns.
    pub fn validate(&self) -> Result<()> {
        if self.search.max_results == 0 {
            return Err(HooverError::Config(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        if self.chat.heartbeat_interval_ms == 0 {
            return Err(HooverError::Config(
                "chat.heartbeat_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.chat.search_timeout_secs == 0 {
            return Err(HooverError::Config(
                "chat.search_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.chat.vocabulary_path.trim().is_empty() {
            return Err(HooverError::Config(
                "chat.vocabulary_path is required".to_string(),
            ));
        }
        match self.search.backend {
            SearchBackendKind::Cognitive => {
                if self.search.service_name.is_empty() && self.search.endpoint.is_none() {
                    return Err(HooverError::Config(
                        "search.service_name or search.endpoint is required".to_string(),
                    ));
                }
                if self.search.index.is_empty() {
                    return Err(HooverError::Config("search.index is required".to_string()));
                }
                if self.search.api_key.is_empty() {
                    return Err(HooverError::Config(format!(
                        "search.api_key is required (or set {})",
                        SEARCH_KEY_ENV
                    )));
                }
            }
            SearchBackendKind::Local => {
                let path = self.search.local_index_path.as_deref();
                if path.is_some_and(|p| p.trim().is_empty()) {
                    return Err(HooverError::Config(
                        "search.local_index_path must not be blank".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => {
            #[cfg(target_os = "windows")]
            let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
            #[cfg(not(target_os = "windows"))]
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(rest)
        }
        None => PathBuf::from(path),
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the API token and the local index.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// HTTP port for the bot endpoint.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.hoover/data".to_string(),
            log_level: "info".to_string(),
            port: 3978,
        }
    }
}

/// Which document-search backend to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackendKind {
    /// Hosted cognitive search service over HTTPS.
    Cognitive,
    /// SQLite FTS5 index on local disk.
    Local,
}

/// Search backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub backend: SearchBackendKind,
    /// Search service name; the endpoint is derived from it when `endpoint` is unset.
    pub service_name: String,
    /// Explicit endpoint base URL, overriding `service_name`.
    pub endpoint: Option<String>,
    /// Index holding the enriched documents.
    pub index: String,
    /// Query key. Prefer the `HOOVER_SEARCH_KEY` environment variable.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    pub api_version: String,
    /// Number of hits requested per query.
    pub max_results: usize,
    /// Path of the SQLite file used by the local backend. Defaults to
    /// `documents.db` under `general.data_dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_index_path: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackendKind::Cognitive,
            service_name: String::new(),
            endpoint: None,
            index: "jfkindex".to_string(),
            api_key: String::new(),
            api_version: "2020-06-30".to_string(),
            max_results: 10,
            local_index_path: None,
        }
    }
}

impl SearchConfig {
    /// Base URL of the hosted search service.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.search.windows.net", self.service_name),
        }
    }
}

/// Conversation behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// JSON dictionary of cryptonyms (`{"TERM": "definition"}`).
    pub vocabulary_path: String,
    /// Prefix of the "Dig Deeper" link; the URL-encoded query is appended.
    pub see_more_url: String,
    /// Interval between typing indicators while a search is running.
    pub heartbeat_interval_ms: u64,
    /// Upper bound on a single search call.
    pub search_timeout_secs: u64,
    /// Participant ids that are never greeted.
    pub pre_greeted: Vec<String>,
    /// Maximum accepted message length in characters.
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            vocabulary_path: "cia-cryptonyms.json".to_string(),
            see_more_url: "https://jfk-demo.azurewebsites.net/#/search?term=".to_string(),
            heartbeat_interval_ms: 2000,
            search_timeout_secs: 30,
            pre_greeted: vec!["default-user".to_string()],
            max_message_length: 2000,
        }
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Fixed bearer token. When unset a token is generated under `data_dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Extra origins allowed by CORS (e.g. a web-chat page).
    pub cors_origins: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn valid_config() -> HooverConfig {
        let mut config = HooverConfig::default();
        config.search.service_name = "jfk-search".to_string();
        config.search.api_key = "secret".to_string();
        config
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/srv/hoover"), PathBuf::from("/srv/hoover"));
        assert_eq!(expand_home("relative/dir"), PathBuf::from("relative/dir"));
        let expanded = expand_home("~/.hoover/data");
        assert!(expanded.ends_with(".hoover/data"));
        assert!(!expanded.starts_with("~"));
    }

    #[test]
    fn test_default_config() {
        let config = HooverConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.port, 3978);
        assert_eq!(config.search.backend, SearchBackendKind::Cognitive);
        assert_eq!(config.search.max_results, 10);
        assert_eq!(config.chat.heartbeat_interval_ms, 2000);
        assert_eq!(config.chat.pre_greeted, vec!["default-user"]);
        assert!(config.api.token.is_none());
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/tmp/hoover-test"
log_level = "debug"
port = 8080

[search]
backend = "local"
local_index_path = "/tmp/hoover-test/docs.db"
max_results = 5

[chat]
vocabulary_path = "/etc/hoover/cryptonyms.json"
see_more_url = "https://example.org/search?q="
heartbeat_interval_ms = 500
search_timeout_secs = 10
pre_greeted = ["default-user", "webchat-bot"]

[api]
token = "abc123"
cors_origins = ["https://example.org"]
"#;
        let file = create_temp_config(content);
        let config = HooverConfig::load(file.path()).unwrap();

        assert_eq!(config.general.data_dir, "/tmp/hoover-test");
        assert_eq!(config.general.port, 8080);
        assert_eq!(config.search.backend, SearchBackendKind::Local);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.chat.vocabulary_path, "/etc/hoover/cryptonyms.json");
        assert_eq!(config.chat.heartbeat_interval_ms, 500);
        assert_eq!(config.chat.pre_greeted.len(), 2);
        assert_eq!(config.api.token.as_deref(), Some("abc123"));
        assert_eq!(config.api.cors_origins, vec!["https://example.org"]);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = create_temp_config("[search]\nservice_name = \"jfk\"\n");
        let config = HooverConfig::load(file.path()).unwrap();
        assert_eq!(config.search.service_name, "jfk");
        assert_eq!(config.search.index, "jfkindex");
        assert_eq!(config.chat.search_timeout_secs, 30);
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("[search\nbroken");
        assert!(matches!(
            HooverConfig::load(file.path()),
            Err(HooverError::Config(_))
        ));
    }

    #[test]
    fn test_load_if_present_missing_file() {
        let config =
            HooverConfig::load_if_present(Path::new("/does/not/exist/config.toml")).unwrap();
        assert_eq!(config.general.port, 3978);
    }

    #[test]
    fn test_load_if_present_rejects_invalid_toml() {
        let file = create_temp_config("port = [");
        assert!(HooverConfig::load_if_present(file.path()).is_err());
    }

    #[test]
    fn test_local_index_follows_data_dir() {
        let mut config = HooverConfig::default();
        config.general.data_dir = "/var/lib/hoover".to_string();
        assert_eq!(
            config.local_index_path(),
            PathBuf::from("/var/lib/hoover/documents.db")
        );

        config.search.local_index_path = Some("/srv/index.db".to_string());
        assert_eq!(config.local_index_path(), PathBuf::from("/srv/index.db"));
    }

    #[test]
    fn test_validate_rejects_blank_local_index_path() {
        let mut config = HooverConfig::default();
        config.search.backend = SearchBackendKind::Local;
        config.search.local_index_path = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_url_from_service_name() {
        let config = valid_config();
        assert_eq!(
            config.search.endpoint_url(),
            "https://jfk-search.search.windows.net"
        );
    }

    #[test]
    fn test_endpoint_url_override_trims_slash() {
        let mut config = valid_config();
        config.search.endpoint = Some("http://localhost:9200/".to_string());
        assert_eq!(config.search.endpoint_url(), "http://localhost:9200");
    }

    #[test]
    fn test_apply_env_sets_secrets() {
        let env: HashMap<&str, &str> =
            HashMap::from([(SEARCH_KEY_ENV, "from-env"), (API_TOKEN_ENV, "tok")]);
        let mut config = HooverConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.search.api_key, "from-env");
        assert_eq!(config.api.token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_apply_env_ignores_empty_values() {
        let mut config = valid_config();
        config.apply_env(|_| Some(String::new()));
        assert_eq!(config.search.api_key, "secret");
        assert!(config.api.token.is_none());
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_credentials() {
        let mut config = valid_config();
        config.search.api_key.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(SEARCH_KEY_ENV));
    }

    #[test]
    fn test_validate_requires_service() {
        let mut config = valid_config();
        config.search.service_name.clear();
        assert!(config.validate().is_err());
        config.search.endpoint = Some("http://localhost:9200".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_results() {
        let mut config = valid_config();
        config.search.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_local_backend_needs_no_key() {
        let mut config = HooverConfig::default();
        config.search.backend = SearchBackendKind::Local;
        assert!(config.validate().is_ok());
    }
}
