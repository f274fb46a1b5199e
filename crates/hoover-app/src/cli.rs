//! Command-line arguments.
//!
//! Priority: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use hoover_core::config::SearchBackendKind;
use hoover_core::HooverConfig;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "HOOVER_CONFIG";

/// Environment variable overriding the listening port.
pub const PORT_ENV: &str = "HOOVER_PORT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Cognitive,
    Local,
}

impl From<BackendArg> for SearchBackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Cognitive => SearchBackendKind::Cognitive,
            BackendArg::Local => SearchBackendKind::Local,
        }
    }
}

/// Hoover: a chat bot that searches declassified archives.
#[derive(Parser, Debug)]
#[command(name = "hoover", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// HTTP port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Data directory for the API token and local index.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Cryptonym dictionary (JSON object of term to definition).
    #[arg(long = "vocabulary")]
    pub vocabulary: Option<PathBuf>,

    /// Search backend.
    #[arg(long = "backend", value_enum)]
    pub backend: Option<BackendArg>,

    /// JSON-lines file to import into the local index before serving.
    #[arg(long = "import")]
    pub import: Option<PathBuf>,
}

impl CliArgs {
    /// Priority: --config flag > HOOVER_CONFIG > ~/.hoover/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --port flag > HOOVER_PORT > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        std::env::var(PORT_ENV)
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(config_port)
    }

    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }

    /// Write command-line overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut HooverConfig) {
        config.general.port = self.resolve_port(config.general.port);
        if let Some(ref dir) = self.data_dir {
            config.general.data_dir = dir.to_string_lossy().to_string();
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(ref path) = self.vocabulary {
            config.chat.vocabulary_path = path.to_string_lossy().to_string();
        }
        if let Some(backend) = self.backend {
            config.search.backend = backend.into();
        }
    }
}

fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".hoover").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".hoover").join("config.toml");
    }
    PathBuf::from("config.toml")
}
