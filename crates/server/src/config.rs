use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("Unknown log format: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// SMS backup loaded into an empty database at startup.
    pub data_file: PathBuf,
    /// Frontend assets served for every non-API path.
    pub static_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_url: "sqlite://data/momo.db".to_string(),
            data_file: PathBuf::from("modified_sms_v2.xml"),
            static_dir: PathBuf::from("static"),
            allowed_origins: vec![
                "http://localhost:5000".to_string(),
                "http://127.0.0.1:5000".to_string(),
            ],
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServerConfig {
    /// Defaults, then the TOML file if one is given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key: "PORT", value: port.clone() })?;
        }
        if let Some(file) = lookup("MOMO_DATA_FILE") {
            self.data_file = PathBuf::from(file);
        }
        if let Some(dir) = lookup("MOMO_STATIC_DIR") {
            self.static_dir = PathBuf::from(dir);
        }
        if let Some(origins) = lookup("MOMO_ALLOWED_ORIGINS") {
            self.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(format) = lookup("MOMO_LOG_FORMAT") {
            self.log_format = format
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key: "MOMO_LOG_FORMAT", value: format.clone() })?;
        }
        Ok(())
    }

    /// Filesystem location of the database, or `None` for in-memory URLs.
    pub fn database_path(&self) -> Option<PathBuf> {
        let rest = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or_default();
        if path.is_empty() || path == ":memory:" {
            return None;
        }
        Some(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml("port = 8080\nlog_format = \"json\"\n").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            ServerConfig::from_toml("port = \"eighty\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides() {
        let mut config = ServerConfig::default();
        config
            .apply_env(env(&[
                ("DATABASE_URL", "sqlite::memory:"),
                ("PORT", "9000"),
                ("MOMO_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
                ("MOMO_LOG_FORMAT", "JSON"),
            ]))
            .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 9000);
        assert_eq!(config.allowed_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_port_in_env() {
        let mut config = ServerConfig::default();
        let err = config.apply_env(env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "PORT", .. }));
    }

    #[test]
    fn load_missing_file_fails() {
        let err = ServerConfig::load(Some(Path::new("/no/such/momo.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn database_path_from_url() {
        let mut config = ServerConfig::default();
        assert_eq!(config.database_path(), Some(PathBuf::from("data/momo.db")));
        config.database_url = "sqlite:///var/lib/momo.db?mode=rwc".to_string();
        assert_eq!(config.database_path(), Some(PathBuf::from("/var/lib/momo.db")));
        config.database_url = "sqlite::memory:".to_string();
        assert_eq!(config.database_path(), None);
    }
}
