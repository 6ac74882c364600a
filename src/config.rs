use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "dictionary.db";
pub const DEFAULT_WWW: &str = "./www";

/// Contents of `najdict.toml`; every field is optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct NajdictConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub www: Option<String>,
}

impl NajdictConfig {
    /// A config with every default spelled out, as written by `najdict init`
    pub fn with_defaults() -> Self {
        Self {
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
            database: Some(DEFAULT_DATABASE.to_string()),
            www: Some(DEFAULT_WWW.to_string()),
        }
    }

    /// Fields set in `other` win
    pub fn merged_with(self, other: NajdictConfig) -> Self {
        Self {
            host: other.host.or(self.host),
            port: other.port.or(self.port),
            database: other.database.or(self.database),
            www: other.www.or(self.www),
        }
    }

    pub fn into_settings(self) -> ServerSettings {
        ServerSettings {
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            database_path: PathBuf::from(self.database.unwrap_or_else(|| DEFAULT_DATABASE.to_string())),
            static_dir: PathBuf::from(self.www.unwrap_or_else(|| DEFAULT_WWW.to_string())),
        }
    }
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        NajdictConfig::default().into_settings()
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("najdict.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<NajdictConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: NajdictConfig = toml::from_str(&contents)
        .map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

/// Write `config` to `path`, refusing to replace an existing file unless `force`
pub fn write_config(path: &Path, config: &NajdictConfig, force: bool) -> crate::Result<()> {
    if !force && path.exists() {
        return Err(crate::Error::Config(format!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        )));
    }

    let body = toml::to_string_pretty(config)
        .map_err(|e| crate::Error::Config(format!("cannot serialize config: {}", e)))?;
    std::fs::write(path, format!("# najdict configuration\n{}", body))?;
    Ok(())
}
