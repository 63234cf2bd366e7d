use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 3000 }

/// Relational backend settings. An empty `url` means the backend is not configured.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_routes_file")]
    pub routes_file: String,
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { routes_file: default_routes_file(), public_dir: default_public_dir() }
    }
}

fn default_routes_file() -> String { "data/routes.json".into() }
fn default_public_dir() -> String { "public".into() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { format: default_log_format() } }
}

fn default_log_format() -> String { "compact".into() }

/// Which backend serves as primary, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageMode {
    File,
    Database(DatabaseConfig),
}

/// Load from `CONFIG_PATH` (default `config.toml`); a missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if std::fs::metadata(&path).is_err() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Override file values with environment variables looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("PORT must be a valid port number, got {port:?}"))?;
        }
        if let Some(w) = var("TOKIO_WORKER_THREADS").and_then(|v| v.trim().parse().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(url) = var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(file) = var("ROUTES_FILE") {
            self.storage.routes_file = file;
        }
        if let Some(dir) = var("PUBLIC_DIR") {
            self.storage.public_dir = dir;
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.logging.format = format;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.url = self.database.url.trim().to_string();
        if self.database.is_configured() {
            self.database.validate()?;
        }
        if self.storage.routes_file.trim().is_empty() {
            return Err(anyhow!("storage.routes_file must not be empty"));
        }
        Ok(())
    }

    pub fn storage_mode(&self) -> StorageMode {
        if self.database.is_configured() {
            StorageMode::Database(self.database.clone())
        } else {
            StorageMode::File
        }
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_select_file_mode_on_port_3000() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[])).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.storage.routes_file, "data/routes.json");
        assert_eq!(cfg.storage_mode(), StorageMode::File);
    }

    #[test]
    fn database_url_switches_to_database_mode() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[("DATABASE_URL", "postgres://u:p@localhost/db"), ("PORT", "8088")]))
            .unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 8088);
        match cfg.storage_mode() {
            StorageMode::Database(db) => assert_eq!(db.url, "postgres://u:p@localhost/db"),
            StorageMode::File => panic!("expected database mode"),
        }
    }

    #[test]
    fn blank_database_url_stays_in_file_mode() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[("DATABASE_URL", "   ")])).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.storage_mode(), StorageMode::File);
    }

    #[test]
    fn rejects_non_postgres_url_and_bad_port() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[("DATABASE_URL", "mysql://localhost/db")])).unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        assert!(cfg.apply_env(env_of(&[("PORT", "not-a-port")])).is_err());
    }

    #[test]
    fn toml_sections_are_optional() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 4000

            [storage]
            routes_file = "/var/lib/json-host/routes.json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.public_dir, "public");
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.logging.format, "compact");
    }

    #[test]
    fn example_config_parses_and_validates() {
        let mut cfg: AppConfig = toml::from_str(include_str!("../../../config.toml.example")).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.storage_mode(), StorageMode::File);
        assert_eq!(cfg.server.worker_threads, Some(4));
    }
}
