use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub migrate_up: bool,
    pub migrate_down: bool,
    pub migration_path: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub file: String,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "localhost"
port = 8080
migrate_up = true
migrate_down = false
migration_path = "migrations"

[database]
path = "target/db/products.db"

[logging]
file = "logs/product-api.log"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// Environment variables are applied on top (see `apply_env_overrides`).
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = load_file_config()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn load_file_config() -> anyhow::Result<Config> {
    // Try to find config.toml next to the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    // Fall back to default config
    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Override config values from environment variables.
///
/// Unset variables keep the file value. `lookup` is injected so tests do not
/// touch the process environment.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("PUBLIC_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid PORT '{}': {}", port, e))?;
    }
    if let Some(value) = lookup("MIGRATE_UP") {
        config.server.migrate_up = parse_env_bool(&value);
    }
    if let Some(value) = lookup("MIGRATE_DOWN") {
        config.server.migrate_down = parse_env_bool(&value);
    }
    if let Some(path) = lookup("MIGRATION_PATH") {
        config.server.migration_path = path;
    }
    if let Some(path) = lookup("LOG_FILE") {
        config.logging.file = path;
    }
    if let Some(path) = lookup("DB_PATH") {
        config.database.path = path;
    }
    Ok(())
}

/// "true", "t" and "1" (any case) are true, everything else is false
fn parse_env_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "t" | "1")
}

/// Resolve relative paths relative to the executable directory
fn resolve_path(path_str: &str) -> PathBuf {
    let path = Path::new(path_str);

    // If absolute path, use as is
    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    // Fallback: use relative to current directory
    PathBuf::from(path_str)
}

/// Get the database file path from configuration
pub fn get_database_path(config: &Config) -> PathBuf {
    resolve_path(&config.database.path)
}

/// Get the log file path from configuration
pub fn get_log_file_path(config: &Config) -> PathBuf {
    resolve_path(&config.logging.file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn default_config() -> Config {
        toml::from_str(DEFAULT_CONFIG).unwrap()
    }

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.database.path, "target/db/products.db");
        assert_eq!(config.server.address(), "localhost:8080");
        assert!(config.server.migrate_up);
        assert!(!config.server.migrate_down);
        assert_eq!(config.server.migration_path, "migrations");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PUBLIC_HOST", "testhost"),
            ("PORT", "9090"),
            ("MIGRATE_UP", "false"),
            ("MIGRATE_DOWN", "T"),
            ("MIGRATION_PATH", "test_migrations/"),
            ("LOG_FILE", "test.log"),
            ("DB_PATH", "/tmp/test.db"),
        ]
        .into_iter()
        .collect();

        let mut config = default_config();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.server.address(), "testhost:9090");
        assert!(!config.server.migrate_up);
        assert!(config.server.migrate_down);
        assert_eq!(config.server.migration_path, "test_migrations/");
        assert_eq!(config.logging.file, "test.log");
        assert_eq!(get_database_path(&config), PathBuf::from("/tmp/test.db"));
    }

    #[test]
    fn test_env_overrides_keep_defaults_when_unset() {
        let mut config = default_config();
        apply_env_overrides(&mut config, |_| None).unwrap();
        assert_eq!(config, default_config());
    }

    #[test]
    fn test_invalid_port_is_error() {
        let mut config = default_config();
        let result = apply_env_overrides(&mut config, |k| {
            (k == "PORT").then(|| "eighty".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_env_bool() {
        for value in ["true", "TRUE", "t", "1"] {
            assert!(parse_env_bool(value), "{value}");
        }
        for value in ["false", "f", "0", "yes", ""] {
            assert!(!parse_env_bool(value), "{value}");
        }
    }
}
