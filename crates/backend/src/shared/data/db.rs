use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

pub fn build_sqlite_url(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Подключение к SQLite по URL (`sqlite://...` или `sqlite::memory:`).
///
/// Возвращает пул sqlx (для миграций) и соединение sea-orm поверх того же пула.
pub async fn connect(db_url: &str) -> anyhow::Result<(SqlitePool, DatabaseConnection)> {
    if let Some(file) = db_url
        .strip_prefix("sqlite://")
        .and_then(|rest| rest.split('?').next())
    {
        if let Some(parent) = Path::new(file).parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);
    let mut pool_options = SqlitePoolOptions::new();
    if db_url.contains(":memory:") {
        // Каждое соединение к :memory: открывает свою пустую базу
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options.connect_with(options).await?;
    let conn = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());
    tracing::info!("Connected to database: {}", db_url);
    Ok((pool, conn))
}
