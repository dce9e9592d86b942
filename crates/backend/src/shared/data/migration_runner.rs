use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;
use std::path::{Path, PathBuf};

/// Каталог `migrations/` в корне workspace (для запуска из исходников и тестов)
pub fn workspace_migrations_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations")
}

fn candidate_migrations_dirs(configured: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if configured.is_absolute() {
        dirs.push(configured.to_path_buf());
    } else {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                dirs.push(exe_dir.join(configured));
            }
        }
        dirs.push(configured.to_path_buf());
    }
    dirs.push(workspace_migrations_dir());

    dirs
}

/// Найти существующий каталог миграций
pub fn resolve_migrations_dir(configured: &Path) -> anyhow::Result<PathBuf> {
    candidate_migrations_dirs(configured)
        .into_iter()
        .find(|p| p.exists() && p.is_dir())
        .ok_or_else(|| {
            anyhow::anyhow!("migrations directory not found: {}", configured.display())
        })
}

async fn has_table(pool: &SqlitePool, table_name: &str) -> anyhow::Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name = ?1",
    )
    .bind(table_name)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

pub async fn run_up(pool: &SqlitePool, migrations_dir: &Path) -> anyhow::Result<()> {
    let migrations_dir = resolve_migrations_dir(migrations_dir)?;
    tracing::info!("Running up migrations from {}", migrations_dir.display());

    let migrator = Migrator::new(migrations_dir.as_path()).await?;
    migrator.run(pool).await?;

    tracing::info!("Up migrations finished successfully");
    Ok(())
}

/// Откатить все миграции (до версии 0)
pub async fn run_down(pool: &SqlitePool, migrations_dir: &Path) -> anyhow::Result<()> {
    if !has_table(pool, "_sqlx_migrations").await? {
        tracing::info!("No applied migrations, nothing to revert");
        return Ok(());
    }

    let migrations_dir = resolve_migrations_dir(migrations_dir)?;
    tracing::info!("Running down migrations from {}", migrations_dir.display());

    let migrator = Migrator::new(migrations_dir.as_path()).await?;
    migrator.undo(pool, 0).await?;

    tracing::info!("Down migrations finished successfully");
    Ok(())
}
