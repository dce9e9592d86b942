use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn,sea_orm=warn";

/// Инициализация системы трассировки (tracing)
///
/// Логи пишутся в:
/// - stdout (с цветами)
/// - `log_file_path` (без цветов, дописывается)
///
/// Ошибки выводятся через println: подписчик ещё не установлен.
pub fn initialize(log_file_path: &Path) -> anyhow::Result<()> {
    if let Some(log_dir) = log_file_path.parent() {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            println!("✗ ERROR: Cannot create log directory {}: {}", log_dir.display(), e);
            return Err(anyhow::anyhow!("Cannot create log directory: {}", e));
        }
    }

    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
    {
        Ok(f) => f,
        Err(e) => {
            println!("✗ ERROR: Cannot open log file {}: {}", log_file_path.display(), e);
            println!("  Error kind: {:?}", e.kind());
            return Err(anyhow::anyhow!("Cannot open log file: {}", e));
        }
    };

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_level))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .try_init()?;

    tracing::info!(
        "Tracing initialized: level={}, file={}",
        log_level,
        log_file_path.display()
    );
    Ok(())
}
