use async_trait::async_trait;
use contracts::domain::a001_product::aggregate::{Product, ProductId};
use std::path::Path;
use thiserror::Error;

/// Размер страницы по умолчанию для `retrieve_all`
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Ошибки хранилища товаров
#[derive(Debug, Error)]
pub enum StoreError {
    /// Нет записи с таким id. Ожидаемый исход, не сбой
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// Условная запись отклонена: количество ушло бы в минус (или id не существует)
    #[error("insufficient inventory for product {id}: quantity change {delta} rejected")]
    Conflict { id: ProductId, delta: i64 },

    #[error("write failed: {0}")]
    Write(String),

    /// Запись по уникальному ключу затронула больше одной строки
    #[error("invariant violated: update of product {id} affected {rows} rows")]
    Invariant { id: ProductId, rows: u64 },

    #[error("storage error: {0}")]
    Storage(String),
}

/// CRUD над товарами.
///
/// Все методы возвращают свежую копию из хранилища, а не мутируют
/// переданный объект.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Вставить товар и вернуть сохранённую строку (с присвоенным id)
    async fn create(&self, product: &Product) -> Result<Product, StoreError>;

    async fn retrieve(&self, id: ProductId) -> Result<Product, StoreError>;

    /// Страница товаров в порядке id. `page < 1` → 1, `limit < 1` → 10
    async fn retrieve_all(&self, page: i64, limit: i64) -> Result<Vec<Product>, StoreError>;

    /// Условная запись: поля кроме количества перезаписываются,
    /// к количеству прибавляется `quantity_delta`, только если результат >= 0.
    async fn update(&self, product: &Product, quantity_delta: i64) -> Result<Product, StoreError>;

    async fn delete(&self, id: ProductId) -> Result<(), StoreError>;
}

/// Управление жизненным циклом хранилища (подключение, миграции).
/// Тестовым хранилищам реализовывать не нужно.
#[async_trait]
pub trait StoreLifecycle: Send + Sync {
    async fn verify_connection(&self) -> Result<(), StoreError>;

    async fn migrate_up(&self, migrations_dir: &Path) -> Result<(), StoreError>;

    async fn migrate_down(&self, migrations_dir: &Path) -> Result<(), StoreError>;

    async fn close(&self) -> Result<(), StoreError>;
}

/// Нормализует параметры пагинации в (offset, limit).
///
/// `None`, если offset не помещается в i64: такая страница заведомо пуста.
pub fn page_window(page: i64, limit: i64) -> Option<(u64, u64)> {
    let page = page.max(1);
    let limit = if limit < 1 {
        DEFAULT_PAGE_LIMIT as i64
    } else {
        limit
    };
    let offset = (page - 1).checked_mul(limit)?;
    Some((offset as u64, limit as u64))
}
