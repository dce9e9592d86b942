use contracts::domain::a001_product::aggregate::{
    Product, ProductCreationPayload, ProductId, ProductUpdatePayload,
};
use thiserror::Error;

use super::store::{ProductStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Создание нового товара
pub async fn create(
    store: &dyn ProductStore,
    payload: ProductCreationPayload,
) -> Result<Product, ServiceError> {
    // Валидация
    payload.validate().map_err(ServiceError::Validation)?;

    let product = Product::new_for_insert(&payload);
    let created = store.create(&product).await?;
    tracing::info!("Created product {} ({})", created.id, created.name);
    Ok(created)
}

/// Получение товара по ID
pub async fn get_by_id(store: &dyn ProductStore, id: ProductId) -> Result<Product, ServiceError> {
    Ok(store.retrieve(id).await?)
}

/// Страница товаров
pub async fn list(
    store: &dyn ProductStore,
    page: i64,
    limit: i64,
) -> Result<Vec<Product>, ServiceError> {
    Ok(store.retrieve_all(page, limit).await?)
}

/// Частичное обновление: читаем текущее состояние, накладываем patch и
/// передаём в хранилище дельту количества. Возвращается то, что реально
/// записано в БД.
pub async fn update(
    store: &dyn ProductStore,
    patch: ProductUpdatePayload,
) -> Result<Product, ServiceError> {
    patch.validate().map_err(ServiceError::Validation)?;

    let mut product = store.retrieve(patch.id).await?;
    let quantity_delta = product.apply_update(&patch);

    let updated = store.update(&product, quantity_delta).await?;
    tracing::info!(
        "Updated product {}: quantity delta {}, quantity now {}",
        updated.id,
        quantity_delta,
        updated.quantity
    );
    Ok(updated)
}

/// Удаление товара, возвращает удалённую запись
pub async fn delete(store: &dyn ProductStore, id: ProductId) -> Result<Product, ServiceError> {
    let product = store.retrieve(id).await?;
    store.delete(id).await?;
    tracing::info!("Deleted product {}", id);
    Ok(product)
}
