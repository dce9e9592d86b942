//! InMemoryProductStore - BTreeMap-backed product store for tests and development.

use async_trait::async_trait;
use contracts::domain::a001_product::aggregate::{Product, ProductId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::store::{page_window, ProductStore, StoreError};

#[derive(Default)]
struct Table {
    rows: BTreeMap<ProductId, Product>,
    last_id: i64,
}

/// Хранилище в памяти. Клонируется через Arc, все клоны видят одни данные.
///
/// Проверка остатка и прибавление дельты выполняются под одним мьютексом,
/// как один условный UPDATE в SQL-хранилище.
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    table: Arc<Mutex<Table>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table>, StoreError> {
        self.table
            .lock()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, product: &Product) -> Result<Product, StoreError> {
        let mut table = self.lock()?;
        table.last_id += 1;
        let id = ProductId(table.last_id);

        let mut row = product.clone();
        row.id = id;
        table.rows.insert(id, row.clone());

        tracing::debug!("Created product {} in memory", id);
        Ok(row)
    }

    async fn retrieve(&self, id: ProductId) -> Result<Product, StoreError> {
        self.lock()?
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn retrieve_all(&self, page: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        let Some((offset, limit)) = page_window(page, limit) else {
            return Ok(Vec::new());
        };
        Ok(self
            .lock()?
            .rows
            .values()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn update(&self, product: &Product, quantity_delta: i64) -> Result<Product, StoreError> {
        let mut table = self.lock()?;
        let conflict = StoreError::Conflict {
            id: product.id,
            delta: quantity_delta,
        };

        let row = match table.rows.get_mut(&product.id) {
            Some(row) => row,
            None => return Err(conflict),
        };
        let quantity = match row.quantity.checked_add(quantity_delta) {
            Some(q) if q >= 0 => q,
            _ => {
                tracing::warn!("{}", conflict);
                return Err(conflict);
            }
        };

        row.name = product.name.clone();
        row.description = product.description.clone();
        row.price = product.price;
        row.discount = product.discount;
        row.quantity = quantity;
        row.last_updated = product.last_updated;

        Ok(row.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        match self.lock()?.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::contract_tests as contract;
    use super::*;

    #[tokio::test]
    async fn test_create_and_retrieve() {
        contract::create_and_retrieve(&InMemoryProductStore::new()).await;
    }

    #[tokio::test]
    async fn test_retrieve_missing() {
        contract::retrieve_missing(&InMemoryProductStore::new()).await;
    }

    #[tokio::test]
    async fn test_retrieve_all_empty() {
        contract::retrieve_all_empty(&InMemoryProductStore::new()).await;
    }

    #[tokio::test]
    async fn test_retrieve_all_pages() {
        contract::retrieve_all_pages(&InMemoryProductStore::new()).await;
    }

    #[tokio::test]
    async fn test_update_sets_requested_quantity() {
        contract::update_sets_requested_quantity(&InMemoryProductStore::new()).await;
    }

    #[tokio::test]
    async fn test_update_rejects_negative_inventory() {
        contract::update_rejects_negative_inventory(&InMemoryProductStore::new()).await;
    }

    #[tokio::test]
    async fn test_update_missing_is_conflict() {
        contract::update_missing_is_conflict(&InMemoryProductStore::new()).await;
    }

    #[tokio::test]
    async fn test_concurrent_deltas() {
        contract::concurrent_deltas(Arc::new(InMemoryProductStore::new())).await;
    }

    #[tokio::test]
    async fn test_quantity_never_negative() {
        contract::quantity_never_negative(&InMemoryProductStore::new()).await;
    }

    #[tokio::test]
    async fn test_retrieve_all_huge_page() {
        contract::retrieve_all_huge_page(&InMemoryProductStore::new()).await;
    }

    #[tokio::test]
    async fn test_update_rejects_quantity_overflow() {
        contract::update_rejects_quantity_overflow(&InMemoryProductStore::new()).await;
    }

    #[tokio::test]
    async fn test_delete() {
        contract::delete_then_missing(&InMemoryProductStore::new()).await;
    }

    #[tokio::test]
    async fn test_clones_share_rows() {
        let store = InMemoryProductStore::new();
        let created = store.create(&contract::widget()).await.unwrap();

        let other = store.clone();
        assert_eq!(other.retrieve(created.id).await.unwrap(), created);
    }
}
