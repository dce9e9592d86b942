use async_trait::async_trait;
use contracts::domain::a001_product::aggregate::{Product, ProductId};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use std::path::Path;

use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveValue::NotSet, ConnectionTrait, DatabaseBackend, EntityTrait, QueryOrder, QuerySelect,
    Set, Statement,
};

use super::store::{page_window, ProductStore, StoreError, StoreLifecycle};
use crate::shared::data::{db, migration_runner};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount: f64,
    pub quantity: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(m: Model) -> Self {
        Product {
            id: ProductId(m.id),
            name: m.name,
            description: m.description,
            price: m.price,
            quantity: m.quantity,
            discount: m.discount,
            created_at: m.created_at,
            last_updated: m.last_updated,
        }
    }
}

// Количество меняется только прибавлением дельты, и только если результат
// не уходит в минус и не переполняет INTEGER (SQLite молча перешёл бы в REAL).
// Проверка и запись выполняются одним оператором.
const CONDITIONAL_UPDATE_SQL: &str = r#"
    UPDATE a001_product
    SET name = ?, description = ?, price = ?, discount = ?,
        quantity = quantity + ?, last_updated = ?
    WHERE id = ? AND quantity + ? >= 0
      AND (? <= 0 OR quantity <= 9223372036854775807 - ?)
"#;

/// SQLite хранилище товаров (sea-orm)
#[derive(Clone)]
pub struct SqliteProductStore {
    pool: SqlitePool,
    conn: DatabaseConnection,
}

impl SqliteProductStore {
    /// Открыть файл БД (создаётся при отсутствии)
    pub async fn open(db_path: &Path) -> anyhow::Result<Self> {
        Self::connect(&db::build_sqlite_url(db_path)).await
    }

    pub async fn connect(db_url: &str) -> anyhow::Result<Self> {
        let (pool, conn) = db::connect(db_url).await?;
        Ok(Self { pool, conn })
    }
}

fn storage_err(e: DbErr) -> StoreError {
    StoreError::Storage(e.to_string())
}

fn write_err(e: DbErr) -> StoreError {
    StoreError::Write(e.to_string())
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    async fn create(&self, product: &Product) -> Result<Product, StoreError> {
        let active = ActiveModel {
            id: NotSet,
            name: Set(product.name.clone()),
            description: Set(product.description.clone()),
            price: Set(product.price),
            discount: Set(product.discount),
            quantity: Set(product.quantity),
            created_at: Set(product.created_at),
            last_updated: Set(product.last_updated),
        };
        let result = Entity::insert(active)
            .exec(&self.conn)
            .await
            .map_err(write_err)?;

        let id = ProductId(result.last_insert_id);
        tracing::debug!("Inserted a001_product id={}", id);

        self.retrieve(id).await.map_err(|e| {
            StoreError::Write(format!("could not retrieve newly created product: {}", e))
        })
    }

    async fn retrieve(&self, id: ProductId) -> Result<Product, StoreError> {
        Entity::find_by_id(id.value())
            .one(&self.conn)
            .await
            .map_err(storage_err)?
            .map(Into::into)
            .ok_or(StoreError::NotFound(id))
    }

    async fn retrieve_all(&self, page: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        let Some((offset, limit)) = page_window(page, limit) else {
            return Ok(Vec::new());
        };
        let items = Entity::find()
            .order_by_asc(Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.conn)
            .await
            .map_err(storage_err)?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(items)
    }

    async fn update(&self, product: &Product, quantity_delta: i64) -> Result<Product, StoreError> {
        let result = self
            .conn
            .execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                CONDITIONAL_UPDATE_SQL,
                [
                    product.name.clone().into(),
                    product.description.clone().into(),
                    product.price.into(),
                    product.discount.into(),
                    quantity_delta.into(),
                    product.last_updated.into(),
                    product.id.value().into(),
                    quantity_delta.into(),
                    quantity_delta.into(),
                    quantity_delta.into(),
                ],
            ))
            .await
            .map_err(write_err)?;

        match result.rows_affected() {
            0 => {
                let err = StoreError::Conflict {
                    id: product.id,
                    delta: quantity_delta,
                };
                tracing::warn!("{}", err);
                Err(err)
            }
            1 => self.retrieve(product.id).await,
            rows => {
                let err = StoreError::Invariant {
                    id: product.id,
                    rows,
                };
                tracing::error!("{}", err);
                Err(err)
            }
        }
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        let result = Entity::delete_by_id(id.value())
            .exec(&self.conn)
            .await
            .map_err(write_err)?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::debug!("Deleted a001_product id={}", id);
        Ok(())
    }
}

#[async_trait]
impl StoreLifecycle for SqliteProductStore {
    async fn verify_connection(&self) -> Result<(), StoreError> {
        self.conn.ping().await.map_err(|e| {
            StoreError::Storage(format!("could not establish connection to the storage: {}", e))
        })
    }

    async fn migrate_up(&self, migrations_dir: &Path) -> Result<(), StoreError> {
        migration_runner::run_up(&self.pool, migrations_dir)
            .await
            .map_err(|e| StoreError::Storage(format!("up migrations failed: {:#}", e)))
    }

    async fn migrate_down(&self, migrations_dir: &Path) -> Result<(), StoreError> {
        migration_runner::run_down(&self.pool, migrations_dir)
            .await
            .map_err(|e| StoreError::Storage(format!("down migrations failed: {:#}", e)))
    }

    async fn close(&self) -> Result<(), StoreError> {
        // sea-orm работает поверх того же пула
        self.pool.close().await;
        Ok(())
    }
}
