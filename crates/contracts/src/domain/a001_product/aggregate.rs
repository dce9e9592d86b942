use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::AggregateId;

// ============================================================================
// ID Type
// ============================================================================

/// Идентификатор товара, назначается хранилищем (autoincrement)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl ProductId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Товар ещё не сохранён (id не присвоен)
    pub fn is_unassigned(&self) -> bool {
        self.0 <= 0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AggregateId for ProductId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        s.trim()
            .parse::<i64>()
            .map(ProductId::new)
            .map_err(|e| format!("Invalid product id: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Товар каталога
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
    pub discount: f64,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

impl Product {
    /// Создать новый товар для вставки в БД (id присваивает хранилище)
    pub fn new_for_insert(payload: &ProductCreationPayload) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId(0),
            name: payload.name.clone(),
            description: payload.description.clone(),
            price: payload.price,
            quantity: payload.quantity,
            discount: payload.discount,
            created_at: now,
            last_updated: now,
        }
    }

    /// Обновить timestamp
    pub fn touch_updated(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Применить частичное обновление.
    ///
    /// Поля, отсутствующие в `patch`, не меняются. Количество задаётся
    /// абсолютным значением, а возвращается знаковая дельта
    /// `patch.quantity - self.quantity` (0, если количество не передано):
    /// именно её хранилище прибавляет к сохранённому значению.
    /// `last_updated` обновляется всегда.
    pub fn apply_update(&mut self, patch: &ProductUpdatePayload) -> i64 {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(discount) = patch.discount {
            self.discount = discount;
        }

        let quantity_delta = match patch.quantity {
            Some(quantity) => {
                let delta = quantity - self.quantity;
                self.quantity = quantity;
                delta
            }
            None => 0,
        };

        self.touch_updated();
        quantity_delta
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания товара
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreationPayload {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub description: String,
}

impl ProductCreationPayload {
    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name must not be empty".into());
        }
        validate_price(self.price)?;
        validate_quantity(self.quantity)?;
        validate_discount(self.discount)?;
        Ok(())
    }
}

/// DTO частичного обновления товара.
///
/// `None` означает "поле не передано". Явное `Some` применяется как есть,
/// в том числе пустое описание или нулевая цена.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductUpdatePayload {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
}

impl ProductUpdatePayload {
    /// Пустой patch для товара: ни одно поле не передано
    pub fn for_id(id: ProductId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_unassigned() {
            return Err("Product id is required".into());
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("Name must not be empty".into());
            }
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(discount) = self.discount {
            validate_discount(discount)?;
        }
        Ok(())
    }
}

fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price < 0.0 {
        return Err(format!("Price must be a non-negative number, got {}", price));
    }
    Ok(())
}

fn validate_quantity(quantity: i64) -> Result<(), String> {
    if quantity < 0 {
        return Err(format!("Quantity must not be negative, got {}", quantity));
    }
    Ok(())
}

// Диапазон скидки не ограничен, проверяется только, что это число
fn validate_discount(discount: f64) -> Result<(), String> {
    if !discount.is_finite() {
        return Err("Discount must be a finite number".into());
    }
    Ok(())
}
