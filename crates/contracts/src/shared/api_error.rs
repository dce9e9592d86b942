use serde::{Deserialize, Serialize};

/// Тело ответа API при ошибке
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP статус
    pub code: u16,
    /// Сообщение для пользователя
    pub message: String,
    /// Метод и путь, например "PUT /api/product"
    pub operation: String,
    /// Текст исходной ошибки
    #[serde(rename = "embeddedError")]
    pub embedded_error: String,
}

impl ApiError {
    pub fn new(
        code: u16,
        message: impl Into<String>,
        operation: impl Into<String>,
        embedded_error: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            operation: operation.into(),
            embedded_error: embedded_error.into(),
        }
    }
}

/// Форматирует операцию как "METHOD /path"
pub fn format_operation(method: &str, path: &str) -> String {
    format!("{} {}", method, path)
}
