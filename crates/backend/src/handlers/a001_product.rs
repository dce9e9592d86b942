use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::{Method, StatusCode, Uri},
    Json,
};
use contracts::domain::a001_product::aggregate::{
    Product, ProductCreationPayload, ProductId, ProductUpdatePayload,
};
use contracts::domain::common::AggregateId;
use contracts::shared::api_error::{format_operation, ApiError};
use serde::Deserialize;

use crate::domain::a001_product::service::{self, ServiceError};
use crate::domain::a001_product::store::{StoreError, DEFAULT_PAGE_LIMIT};
use crate::routes::AppState;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Разбор `page`/`limit`: отсутствуют → 1/10, не число или < 1 → ошибка
pub fn parse_page_params(query: &PageQuery) -> Result<(i64, i64), String> {
    fn parse(name: &str, value: &Option<String>, default: i64) -> Result<i64, String> {
        match value.as_deref() {
            None | Some("") => Ok(default),
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(v) if v >= 1 => Ok(v),
                _ => Err(format!("Invalid {} number: {}", name, raw)),
            },
        }
    }

    let page = parse("page", &query.page, 1)?;
    let limit = parse("limit", &query.limit, DEFAULT_PAGE_LIMIT as i64)?;
    Ok((page, limit))
}

fn api_error(
    code: StatusCode,
    message: &str,
    method: &Method,
    uri: &Uri,
    embedded: impl ToString,
) -> (StatusCode, Json<ApiError>) {
    let body = ApiError::new(
        code.as_u16(),
        message,
        format_operation(method.as_str(), uri.path()),
        embedded.to_string(),
    );
    (code, Json(body))
}

/// Тело запроса, не разобранное как JSON нужной формы → 400
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    method: &Method,
    uri: &Uri,
) -> ApiResult<T> {
    payload.map(|Json(body)| body).map_err(|e| {
        api_error(
            StatusCode::BAD_REQUEST,
            "Request Body parsing failed",
            method,
            uri,
            e.body_text(),
        )
    })
}

/// `:id` из пути → `ProductId`, иначе 400
fn parse_product_id(
    raw: Result<Path<String>, PathRejection>,
    method: &Method,
    uri: &Uri,
) -> ApiResult<ProductId> {
    let invalid = |e: String| {
        api_error(StatusCode::BAD_REQUEST, "Invalid format of ID", method, uri, e)
    };
    let Path(raw) = raw.map_err(|e| invalid(e.body_text()))?;
    ProductId::from_string(&raw).map_err(invalid)
}

/// Сопоставление ошибок сервиса с HTTP статусами
fn map_service_error(
    err: ServiceError,
    failure_message: &str,
    method: &Method,
    uri: &Uri,
) -> (StatusCode, Json<ApiError>) {
    let (code, message) = match &err {
        ServiceError::Validation(_) => (
            StatusCode::BAD_REQUEST,
            "Request payload validation failed",
        ),
        ServiceError::Store(StoreError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, "Product not found")
        }
        ServiceError::Store(StoreError::Conflict { .. }) => {
            (StatusCode::CONFLICT, "Insufficient inventory")
        }
        ServiceError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, failure_message),
    };
    if code == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("{} {}: {}", method, uri.path(), err);
    }
    api_error(code, message, method, uri, err)
}

/// GET /api/product?page=&limit=
pub async fn list(
    method: Method,
    uri: Uri,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let (page, limit) = parse_page_params(&query).map_err(|e| {
        api_error(StatusCode::BAD_REQUEST, "Invalid pagination", &method, &uri, e)
    })?;

    service::list(state.store.as_ref(), page, limit)
        .await
        .map(Json)
        .map_err(|e| map_service_error(e, "Error in product retrieval", &method, &uri))
}

/// GET /api/product/:id
pub async fn get_by_id(
    method: Method,
    uri: Uri,
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Product>> {
    let id = parse_product_id(id, &method, &uri)?;
    service::get_by_id(state.store.as_ref(), id)
        .await
        .map(Json)
        .map_err(|e| map_service_error(e, "Error in product retrieval", &method, &uri))
}

/// POST /api/product
pub async fn create(
    method: Method,
    uri: Uri,
    State(state): State<AppState>,
    payload: Result<Json<ProductCreationPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let payload = parse_body(payload, &method, &uri)?;
    service::create(state.store.as_ref(), payload)
        .await
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(|e| map_service_error(e, "Product not created", &method, &uri))
}

/// PUT /api/product
pub async fn update(
    method: Method,
    uri: Uri,
    State(state): State<AppState>,
    patch: Result<Json<ProductUpdatePayload>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let patch = parse_body(patch, &method, &uri)?;
    service::update(state.store.as_ref(), patch)
        .await
        .map(Json)
        .map_err(|e| map_service_error(e, "Product not updated", &method, &uri))
}

/// DELETE /api/product/:id
pub async fn delete(
    method: Method,
    uri: Uri,
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Product>> {
    let id = parse_product_id(id, &method, &uri)?;
    service::delete(state.store.as_ref(), id)
        .await
        .map(Json)
        .map_err(|e| map_service_error(e, "Product not deleted", &method, &uri))
}
