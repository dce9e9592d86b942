use axum::{http::header, http::Method, middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::domain::a001_product::store::ProductStore;
use crate::{handlers, system};

/// Общее состояние обработчиков
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
}

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // PRODUCTS
        // ========================================
        .route(
            "/api/product",
            get(handlers::a001_product::list)
                .post(handlers::a001_product::create)
                .put(handlers::a001_product::update),
        )
        .route(
            "/api/product/:id",
            get(handlers::a001_product::get_by_id).delete(handlers::a001_product::delete),
        )
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors)
        .with_state(state)
}
