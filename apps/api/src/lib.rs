//! # Velora API
//!
//! HTTP server for the Velora storefront.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Velora API                                    │
//! │                                                                         │
//! │  Public            /api/products        GET   (catalog)                │
//! │                    /api/products/:id    GET                            │
//! │                    /api/orders          POST  (place order)            │
//! │                    /api/auth/*          POST  (register / login)       │
//! │                    /api/health          GET                            │
//! │                                                                         │
//! │  Admin (JWT)       /api/admin/products        POST                     │
//! │                    /api/admin/products/:id    PUT / DELETE             │
//! │                    /api/admin/orders          GET                      │
//! │                    /api/admin/orders/:id      PUT   (status)           │
//! │                                                                         │
//! │  Handlers ──► velora-db (transactions, inventory ledger) ──► SQLite    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use velora_db::Database;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    /// Builds application state from a connected database and config.
    pub fn new(db: Database, config: &ApiConfig) -> Self {
        AppState {
            db,
            jwt: Arc::new(JwtManager::new(
                config.jwt_secret.clone(),
                config.jwt_lifetime_secs,
            )),
        }
    }
}

/// Assembles the full router. Separated from `main` so integration tests
/// can drive it with `tower::ServiceExt::oneshot`.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/products", post(routes::products::create_product))
        .route(
            "/products/:id",
            put(routes::products::update_product).delete(routes::products::delete_product),
        )
        .route("/orders", get(routes::orders::list_orders))
        .route("/orders/:id", put(routes::orders::update_order_status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/products", get(routes::products::list_products))
        .route("/api/products/:id", get(routes::products::get_product))
        .route("/api/orders", post(routes::orders::create_order))
        .nest("/api/admin", admin)
        .fallback(routes::not_found)
        .with_state(state)
}
