//! Catalog handlers.
//!
//! Reads are public; writes sit behind the admin middleware.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use velora_core::validation::{validate_price_cents, validate_product_name, validate_stock};
use velora_core::Product;
use velora_db::ProductPatch;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

/// `GET /api/products`
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.db.products().list(query.category.as_deref()).await?;
    Ok(Json(products))
}

/// `GET /api/products/:id`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {}", id)))?;

    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category: Option<String>,
    #[serde(default)]
    pub stock: i64,
    pub image: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

/// `POST /api/admin/products`
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    validate_product_name(&body.name)?;
    validate_price_cents(body.price_cents)?;
    validate_stock(body.stock)?;

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: body.name.trim().to_string(),
        description: body.description,
        price_cents: body.price_cents,
        category: body.category,
        stock: body.stock,
        image: body.image,
        sizes: body.sizes,
        created_at: now,
        updated_at: now,
    };

    let product = state.db.products().insert(&product).await?;
    info!(id = %product.id, name = %product.name, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Partial update payload: absent fields keep their current value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub image: Option<String>,
    pub sizes: Option<Vec<String>>,
}

/// `PUT /api/admin/products/:id`
///
/// Only the submitted fields are written; omitted fields keep whatever
/// the catalog holds at write time, including stock the ledger has
/// decremented since the admin loaded the form. Setting `stock` is how
/// restocking happens; it is an absolute value, not a delta.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    if let Some(name) = &body.name {
        validate_product_name(name)?;
    }
    if let Some(price_cents) = body.price_cents {
        validate_price_cents(price_cents)?;
    }
    if let Some(stock) = body.stock {
        validate_stock(stock)?;
    }

    let patch = ProductPatch {
        name: body.name.map(|n| n.trim().to_string()),
        description: body.description,
        price_cents: body.price_cents,
        category: body.category,
        stock: body.stock,
        image: body.image,
        sizes: body.sizes,
    };

    let product = state.db.products().update(&id, &patch).await?;
    info!(id = %product.id, "Product updated");

    Ok(Json(product))
}

/// `DELETE /api/admin/products/:id`
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.products().delete(&id).await?;
    info!(id = %id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}
