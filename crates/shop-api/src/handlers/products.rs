//! Catalog browsing and admin product management.

use crate::auth::AuthUser;
use crate::response::{respond, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use shop_core::{Price, Product, ProductAttributes, ProductPatch, ProductQuery, ShopError};
use tracing::{info, instrument};

/// List published products with filters, sorting, and pagination.
/// Also serves the search route: `search` matches name and description
/// case-insensitively.
#[instrument(skip(state, query))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = state.catalog.list(&query).await?;
    Ok(respond(page, "Get list products successfully"))
}

/// Single product; unpublished products are invisible here
pub async fn get(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let product = state
        .catalog
        .find_by_id(&product_id)
        .await?
        .filter(|p| p.published)
        .ok_or(ShopError::ProductNotFound { product_id })?;

    Ok(respond(product, "get product by Id successfully"))
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub thumbnail: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub stock: u32,
    /// Tagged by category; the variant fixes the product's category
    pub attributes: ProductAttributes,
    #[serde(default)]
    pub published: bool,
}

/// Create a product (admin)
#[instrument(skip(state, auth, request), fields(name = %request.name))]
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    if request.name.is_empty() || request.thumbnail.is_empty() {
        return Err(
            ShopError::InvalidRequest("name and thumbnail are required".to_string()).into(),
        );
    }
    if request.price.amount < 0 {
        return Err(ShopError::InvalidRequest("price must not be negative".to_string()).into());
    }

    if state
        .catalog
        .find_duplicate(&request.name, request.attributes.category())
        .await?
        .is_some()
    {
        return Err(ShopError::ProductAlreadyExists {
            name: request.name,
        }
        .into());
    }

    let mut product = Product::new(
        request.name,
        request.thumbnail,
        request.price,
        request.stock,
        request.attributes,
    )
    .with_description(request.description);
    product.published = request.published;

    state.catalog.insert(&product).await?;

    info!(product_id = %product.id, category = %product.category(), "created product");

    Ok(respond(product, "Create new product successfully"))
}

/// Partial update (admin); attribute updates stay within the tagged set
#[instrument(skip(state, auth, patch))]
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    let product = state.catalog.update(&product_id, &patch).await?;
    Ok(respond(product, "Patch update product by Id successfully"))
}

#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub stock: u32,
}

/// Absolute stock set after a sale (admin)
#[instrument(skip(state, auth, request))]
pub async fn set_stock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(request): Json<SetStockRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    let product = state.catalog.set_stock(&product_id, request.stock).await?;
    Ok(respond(product, "Product quantity updated successfully"))
}
