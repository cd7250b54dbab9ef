use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    error::AppResult,
    middleware::auth::OptionalUser,
    routes::parse_id,
    services::product_service,
    state::AppState,
    views::StorefrontTemplate,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/product/{id}/", get(product_detail))
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Product list page", body = String, content_type = "text/html")
    ),
    tag = "Storefront"
)]
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> AppResult<StorefrontTemplate> {
    let products = product_service::list_products(&state).await?;
    Ok(StorefrontTemplate::home(user, products))
}

#[utoipa::path(
    get,
    path = "/product/{id}/",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product detail page", body = String, content_type = "text/html"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Storefront"
)]
pub async fn product_detail(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<String>,
) -> AppResult<StorefrontTemplate> {
    let id = parse_id(&id, "product")?;
    let product = product_service::get_product(&state, id).await?;
    Ok(StorefrontTemplate::product(user, product))
}
