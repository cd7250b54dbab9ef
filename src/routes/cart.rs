use axum::{
    Router,
    extract::{Path, State},
    response::Redirect,
    routing::get,
};

use crate::{
    error::AppResult,
    middleware::auth::RequireUser,
    routes::parse_id,
    services::{cart_service, order_service},
    state::AppState,
    views::StorefrontTemplate,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add/{id}/", get(add_to_cart))
        .route("/cart/", get(cart))
        .route("/checkout/", get(checkout))
}

#[utoipa::path(
    get,
    path = "/add/{id}/",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 303, description = "Item added, redirect to the cart"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let id = parse_id(&id, "product")?;
    cart_service::add_to_cart(&state, &user, id).await?;
    Ok(Redirect::to("/cart/"))
}

#[utoipa::path(
    get,
    path = "/cart/",
    responses(
        (status = 200, description = "Cart contents", body = String, content_type = "text/html"),
        (status = 303, description = "Not signed in, redirect to login"),
    ),
    tag = "Cart"
)]
pub async fn cart(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> AppResult<StorefrontTemplate> {
    let cart = cart_service::view_cart(&state, &user).await?;
    Ok(StorefrontTemplate::cart(user, cart))
}

#[utoipa::path(
    get,
    path = "/checkout/",
    responses(
        (status = 200, description = "Order completed", body = String, content_type = "text/html"),
        (status = 404, description = "No open order to check out"),
    ),
    tag = "Cart"
)]
pub async fn checkout(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> AppResult<StorefrontTemplate> {
    let order = order_service::checkout(&state, &user).await?;
    Ok(StorefrontTemplate::checkout(user, order))
}
