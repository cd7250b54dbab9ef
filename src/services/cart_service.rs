use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    dto::cart::{CartLine, CartView},
    entity::{
        OrderItems, Orders, Products, order_items,
        orders::{Column as OrderCol, Model as OrderModel},
    },
    error::{AppError, AppResult},
    models::{CurrentUser, Order, OrderItem},
    state::AppState,
};

/// Attempts before giving up on a get-or-create that keeps racing a concurrent checkout.
const OPEN_ORDER_ATTEMPTS: usize = 3;

pub async fn find_open_order(state: &AppState, user_id: Uuid) -> AppResult<Option<Order>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user_id))
                .add(OrderCol::Completed.eq(false)),
        )
        .one(&state.orm)
        .await?
        .map(order_from_entity);
    Ok(order)
}

/// Fetch the user's open order, inserting an empty one when there is none.
///
/// The partial unique index on `orders(user_id) WHERE NOT completed` turns a
/// concurrent insert into a no-op, after which the winner's row is re-read.
pub async fn get_or_create_open_order(state: &AppState, user_id: Uuid) -> AppResult<Order> {
    for _ in 0..OPEN_ORDER_ATTEMPTS {
        if let Some(order) = find_open_order(state, user_id).await? {
            return Ok(order);
        }

        let inserted: Option<Order> = sqlx::query_as(
            r#"
            INSERT INTO orders (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) WHERE NOT completed DO NOTHING
            RETURNING id, user_id, created_at, completed
            "#,
        )
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?;

        if let Some(order) = inserted {
            tracing::debug!(order_id = order.id, %user_id, "opened new cart");
            return Ok(order);
        }
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "could not open a cart for user {user_id}"
    )))
}

/// Put one more unit of a product into the user's cart.
pub async fn add_to_cart(
    state: &AppState,
    user: &CurrentUser,
    product_id: i32,
) -> AppResult<OrderItem> {
    let product_exist = Products::find_by_id(product_id).one(&state.orm).await?;
    if product_exist.is_none() {
        return Err(AppError::NotFound(format!("product {product_id}")));
    }

    let order = get_or_create_open_order(state, user.id).await?;

    // the increment happens in the row lock of the upsert, so concurrent adds all count
    let item: OrderItem = sqlx::query_as(
        r#"
        INSERT INTO order_items (order_id, product_id, quantity)
        VALUES ($1, $2, 1)
        ON CONFLICT (order_id, product_id)
        DO UPDATE SET quantity = order_items.quantity + 1
        RETURNING id, order_id, product_id, quantity
        "#,
    )
    .bind(order.id)
    .bind(product_id)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(
        user_id = %user.id,
        order_id = order.id,
        product_id,
        quantity = item.quantity,
        "cart updated"
    );

    Ok(item)
}

pub async fn view_cart(state: &AppState, user: &CurrentUser) -> AppResult<CartView> {
    let order = get_or_create_open_order(state, user.id).await?;
    let lines = load_lines(state, order.id).await?;
    Ok(CartView { order, lines })
}

pub async fn load_lines(state: &AppState, order_id: i32) -> AppResult<Vec<CartLine>> {
    let rows = OrderItems::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .order_by_asc(order_items::Column::Id)
        .find_also_related(Products)
        .all(&state.orm)
        .await?;

    let lines = rows
        .into_iter()
        .filter_map(|(item, product)| {
            let product = product?;
            Some(CartLine {
                item_id: item.id,
                product_id: product.id,
                name: product.name,
                unit_price: product.price,
                quantity: item.quantity,
            })
        })
        .collect();
    Ok(lines)
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        created_at: to_utc(model.created_at),
        completed: model.completed,
    }
}

fn to_utc(value: sea_orm::prelude::DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}
