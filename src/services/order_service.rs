use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};

use crate::{
    dto::cart::CartView,
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    error::{AppError, AppResult},
    models::CurrentUser,
    services::cart_service::{load_lines, order_from_entity},
    state::AppState,
};

/// Close the user's open order. There is no payment step and no stock change.
///
/// The partial unique index guarantees at most one open order, so the lookup
/// is either empty or exact. An empty lookup is reported as not found.
pub async fn checkout(state: &AppState, user: &CurrentUser) -> AppResult<CartView> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.id))
                .add(OrderCol::Completed.eq(false)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound("no open order to check out".into())),
    };

    let mut active: OrderActive = order.into();
    active.completed = Set(true);
    let order = active.update(&state.orm).await?;

    tracing::info!(user_id = %user.id, order_id = order.id, "order completed");

    let lines = load_lines(state, order.id).await?;
    Ok(CartView {
        order: order_from_entity(order),
        lines,
    })
}
