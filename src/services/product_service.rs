use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

use crate::{
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    models::Product,
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

pub async fn list_products(state: &AppState) -> AppResult<Vec<Product>> {
    let items = Products::find()
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();
    Ok(items)
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<Product> {
    let result = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);
    match result {
        Some(p) => Ok(p),
        None => Err(AppError::NotFound(format!("product {id}"))),
    }
}

pub async fn create_product(state: &AppState, payload: NewProduct) -> AppResult<Product> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("product name is required".into()));
    }
    if payload.price.is_sign_negative() {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }

    let active = ActiveModel {
        id: NotSet,
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price.round_dp(2)),
        created_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;
    tracing::debug!(product_id = product.id, "product created");

    Ok(product_from_entity(product))
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
