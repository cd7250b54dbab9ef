use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    dto::auth::ValidRegistration,
    entity::{Users, users},
    error::{AppError, AppResult},
    models::User,
    state::AppState,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username already taken")]
    UsernameTaken,

    #[error("invalid username or password")]
    InvalidCredentials,
}

pub async fn register_user(state: &AppState, payload: ValidRegistration) -> AppResult<User> {
    let ValidRegistration { username, password } = payload;
    let exist: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE lower(username) = lower($1)")
            .bind(username.as_str())
            .fetch_optional(&state.pool)
            .await?;

    if exist.is_some() {
        return Err(AuthError::UsernameTaken.into());
    }

    let password_hash = hash_password(&password)?;

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, username, password_hash, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username.as_str())
    .bind(password_hash)
    .fetch_one(&state.pool)
    .await
    .map_err(|err| match &err {
        // lost a race with a concurrent registration for the same name
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::from(AuthError::UsernameTaken)
        }
        _ => AppError::from(err),
    })?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

pub async fn authenticate(state: &AppState, username: &str, password: &str) -> AppResult<User> {
    let user = Users::find()
        .filter(users::Column::Username.eq(username.trim()))
        .one(&state.orm)
        .await?
        .map(user_from_entity);

    let user = match user {
        Some(u) => u,
        None => return Err(AuthError::InvalidCredentials.into()),
    };

    if !verify_password(password, &user.password_hash)? {
        tracing::debug!(username = %user.username, "password mismatch");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(user)
}

fn user_from_entity(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        password_hash: model.password_hash,
        created_at: model.created_at.with_timezone(&chrono::Utc),
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_the_original_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_internal_error() {
        let err = verify_password("pw", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
