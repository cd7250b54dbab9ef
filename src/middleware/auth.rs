use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::CurrentUser;

/// Session key holding the signed-in [`CurrentUser`].
pub const CURRENT_USER_KEY: &str = "current_user";

pub const LOGIN_PATH: &str = "/login/";

/// Extractor for routes that need a signed-in user.
///
/// Anonymous requests are redirected to the login page with the original path in `next`.
#[derive(Debug, Clone)]
pub struct RequireUser(pub CurrentUser);

/// Extractor that yields the signed-in user when there is one.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

#[derive(Debug)]
pub enum AuthRejection {
    RedirectToLogin { next: String },
    MissingSessionLayer,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&login_url(&next)).into_response(),
            Self::MissingSessionLayer => {
                tracing::error!("session layer is not installed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

pub fn login_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

async fn current_user(session: &Session) -> Option<CurrentUser> {
    match session.get::<CurrentUser>(CURRENT_USER_KEY).await {
        Ok(user) => user,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read session, treating request as anonymous");
            None
        }
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSessionLayer)?;

        match current_user(session).await {
            Some(user) => Ok(Self(user)),
            None => Err(AuthRejection::RedirectToLogin {
                next: parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string()),
            }),
        }
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };
        Ok(Self(user))
    }
}

/// Sign a user in. The session id is rotated first so a pre-login id cannot be reused.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(CURRENT_USER_KEY, user).await
}

/// Sign out by dropping the whole session.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
