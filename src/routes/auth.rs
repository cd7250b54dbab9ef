use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::{
    dto::auth::{FormErrors, INVALID_LOGIN, LoginForm, NextQuery, RegisterForm, USERNAME_TAKEN, safe_next},
    error::{AppError, AppResult},
    middleware::auth::{OptionalUser, clear_current_user, set_current_user},
    models::CurrentUser,
    services::auth_service::{self, AuthError},
    state::AppState,
    views::{AuthFormView, AuthMode, StorefrontTemplate},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register/", get(register_form).post(register))
        .route("/login/", get(login_form).post(login))
        .route("/logout/", post(logout))
}

#[utoipa::path(
    get,
    path = "/register/",
    responses(
        (status = 200, description = "Registration form", body = String, content_type = "text/html")
    ),
    tag = "Auth"
)]
pub async fn register_form(OptionalUser(user): OptionalUser) -> StorefrontTemplate {
    StorefrontTemplate::auth(user, AuthFormView::blank(AuthMode::Register, None))
}

#[utoipa::path(
    post,
    path = "/register/",
    responses(
        (status = 303, description = "Account created and signed in, redirect home"),
        (status = 200, description = "Form re-rendered with errors", body = String, content_type = "text/html"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let rerender = |errors: FormErrors| {
        let view = AuthFormView {
            mode: AuthMode::Register,
            username: form.username.trim().to_string(),
            next: None,
            errors,
        };
        StorefrontTemplate::auth(user.clone(), view).into_response()
    };

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return Ok(rerender(errors)),
    };

    let created = match auth_service::register_user(&state, valid).await {
        Ok(created) => created,
        Err(AppError::Auth(AuthError::UsernameTaken)) => {
            let errors = FormErrors {
                username: vec![USERNAME_TAKEN.to_string()],
                ..FormErrors::default()
            };
            return Ok(rerender(errors));
        }
        Err(err) => return Err(err),
    };

    set_current_user(&session, &CurrentUser::from(&created)).await?;
    Ok(Redirect::to("/").into_response())
}

#[utoipa::path(
    get,
    path = "/login/",
    params(
        ("next" = Option<String>, Query, description = "Path to return to after signing in")
    ),
    responses(
        (status = 200, description = "Login form", body = String, content_type = "text/html")
    ),
    tag = "Auth"
)]
pub async fn login_form(
    OptionalUser(user): OptionalUser,
    Query(query): Query<NextQuery>,
) -> StorefrontTemplate {
    StorefrontTemplate::auth(user, AuthFormView::blank(AuthMode::Login, query.next))
}

#[utoipa::path(
    post,
    path = "/login/",
    responses(
        (status = 303, description = "Signed in, redirect to `next` or home"),
        (status = 200, description = "Form re-rendered with errors", body = String, content_type = "text/html"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let rerender = |errors: FormErrors| {
        let view = AuthFormView {
            mode: AuthMode::Login,
            username: form.username.trim().to_string(),
            next: form.next.clone(),
            errors,
        };
        StorefrontTemplate::auth(user.clone(), view).into_response()
    };

    if form.username.trim().is_empty() || form.password.is_empty() {
        return Ok(rerender(FormErrors::non_field(INVALID_LOGIN)));
    }

    let account = match auth_service::authenticate(&state, &form.username, &form.password).await {
        Ok(account) => account,
        Err(AppError::Auth(AuthError::InvalidCredentials)) => {
            return Ok(rerender(FormErrors::non_field(INVALID_LOGIN)));
        }
        Err(err) => return Err(err),
    };

    set_current_user(&session, &CurrentUser::from(&account)).await?;
    tracing::info!(user_id = %account.id, "user signed in");

    let target = safe_next(form.next.as_deref());
    Ok(Redirect::to(target).into_response())
}

#[utoipa::path(
    post,
    path = "/logout/",
    responses(
        (status = 303, description = "Signed out, redirect home")
    ),
    tag = "Auth"
)]
pub async fn logout(session: Session) -> AppResult<Redirect> {
    clear_current_user(&session).await?;
    Ok(Redirect::to("/"))
}
