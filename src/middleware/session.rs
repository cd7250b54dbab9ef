use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore,
    cookie::{SameSite, time::Duration},
};
use tower_sessions_sqlx_store::PostgresStore;

use crate::{config::AppConfig, db::DbPool};

pub const SESSION_COOKIE_NAME: &str = "shopyaar_session";

/// Sessions expire after a week without requests.
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Postgres-backed sessions. Creates the store's schema when missing.
pub async fn create_session_layer(
    pool: &DbPool,
    config: &AppConfig,
) -> anyhow::Result<SessionManagerLayer<PostgresStore>> {
    let store = PostgresStore::new(pool.clone());
    store.migrate().await?;
    Ok(session_layer(store, config.session_secure))
}

/// Cookie settings shared by every store.
pub fn session_layer<S>(store: S, secure: bool) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
