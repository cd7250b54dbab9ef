use rust_decimal::Decimal;
use shopyaar::{
    db::{create_pool, run_migrations},
    dto::auth::ValidRegistration,
    error::AppError,
    models::{CurrentUser, Product},
    services::{
        auth_service::{self, AuthError},
        cart_service, order_service,
        product_service::{self, NewProduct},
    },
    state::AppState,
};
use uuid::Uuid;

// These flows need Postgres; they skip when no database is configured.
fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run cart flow tests.");
            None
        }
    }
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    Ok(AppState::new(pool))
}

async fn create_shopper(state: &AppState) -> anyhow::Result<CurrentUser> {
    let user = auth_service::register_user(
        state,
        ValidRegistration {
            username: format!("shopper-{}", Uuid::new_v4().simple()),
            password: "pw-for-tests".into(),
        },
    )
    .await?;
    Ok(CurrentUser::from(&user))
}

async fn create_product(state: &AppState, name: &str, cents: i64) -> anyhow::Result<Product> {
    let product = product_service::create_product(
        state,
        NewProduct {
            name: name.to_string(),
            description: format!("{name} for testing"),
            price: Decimal::new(cents, 2),
        },
    )
    .await?;
    Ok(product)
}

#[tokio::test]
async fn adding_twice_increments_one_line_and_totals_add_up() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let user = create_shopper(&state).await?;
    let mug = create_product(&state, "Test Mug", 1000).await?;
    let coaster = create_product(&state, "Test Coaster", 500).await?;

    let first = cart_service::add_to_cart(&state, &user, mug.id).await?;
    assert_eq!(first.quantity, 1);
    let second = cart_service::add_to_cart(&state, &user, mug.id).await?;
    assert_eq!(second.id, first.id, "same product must reuse the order item");
    assert_eq!(second.quantity, 2);
    cart_service::add_to_cart(&state, &user, coaster.id).await?;

    let rows: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM order_items WHERE order_id = $1 AND product_id = $2",
    )
    .bind(first.order_id)
    .bind(mug.id)
    .fetch_one(&state.pool)
    .await?;
    assert_eq!(rows.0, 1);

    let cart = cart_service::view_cart(&state, &user).await?;
    assert_eq!(cart.order.id, first.order_id);
    assert_eq!(cart.lines.len(), 2);
    assert_eq!(cart.total_price(), Decimal::new(2500, 2));
    assert_eq!(cart.total_display(), "25.00");

    Ok(())
}

#[tokio::test]
async fn checkout_completes_order_and_next_cart_is_fresh() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let user = create_shopper(&state).await?;
    let tote = create_product(&state, "Test Tote", 1800).await?;

    let item = cart_service::add_to_cart(&state, &user, tote.id).await?;
    let placed = order_service::checkout(&state, &user).await?;
    assert_eq!(placed.order.id, item.order_id);
    assert!(placed.order.completed);
    assert_eq!(placed.total_display(), "18.00");

    assert!(cart_service::find_open_order(&state, user.id).await?.is_none());

    let fresh = cart_service::view_cart(&state, &user).await?;
    assert_ne!(fresh.order.id, item.order_id);
    assert!(!fresh.order.completed);
    assert!(fresh.is_empty());

    Ok(())
}

#[tokio::test]
async fn checkout_without_open_order_is_not_found() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let user = create_shopper(&state).await?;

    let err = order_service::checkout(&state, &user).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn unknown_product_is_not_added() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let user = create_shopper(&state).await?;

    let err = cart_service::add_to_cart(&state, &user, i32::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(cart_service::find_open_order(&state, user.id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn concurrent_adds_are_all_counted() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let user = create_shopper(&state).await?;
    let soap = create_product(&state, "Test Soap", 650).await?;

    let product_id = soap.id;
    let mut handles = Vec::new();
    for _ in 0..8 {
        let state = state.clone();
        let user = user.clone();
        handles.push(tokio::spawn(async move {
            cart_service::add_to_cart(&state, &user, product_id).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let open: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1 AND NOT completed")
            .bind(user.id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(open.0, 1, "exactly one open order per user");

    let cart = cart_service::view_cart(&state, &user).await?;
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].quantity, 8);

    Ok(())
}

#[tokio::test]
async fn taken_username_creates_no_second_user() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let username = format!("dup-{}", Uuid::new_v4().simple());

    auth_service::register_user(
        &state,
        ValidRegistration {
            username: username.clone(),
            password: "first".into(),
        },
    )
    .await?;

    let err = auth_service::register_user(
        &state,
        ValidRegistration {
            username: username.clone(),
            password: "second".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::UsernameTaken)));

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(&username)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(count.0, 1);

    let signed_in = auth_service::authenticate(&state, &username, "first").await?;
    assert_eq!(signed_in.username, username);
    let err = auth_service::authenticate(&state, &username, "second")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::InvalidCredentials)));

    Ok(())
}

#[tokio::test]
async fn username_taken_ignores_case() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let username = format!("Mixed-{}", Uuid::new_v4().simple());

    auth_service::register_user(
        &state,
        ValidRegistration {
            username: username.clone(),
            password: "first".into(),
        },
    )
    .await?;

    let err = auth_service::register_user(
        &state,
        ValidRegistration {
            username: username.to_lowercase(),
            password: "second".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::UsernameTaken)));

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE lower(username) = lower($1)")
        .bind(&username)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(count.0, 1);

    Ok(())
}
