use rust_decimal::Decimal;
use shopyaar::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    services::{
        auth_service::hash_password,
        product_service::{self, NewProduct},
    },
    state::AppState,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let state = AppState::new(pool);
    let user_id = ensure_user(&state, "demo", "demo12345").await?;
    seed_products(&state).await?;

    println!("Seed completed. Demo user ID: {user_id}");
    Ok(())
}

async fn ensure_user(state: &AppState, username: &str, password: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (username) DO UPDATE SET password_hash = EXCLUDED.password_hash
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .fetch_one(&state.pool)
    .await?;

    println!("Ensured user {username}");
    Ok(row.0)
}

async fn seed_products(state: &AppState) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(&state.pool)
        .await?;
    if existing.0 > 0 {
        println!("Products already present, skipping");
        return Ok(());
    }

    let products = vec![
        ("Masala Chai Tin", "Loose-leaf black tea with cardamom and ginger", 1299),
        ("Brass Tumbler", "Hand-finished brass tumbler, 300 ml", 2450),
        ("Block-Print Tote", "Cotton tote bag with a hand block-printed border", 1800),
        ("Sandalwood Soap", "Cold-process soap bar scented with sandalwood", 650),
    ];

    for (name, description, cents) in products {
        product_service::create_product(
            state,
            NewProduct {
                name: name.to_string(),
                description: description.to_string(),
                price: Decimal::new(cents, 2),
            },
        )
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
