//! Database seeding binary.
//!
//! Idempotent: creates the first admin account and a starter catalog only
//! when the corresponding tables are empty, so it is safe to run on every
//! deploy.
//!
//! ## Usage
//! ```bash
//! DATABASE_PATH=velora.db SEED_ADMIN_PASSWORD=... cargo run --bin seed
//! ```

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use velora_api::auth::hash_password;
use velora_api::config::ApiConfig;
use velora_core::Product;
use velora_db::{Database, DbConfig, User};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::load()?;
    let db = Database::new(DbConfig::new(&config.database_path)).await?;

    seed_admin(&db).await?;
    seed_catalog(&db).await?;

    db.close().await;
    Ok(())
}

async fn seed_admin(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    if db.users().count().await? > 0 {
        info!("Users already present, skipping admin seed");
        return Ok(());
    }

    let username =
        std::env::var("SEED_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password = match std::env::var("SEED_ADMIN_PASSWORD") {
        Ok(p) => p,
        Err(_) => {
            warn!("SEED_ADMIN_PASSWORD not set, using development default");
            "admin-dev-password".to_string()
        }
    };

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.clone(),
        password_hash: hash_password(&password).map_err(|e| e.message)?,
        role: "admin".to_string(),
        created_at: Utc::now(),
    };

    db.users().insert(&user).await?;
    info!(username = %username, "Admin account seeded");
    Ok(())
}

async fn seed_catalog(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    if db.products().count().await? > 0 {
        info!("Catalog already present, skipping product seed");
        return Ok(());
    }

    let samples: [(&str, &str, i64, &str, i64, &[&str]); 4] = [
        (
            "Linen Shirt",
            "Breathable linen shirt for warm days",
            5500,
            "shirts",
            20,
            &["S", "M", "L", "XL"],
        ),
        (
            "Wool Scarf",
            "Hand-woven merino scarf",
            3200,
            "accessories",
            35,
            &[],
        ),
        (
            "Canvas Tote",
            "Heavy canvas tote with inner pocket",
            2400,
            "bags",
            50,
            &[],
        ),
        (
            "Denim Jacket",
            "Classic raw denim jacket",
            9800,
            "outerwear",
            12,
            &["S", "M", "L"],
        ),
    ];

    let now = Utc::now();
    for (name, description, price_cents, category, stock, sizes) in samples {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            price_cents,
            category: Some(category.to_string()),
            stock,
            image: None,
            sizes: sizes.iter().map(|s| s.to_string()).collect(),
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;
        info!(name = %name, stock = stock, "Product seeded");
    }

    Ok(())
}
