// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use blog_backend::config::Config;
use blog_backend::error::AppError;
use blog_backend::models::user::{NewUser, Role};
use blog_backend::routes;
use blog_backend::state::AppState;
use blog_backend::store::{self, users};
use blog_backend::utils::hash::hash_password;
use blog_backend::utils::image::LocalImageHost;
use dotenvy::dotenv;
use sqlx::SqlitePool;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Open the store, retrying while the file system or volume comes up.
    let mut retry_count = 0;
    let pool = loop {
        match store::connect(&config.database_url).await {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    tracing::error!("Failed to open database after 5 retries: {}", e);
                    return Err(e.into());
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    tracing::info!("Running migrations...");
    store::migrate(&pool).await?;
    tracing::info!("Migrations applied successfully.");

    if let Err(e) = seed_admin_user(&pool, &config).await {
        tracing::error!("Failed to seed admin user: {}", e);
    }

    let images = LocalImageHost::new(&config.upload_dir, &config.public_url);

    let state = AppState {
        pool,
        config: config.clone(),
        images: Arc::new(images),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Creates the configured admin account unless its email is already taken.
async fn seed_admin_user(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let (Some(name), Some(email), Some(password)) =
        (&config.admin_name, &config.admin_email, &config.admin_password)
    else {
        return Ok(());
    };

    let email = blog_backend::models::fields::normalize_email(email);
    if users::find_by_email(pool, &email).await?.is_some() {
        return Ok(());
    }

    tracing::info!("Seeding admin user: {}", email);
    users::insert(
        pool,
        NewUser {
            name: name.clone(),
            email,
            password_hash: hash_password(password)?,
            role: Role::Admin,
        },
    )
    .await?;
    tracing::info!("Admin user created successfully.");

    Ok(())
}
