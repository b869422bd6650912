//! Document store on top of SQLite.
//!
//! Every entity is one row; reference lists are JSON arrays of ids kept in
//! TEXT columns. Each function here touches a single document (or performs a
//! single statement), so per-document atomicity comes from SQLite itself.
//! Cross-document consistency is handled in [`crate::integrity`].

pub mod comments;
pub mod images;
pub mod likes;
pub mod posts;
pub mod refs;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Opens a connection pool.
///
/// In-memory databases live only as long as their connection, so they get a
/// single connection that is never recycled.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    pool_options
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
}

/// Applies the embedded schema migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Generates a fresh document id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
