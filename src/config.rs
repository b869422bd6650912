// src/config.rs

use std::env;
use std::path::PathBuf;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: String,

    /// Root directory of the local image host.
    pub upload_dir: PathBuf,
    /// Base URL that hosted image URLs are built from.
    pub public_url: String,
    pub max_upload_bytes: usize,

    /// When set, listing the comments of a post that has none answers 404
    /// instead of an empty list.
    pub empty_comments_not_found: bool,

    pub admin_name: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Reads the process environment. `.env` is loaded into it by `main`.
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://blog.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = parse_var("JWT_EXPIRATION", 86_400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        let public_url =
            env::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            upload_dir,
            public_url: public_url.trim_end_matches('/').to_string(),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 5 * 1024 * 1024),
            empty_comments_not_found: parse_var("EMPTY_COMMENTS_NOT_FOUND", true),
            admin_name: env::var("ADMIN_NAME").ok(),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        }
    }
}

/// Reads and parses an optional variable, falling back to `default` when the
/// variable is missing or malformed.
fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring malformed {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_var};

    #[test]
    fn missing_variable_falls_back_to_default() {
        assert_eq!(parse_var("BLOG_TEST_SURELY_UNSET_VAR", 42u64), 42);
        assert!(parse_var("BLOG_TEST_SURELY_UNSET_VAR", true));
    }

    #[test]
    fn from_env_reads_the_process_environment() {
        // SAFETY: nothing else in this test binary reads or writes JWT_SECRET.
        unsafe { std::env::set_var("JWT_SECRET", "config-test-secret") };

        let config = Config::from_env();
        assert_eq!(config.jwt_secret, "config-test-secret");
        assert!(config.max_upload_bytes > 0);
    }
}
