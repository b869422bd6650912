// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::Arc;

use blog_backend::{
    config::Config,
    models::user::{NewUser, Role},
    routes,
    state::AppState,
    store::{self, users},
    utils::{hash::hash_password, image::LocalImageHost},
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const PASSWORD: &str = "password123";

pub const POST_TEXT: &str =
    "This is the body of a blog post. It needs to be at least fifty characters long.";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub pool: SqlitePool,
    pub upload_dir: TempDir,
}

pub fn test_config(upload_dir: &TempDir) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        upload_dir: upload_dir.path().to_path_buf(),
        public_url: "http://127.0.0.1".to_string(),
        max_upload_bytes: 1024 * 1024,
        empty_comments_not_found: true,
        admin_name: None,
        admin_email: None,
        admin_password: None,
    }
}

/// A fresh in-memory store with the schema applied.
pub async fn test_pool() -> SqlitePool {
    let pool = store::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    store::migrate(&pool)
        .await
        .expect("Failed to migrate database");
    pool
}

/// Spawns the app on a random port with its own in-memory store.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let pool = test_pool().await;
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");

    let mut config = test_config(&upload_dir);
    customize(&mut config);

    let images = LocalImageHost::new(&config.upload_dir, &config.public_url);
    let state = AppState {
        pool: pool.clone(),
        config,
        images: Arc::new(images),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
        pool,
        upload_dir,
    }
}

pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

/// A logged-in account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    pub async fn register(&self, name: &str, email: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/register"))
            .json(&json!({ "name": name, "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("Register failed")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Login failed")
    }

    pub async fn token_for(&self, email: &str) -> String {
        let body: Value = self.login(email, PASSWORD).await.json().await.unwrap();
        body["data"]["token"]
            .as_str()
            .expect("Token not found")
            .to_string()
    }

    /// Registers and logs in a regular user.
    pub async fn user(&self, name: &str) -> Account {
        let email = format!("{}@example.com", unique(name));
        let registered: Value = self.register(name, &email).await.json().await.unwrap();
        let id = registered["data"]["id"].as_str().unwrap().to_string();
        let token = self.token_for(&email).await;
        Account { id, email, token }
    }

    /// Inserts an admin straight into the store and logs in.
    pub async fn admin(&self) -> Account {
        let email = format!("{}@example.com", unique("admin"));
        let user = users::insert(
            &self.pool,
            NewUser {
                name: "Admin".to_string(),
                email: email.clone(),
                password_hash: hash_password(PASSWORD).unwrap(),
                role: Role::Admin,
            },
        )
        .await
        .unwrap();
        let token = self.token_for(&email).await;
        Account {
            id: user.id,
            email,
            token,
        }
    }

    pub async fn create_post(&self, who: &Account, title: &str) -> reqwest::Response {
        self.create_post_with(who, json!({ "title": title, "text": POST_TEXT, "category": "general" }))
            .await
    }

    pub async fn create_post_with(&self, who: &Account, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/post"))
            .bearer_auth(&who.token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    /// Creates a post and returns its id.
    pub async fn post_id(&self, who: &Account) -> String {
        let body: Value = self
            .create_post(who, &unique("Post title"))
            .await
            .json()
            .await
            .unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn add_comment(&self, who: &Account, post_id: &str, text: &str) -> reqwest::Response {
        self.client
            .post(self.url("/comment"))
            .bearer_auth(&who.token)
            .json(&json!({ "postId": post_id, "comment": text }))
            .send()
            .await
            .unwrap()
    }

    /// Adds a comment and returns its id.
    pub async fn comment_id(&self, who: &Account, post_id: &str) -> String {
        let body: Value = self
            .add_comment(who, post_id, "What a great read!")
            .await
            .json()
            .await
            .unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Uploads a small PNG and returns the `{url, publicId}` the host issued.
    pub async fn upload_image(&self, who: &Account) -> Value {
        let part = reqwest::multipart::Part::bytes(b"\x89PNG\r\n\x1a\nfake".to_vec())
            .file_name("cover.png")
            .mime_str("image/png")
            .unwrap();
        let form = reqwest::multipart::Form::new().part("my_file", part);

        let response = self
            .client
            .post(self.url("/post/upload"))
            .bearer_auth(&who.token)
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        body["data"].clone()
    }

    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }
}
