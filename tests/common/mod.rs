//! Shared harness for the integration tests.
//!
//! The server runs on a random port against in-memory repositories, so
//! these tests need no database.

#![allow(dead_code)]

use async_trait::async_trait;
use chirpy::auth::RefreshToken;
use chirpy::configuration::{ApplicationSettings, AuthSettings, Platform};
use chirpy::error::DatabaseError;
use chirpy::models::{Chirp, RefreshTokenRecord, SortOrder, User};
use chirpy::repository::{ChirpRepository, RefreshTokenRepository, UserRepository};
use chirpy::startup::{run, Repositories};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<Vec<User>>,
    tokens: Mutex<HashMap<String, RefreshTokenRecord>>,
    chirps: Mutex<Vec<Chirp>>,
}

impl InMemoryStore {
    pub fn refresh_token(&self, token: &str) -> Option<RefreshTokenRecord> {
        self.tokens.lock().unwrap().get(token).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, DatabaseError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(DatabaseError::UniqueConstraintViolation(email.to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, DatabaseError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email && u.id != user_id) {
            return Err(DatabaseError::UniqueConstraintViolation(email.to_string()));
        }
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| DatabaseError::NotFound("user".to_string()))?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn upgrade_to_chirpy_red(&self, user_id: Uuid) -> Result<bool, DatabaseError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all_users(&self) -> Result<(), DatabaseError> {
        self.users.lock().unwrap().clear();
        self.tokens.lock().unwrap().clear();
        self.chirps.lock().unwrap().clear();
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryStore {
    async fn create_refresh_token(
        &self,
        token: &RefreshToken,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now();
        self.tokens.lock().unwrap().insert(
            token.as_str().to_string(),
            RefreshTokenRecord {
                token: token.as_str().to_string(),
                user_id,
                created_at: now,
                updated_at: now,
                expires_at,
                revoked_at: None,
            },
        );
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token: &RefreshToken,
    ) -> Result<Option<RefreshTokenRecord>, DatabaseError> {
        Ok(self.tokens.lock().unwrap().get(token.as_str()).cloned())
    }

    async fn revoke_refresh_token(&self, token: &RefreshToken) -> Result<bool, DatabaseError> {
        match self.tokens.lock().unwrap().get_mut(token.as_str()) {
            Some(record) => {
                let now = Utc::now();
                record.revoked_at.get_or_insert(now);
                record.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ChirpRepository for InMemoryStore {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, DatabaseError> {
        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            user_id,
            body: body.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.chirps.lock().unwrap().push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(
        &self,
        author_id: Option<Uuid>,
        order: SortOrder,
    ) -> Result<Vec<Chirp>, DatabaseError> {
        let mut chirps: Vec<Chirp> = self
            .chirps
            .lock()
            .unwrap()
            .iter()
            .filter(|c| author_id.map_or(true, |id| c.user_id == id))
            .cloned()
            .collect();
        // Insertion order breaks ties between equal timestamps
        if order == SortOrder::Desc {
            chirps.reverse();
        }
        Ok(chirps)
    }

    async fn find_chirp(&self, chirp_id: Uuid) -> Result<Option<Chirp>, DatabaseError> {
        Ok(self.chirps.lock().unwrap().iter().find(|c| c.id == chirp_id).cloned())
    }

    async fn delete_chirp(&self, chirp_id: Uuid) -> Result<bool, DatabaseError> {
        let mut chirps = self.chirps.lock().unwrap();
        let before = chirps.len();
        chirps.retain(|c| c.id != chirp_id);
        Ok(chirps.len() < before)
    }
}

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub client: reqwest::Client,
}

pub fn spawn_app() -> TestApp {
    spawn_app_on(Platform::Dev)
}

pub fn spawn_app_on(platform: Platform) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let static_dir = std::env::temp_dir().join(format!("chirpy-static-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&static_dir).expect("Failed to create static dir");
    std::fs::write(static_dir.join("index.html"), "<h1>Welcome to Chirpy</h1>")
        .expect("Failed to write index.html");

    let store = Arc::new(InMemoryStore::default());
    let repositories = Repositories {
        users: store.clone(),
        refresh_tokens: store.clone(),
        chirps: store.clone(),
    };
    let application = ApplicationSettings {
        host: "127.0.0.1".to_string(),
        port,
        platform,
        static_dir: static_dir.to_string_lossy().into_owned(),
    };
    let auth = AuthSettings {
        jwt_secret: JWT_SECRET.to_string(),
        polka_key: POLKA_KEY.to_string(),
    };

    let server = run(listener, repositories, application, auth).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_user(&self, email: &str, password: &str) -> Value {
        let response = self
            .client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(201, response.status().as_u16());
        response.json().await.expect("Failed to parse user")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register and log in, returning the login body
    pub async fn signed_in_user(&self, email: &str, password: &str) -> Value {
        self.create_user(email, password).await;
        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse login response")
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
