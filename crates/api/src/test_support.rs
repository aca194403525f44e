//! Helpers for route tests: an app over a migrated in-memory database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use orgkas_core::auth::UserRole;
use orgkas_core::template::MemoryLayoutSource;
use orgkas_db::migration::{Migrator, MigratorTrait};
use orgkas_db::repositories::{UserInput, UserRepository};
use orgkas_shared::JwtService;
use serde_json::Value;
use tower::ServiceExt;

use crate::{AppState, create_router};

pub(crate) const TEST_SECRET: &str = "route-test-secret";

pub(crate) struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_layouts(MemoryLayoutSource::new()).await
    }

    pub async fn with_layouts(layouts: MemoryLayoutSource) -> Self {
        let db = orgkas_db::connect("sqlite::memory:", 1, 1)
            .await
            .expect("Failed to open in-memory database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");

        let state = AppState::new(db, JwtService::new(TEST_SECRET, 3600), Arc::new(layouts));
        let router = create_router(state.clone());
        Self { state, router }
    }

    /// Creates a login account and returns a token for it.
    pub async fn login_as(&self, username: &str, name: &str, role: UserRole) -> String {
        let hash = orgkas_core::auth::hash_password("secret").expect("hash");
        let user = UserRepository::new(self.state.conn())
            .create(
                UserInput {
                    username: username.to_string(),
                    name: name.to_string(),
                    role,
                },
                &hash,
            )
            .await
            .expect("Failed to create user");
        self.state
            .jwt_service
            .generate_token(user.id, &user.username, &user.name, &user.role)
            .expect("token")
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(method, uri, token, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }
}
