//! User management routes (admin only).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use orgkas_core::auth::{UserRole, hash_password};
use orgkas_db::UserRepository;
use orgkas_db::repositories::{UserInput, db_app_error};
use orgkas_shared::AppError;
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiResult, done, saved};
use crate::{AppState, middleware::AuthUser};

/// Creates the user routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/users/{id}/password", put(change_password))
}

/// Body for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Login name.
    pub username: String,
    /// Display name; also how the user is matched to a member record.
    pub name: String,
    /// Role.
    pub role: UserRole,
    /// Initial password.
    pub password: String,
}

/// Body for changing a password.
#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    /// New password.
    pub password: String,
}

fn hash(password: &str) -> ApiResult<String> {
    if password.is_empty() {
        return Err(AppError::Validation("Password wajib diisi".to_string()).into());
    }
    Ok(hash_password(password).map_err(|e| AppError::Internal(e.to_string()))?)
}

/// GET /users - All users by username.
async fn list_users(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let users = UserRepository::new(state.conn())
        .list()
        .await
        .map_err(|e| db_app_error(&e))?;
    Ok(Json(users))
}

/// POST /users - Create a login account.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let password_hash = hash(&payload.password)?;
    let input = UserInput {
        username: payload.username,
        name: payload.name,
        role: payload.role,
    };
    let user = UserRepository::new(state.conn())
        .create(input, &password_hash)
        .await?;
    saved(StatusCode::CREATED, "User berhasil ditambahkan", &user)
}

/// GET `/users/{id}` - One user.
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    Ok(Json(UserRepository::new(state.conn()).find_by_id(id).await?))
}

/// PUT `/users/{id}` - Change username, name or role.
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UserInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let user = UserRepository::new(state.conn()).update(id, payload).await?;
    saved(StatusCode::OK, "User berhasil diperbarui", &user)
}

/// PUT `/users/{id}/password` - Set a new password.
async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<PasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let password_hash = hash(&payload.password)?;
    UserRepository::new(state.conn())
        .set_password(id, &password_hash)
        .await?;
    info!(user_id = id, changed_by = auth.user_id(), "Password changed");
    Ok(done("Password berhasil diubah"))
}

/// DELETE `/users/{id}` - Remove an account other than the caller's own.
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    if auth.user_id() == id {
        return Err(AppError::Validation("Tidak dapat menghapus akun sendiri".to_string()).into());
    }
    UserRepository::new(state.conn()).delete(id).await?;
    Ok(done("User berhasil dihapus"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use orgkas_core::auth::UserRole;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_user_lifecycle() {
        let app = TestApp::new().await;
        let admin = app.login_as("admin", "Admin", UserRole::Admin).await;

        let (status, body) = app
            .send(
                "POST",
                "/api/v1/users",
                Some(admin.as_str()),
                Some(json!({ "username": "tono", "name": "Tono", "role": "tentor", "password": "panah123" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["data"].get("password_hash").is_none());
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, _) = app
            .send(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(json!({ "username": "tono", "password": "panah123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .send(
                "PUT",
                &format!("/api/v1/users/{id}/password"),
                Some(admin.as_str()),
                Some(json!({ "password": "baru456" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .send(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(json!({ "username": "tono", "password": "panah123" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app
            .send(
                "PUT",
                &format!("/api/v1/users/{id}"),
                Some(admin.as_str()),
                Some(json!({ "username": "tono", "name": "Tono S", "role": "pengurus" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["role"], "pengurus");

        let (_, users) = app.send("GET", "/api/v1/users", Some(admin.as_str()), None).await;
        assert_eq!(users.as_array().unwrap().len(), 2);

        let (status, _) = app
            .send("DELETE", &format!("/api/v1/users/{id}"), Some(admin.as_str()), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app
            .send("GET", &format!("/api/v1/users/{id}"), Some(admin.as_str()), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_guards() {
        let app = TestApp::new().await;
        let admin = app.login_as("admin", "Admin", UserRole::Admin).await;
        let staff = app.login_as("sari", "Sari", UserRole::Pengurus).await;

        let (status, _) = app.send("GET", "/api/v1/users", Some(staff.as_str()), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .send(
                "POST",
                "/api/v1/users",
                Some(admin.as_str()),
                Some(json!({ "username": "sari", "name": "Sari", "role": "user", "password": "x" })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = app
            .send(
                "POST",
                "/api/v1/users",
                Some(admin.as_str()),
                Some(json!({ "username": "rina", "name": "Rina", "role": "user", "password": "" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, users) = app.send("GET", "/api/v1/users", Some(admin.as_str()), None).await;
        let own = users
            .as_array()
            .unwrap()
            .iter()
            .find(|u| u["username"] == "admin")
            .unwrap()["id"]
            .as_i64()
            .unwrap();
        let (status, _) = app
            .send("DELETE", &format!("/api/v1/users/{own}"), Some(admin.as_str()), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
