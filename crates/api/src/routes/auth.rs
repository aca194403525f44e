//! Authentication routes for login and logout.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use orgkas_core::auth::verify_password;
use orgkas_db::UserRepository;
use orgkas_db::repositories::db_app_error;
use orgkas_shared::{AppError, Outcome};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::AppState;
use crate::error::{ApiResult, done};
use crate::middleware::TOKEN_COOKIE;

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Data returned by a successful login.
#[derive(Debug, Serialize)]
pub struct LoginData {
    /// Signed token, also set as the `token` cookie.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// User ID.
    pub id: i32,
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: String,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Username atau password salah".to_string())
}

/// POST /auth/login - Verify credentials, return a token and set the cookie.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_repo = UserRepository::new(state.conn());

    let Some(user) = user_repo
        .find_by_username(&payload.username)
        .await
        .map_err(|e| db_app_error(&e))?
    else {
        info!(username = %payload.username, "Login attempt for non-existent user");
        return Err(invalid_credentials().into());
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = user.id, "Failed login attempt - invalid password");
            return Err(invalid_credentials().into());
        }
        Err(e) => {
            error!(user_id = user.id, error = %e, "Password verification error");
            return Err(invalid_credentials().into());
        }
    }

    let token = state
        .jwt_service
        .generate_token(user.id, &user.username, &user.name, &user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!(user_id = user.id, role = %user.role, "User logged in successfully");

    let cookie = Cookie::build((TOKEN_COOKIE, token.clone()))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax);
    let data = LoginData {
        token,
        expires_in: state.jwt_service.expires_in(),
        id: user.id,
        username: user.username,
        name: user.name,
        role: user.role,
    };
    let value = serde_json::to_value(&data).map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        jar.add(cookie),
        Json(Outcome::with_data("Login berhasil", value)),
    ))
}

/// POST /auth/logout - Clear the login cookie.
async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(TOKEN_COOKIE).path("/")),
        done("Logout berhasil"),
    )
}
