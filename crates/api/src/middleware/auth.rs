//! Authentication middleware and role guards.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use orgkas_core::auth::UserRole;
use orgkas_core::template::UserInfo;
use orgkas_shared::{AppError, Claims, JwtError};

use crate::AppState;
use crate::error::{ApiError, ApiResult};

/// Name of the cookie carrying the session token for page routes.
pub const TOKEN_COOKIE: &str = "token";

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Finds the token in the Authorization header, then in the `token` cookie.
fn find_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token);
    if let Some(token) = bearer {
        return Some(token.to_string());
    }
    CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Claims, AppError> {
    let token = find_token(headers).ok_or_else(|| {
        AppError::Unauthorized("Bearer token or login cookie is required".to_string())
    })?;
    state.jwt_service.validate_token(&token).map_err(|e| match e {
        JwtError::Expired => AppError::Unauthorized("Token has expired".to_string()),
        _ => AppError::Unauthorized("Invalid or malformed token".to_string()),
    })
}

/// Authentication middleware for JSON routes.
///
/// Validates the token and stores the claims in request extensions.
/// Missing or invalid tokens are answered with `401`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => ApiError(e).into_response(),
    }
}

/// Authentication middleware for HTML pages.
///
/// Same as [`auth_middleware`], but sends anonymous visitors to `/login`.
pub async fn page_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(_) => Redirect::to("/login").into_response(),
    }
}

/// Extractor for authenticated user claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> i32 {
        self.0.user_id()
    }

    /// Returns the user's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the user's role, `None` for a role this build does not know.
    #[must_use]
    pub fn role(&self) -> Option<UserRole> {
        self.0.role.parse().ok()
    }

    /// Returns true for a regular member restricted to their own records.
    #[must_use]
    pub fn is_member(&self) -> bool {
        self.role().is_some_and(|r| r.is_member())
    }

    /// The user as shown on pages.
    #[must_use]
    pub fn user_info(&self) -> UserInfo {
        UserInfo::new(self.0.name.clone(), self.0.role.clone())
    }

    /// Fails with `403` unless the role passes `allowed`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when the role is not allowed.
    pub fn require(&self, allowed: impl Fn(UserRole) -> bool) -> ApiResult<()> {
        if self.role().is_some_and(allowed) {
            Ok(())
        } else {
            Err(ApiError(AppError::Forbidden("Akses ditolak".to_string())))
        }
    }

    /// Admin only.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for other roles.
    pub fn require_admin(&self) -> ApiResult<()> {
        self.require(|r| r.can_manage_users())
    }

    /// Admin or pengurus.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for other roles.
    pub fn require_records(&self) -> ApiResult<()> {
        self.require(|r| r.can_manage_records())
    }

    /// Admin, pengurus or tentor.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for other roles.
    pub fn require_scorer(&self) -> ApiResult<()> {
        self.require(|r| r.can_score())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError(AppError::Unauthorized("Authentication required".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::COOKIE};

    #[test]
    fn test_bearer_prefix() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; token=from-cookie"));
        assert_eq!(find_token(&headers).as_deref(), Some("from-cookie"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(find_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_role_guards() {
        let user = |role: &str| {
            AuthUser(Claims::new(1, "u", "U", role, chrono::Utc::now()))
        };

        assert!(user("admin").require_admin().is_ok());
        assert!(user("pengurus").require_admin().is_err());
        assert!(user("pengurus").require_records().is_ok());
        assert!(user("tentor").require_records().is_err());
        assert!(user("tentor").require_scorer().is_ok());
        assert!(user("user").require_scorer().is_err());
        assert!(user("owner").require(|_| true).is_err());
        assert!(user("user").is_member());
    }
}
