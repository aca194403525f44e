//! Organization profile routes.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use orgkas_db::OrganizationRepository;
use orgkas_db::repositories::{OrganizationInput, db_app_error};
use orgkas_shared::AppError;
use serde_json::{Value, json};

use crate::error::{ApiResult, saved};
use crate::{AppState, middleware::AuthUser};

/// Creates the organization routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/organization", get(get_organization).put(save_organization))
}

/// GET /organization - The current profile, `{}` when none is saved.
async fn get_organization(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let current = OrganizationRepository::new(state.conn())
        .current()
        .await
        .map_err(|e| db_app_error(&e))?;
    let body = match current {
        Some(org) => serde_json::to_value(org).map_err(|e| AppError::Internal(e.to_string()))?,
        None => json!({}),
    };
    Ok(Json::<Value>(body))
}

/// PUT /organization - Save the profile (admin only).
async fn save_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<OrganizationInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Nama organisasi wajib diisi".to_string()).into());
    }
    let org = OrganizationRepository::new(state.conn())
        .save(payload)
        .await
        .map_err(|e| db_app_error(&e))?;
    saved(StatusCode::OK, "Data organisasi berhasil disimpan", &org)
}
