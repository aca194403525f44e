//! Dues (iuran) routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use orgkas_db::DuesRepository;
use orgkas_db::repositories::{DuesFilter, DuesInput};
use serde_json::json;

use super::members::own_member;
use crate::error::{ApiResult, done, saved};
use crate::{AppState, middleware::AuthUser};

/// Creates the dues routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dues", get(list_dues).post(create_dues))
        .route("/dues/mine", get(my_dues))
        .route(
            "/dues/{id}",
            get(get_dues).put(update_dues).delete(delete_dues),
        )
}

fn repo(state: &AppState) -> DuesRepository {
    DuesRepository::new(state.conn(), state.ledger_gate.clone())
}

/// GET /dues - Dues rows, newest period first.
async fn list_dues(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<DuesFilter>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    Ok(Json(repo(&state).list(&filter).await?))
}

/// GET /dues/mine - Dues of the member matching the caller's name.
async fn my_dues(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let member = own_member(&state, &auth).await?;
    let filter = DuesFilter {
        member_id: Some(member.id),
        ..DuesFilter::default()
    };
    let dues = repo(&state).list(&filter).await?;
    Ok(Json(json!({ "member": member, "dues": dues })))
}

/// GET `/dues/{id}` - One dues row.
async fn get_dues(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    Ok(Json(repo(&state).find(id).await?))
}

/// POST /dues - Record dues; a paid row is posted to the cashbook.
async fn create_dues(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<DuesInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let row = repo(&state).create(payload).await?;
    saved(StatusCode::CREATED, "Data iuran berhasil ditambahkan", &row)
}

/// PUT `/dues/{id}` - Replace dues; status and amount changes are posted.
async fn update_dues(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<DuesInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let row = repo(&state).update(id, payload).await?;
    saved(StatusCode::OK, "Data iuran berhasil diupdate", &row)
}

/// DELETE `/dues/{id}` - Remove dues; a paid row is reversed.
async fn delete_dues(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    repo(&state).delete(id).await?;
    Ok(done("Data iuran berhasil dihapus"))
}
