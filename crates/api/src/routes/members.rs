//! Member (anggota) routes, including tariff assignments.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
};
use chrono::{Datelike, Utc};
use orgkas_db::entities::members;
use orgkas_db::repositories::{DuesRepository, MemberInput, PaymentQuery};
use orgkas_db::MemberRepository;
use orgkas_shared::AppError;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult, done, saved};
use crate::{AppState, middleware::AuthUser};

/// Creates the member routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members).post(create_member))
        .route(
            "/members/{id}",
            get(get_member).put(update_member).delete(delete_member),
        )
        .route("/members/{id}/detail", get(member_detail))
        .route("/members/{id}/payments", get(find_payment))
        .route("/members/{id}/tariffs", get(list_tariffs).post(assign_tariff))
        .route("/members/{id}/tariffs/bulk", put(replace_tariffs))
        .route("/members/{id}/tariffs/{tariff_id}", delete(remove_tariff))
}

fn repo(state: &AppState) -> MemberRepository {
    MemberRepository::new(state.conn())
}

/// Finds the member record belonging to the caller, matched by name.
pub(crate) async fn own_member(state: &AppState, auth: &AuthUser) -> ApiResult<members::Model> {
    repo(state).find_by_name(auth.name()).await?.ok_or_else(|| {
        ApiError(AppError::NotFound(format!(
            "Data anggota dengan nama \"{}\" tidak ditemukan",
            auth.name()
        )))
    })
}

/// Query parameters for listing members.
#[derive(Debug, Deserialize)]
pub struct ListMembersQuery {
    /// Only members with this status.
    pub status: Option<String>,
}

/// Query parameters for the detail view.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    /// Year of dues to include, the current year when omitted.
    pub year: Option<i32>,
}

/// Body for assigning one tariff.
#[derive(Debug, Deserialize)]
pub struct AssignTariffRequest {
    /// Tariff to assign.
    pub tariff_id: i32,
}

/// Body for replacing every assignment.
#[derive(Debug, Deserialize)]
pub struct ReplaceTariffsRequest {
    /// The new set of tariffs.
    #[serde(default)]
    pub tariff_ids: Vec<i32>,
}

/// GET /members - Members by name.
async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListMembersQuery>,
) -> ApiResult<impl IntoResponse> {
    auth.require_scorer()?;
    Ok(Json(repo(&state).list(query.status.as_deref()).await?))
}

/// GET `/members/{id}` - One member.
async fn get_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    auth.require_scorer()?;
    Ok(Json(repo(&state).find(id).await?))
}

/// POST /members - Create a member with optional tariffs.
async fn create_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<MemberInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let member = repo(&state).create(payload).await?;
    saved(StatusCode::CREATED, "Data anggota berhasil ditambahkan", &member)
}

/// PUT `/members/{id}` - Replace a member's fields.
async fn update_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<MemberInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let member = repo(&state).update(id, payload).await?;
    saved(StatusCode::OK, "Data anggota berhasil diupdate", &member)
}

/// DELETE `/members/{id}` - Remove a member and their records.
async fn delete_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    repo(&state).delete(id).await?;
    Ok(done("Data anggota berhasil dihapus"))
}

/// GET `/members/{id}/detail` - Member, tariffs and dues for a year.
async fn member_detail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Query(query): Query<DetailQuery>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    Ok(Json(repo(&state).detail(id, year).await?))
}

/// GET `/members/{id}/payments` - Latest payment matching the query, or null.
async fn find_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Query(query): Query<PaymentQuery>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let dues = DuesRepository::new(state.conn(), state.ledger_gate.clone());
    Ok(Json(dues.find_payment(id, &query).await?))
}

/// GET `/members/{id}/tariffs` - Assigned tariffs.
async fn list_tariffs(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    Ok(Json(repo(&state).tariffs(id).await?))
}

/// POST `/members/{id}/tariffs` - Assign a tariff; assigning twice is a no-op.
async fn assign_tariff(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<AssignTariffRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    repo(&state).assign_tariff(id, payload.tariff_id).await?;
    Ok(done("Tarif berhasil ditambahkan"))
}

/// PUT `/members/{id}/tariffs/bulk` - Replace every assignment at once.
async fn replace_tariffs(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<ReplaceTariffsRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let assigned = repo(&state).replace_tariffs(id, &payload.tariff_ids).await?;
    saved(StatusCode::OK, "Tarif anggota berhasil diperbarui", &assigned)
}

/// DELETE `/members/{id}/tariffs/{tariff_id}` - Remove one assignment.
async fn remove_tariff(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, tariff_id)): Path<(i32, i32)>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    repo(&state).remove_tariff(id, tariff_id).await?;
    Ok(done("Tarif berhasil dihapus"))
}
