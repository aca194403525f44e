//! Assessment (penilaian) and assessment type routes.
//!
//! Admin, pengurus and tentor record scores for anyone. A member only sees
//! their own recap.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::{Datelike, Utc};
use orgkas_db::AssessmentRepository;
use orgkas_db::repositories::{AssessmentInput, AssessmentTypeInput};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::members::own_member;
use crate::error::{ApiResult, done, saved};
use crate::{AppState, middleware::AuthUser};

/// Creates the assessment routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assessment-types", get(list_types).post(create_type))
        .route(
            "/assessment-types/{id}",
            get(get_type).put(update_type).delete(delete_type),
        )
        .route("/assessments", get(list_assessments).post(record_assessment))
        .route("/assessments/recap", get(recap))
        .route("/assessments/mine", get(my_assessments))
        .route(
            "/assessments/{id}",
            put(update_assessment).delete(delete_assessment),
        )
}

fn repo(state: &AppState) -> AssessmentRepository {
    AssessmentRepository::new(state.conn())
}

/// Query parameters for assessment type lists.
#[derive(Debug, Deserialize)]
pub struct TypesQuery {
    /// Only active types.
    #[serde(default)]
    pub active: bool,
}

/// Period and member filter.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// Period month, the current month when omitted.
    pub month: Option<i32>,
    /// Period year, the current year when omitted.
    pub year: Option<i32>,
    /// Only this member.
    pub member_id: Option<i32>,
}

impl PeriodQuery {
    fn period(&self) -> (i32, i32) {
        let today = Utc::now().date_naive();
        let month = i32::try_from(today.month()).unwrap_or(1);
        (self.month.unwrap_or(month), self.year.unwrap_or_else(|| today.year()))
    }
}

/// Body for editing a recorded score.
#[derive(Debug, Deserialize)]
pub struct UpdateScoreRequest {
    /// New score.
    pub score: Decimal,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
}

async fn list_types(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<TypesQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(repo(&state).list_types(query.active).await?))
}

async fn get_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(repo(&state).find_type(id).await?))
}

async fn create_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AssessmentTypeInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_scorer()?;
    let kind = repo(&state).create_type(payload).await?;
    saved(StatusCode::CREATED, "Jenis penilaian berhasil ditambahkan", &kind)
}

async fn update_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<AssessmentTypeInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_scorer()?;
    let kind = repo(&state).update_type(id, payload).await?;
    saved(StatusCode::OK, "Jenis penilaian berhasil diupdate", &kind)
}

async fn delete_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    auth.require_scorer()?;
    repo(&state).delete_type(id).await?;
    Ok(done("Jenis penilaian berhasil dihapus"))
}

/// GET /assessments - Scores with member and type names.
async fn list_assessments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<impl IntoResponse> {
    auth.require_scorer()?;
    let rows = repo(&state)
        .list(query.month, query.year, query.member_id)
        .await?;
    Ok(Json(rows))
}

/// POST /assessments - Record a score; the same member, type and period
/// overwrites the earlier one.
async fn record_assessment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AssessmentInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_scorer()?;
    let row = repo(&state).upsert(payload).await?;
    saved(StatusCode::OK, "Penilaian berhasil disimpan", &row)
}

async fn update_assessment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateScoreRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_scorer()?;
    let row = repo(&state).update(id, payload.score, payload.notes).await?;
    saved(StatusCode::OK, "Penilaian berhasil diupdate", &row)
}

async fn delete_assessment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    auth.require_scorer()?;
    repo(&state).delete(id).await?;
    Ok(done("Penilaian berhasil dihapus"))
}

/// GET /assessments/recap - Score count and averages per member for a period.
///
/// Members get their own line only, whatever `member_id` says.
async fn recap(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<impl IntoResponse> {
    let (month, year) = query.period();
    let member_id = if auth.is_member() {
        Some(own_member(&state, &auth).await?.id)
    } else {
        auth.require_scorer()?;
        query.member_id
    };
    Ok(Json(repo(&state).recap(month, year, member_id).await?))
}

/// GET /assessments/mine - The caller's scores and recap for a period.
async fn my_assessments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<impl IntoResponse> {
    let (month, year) = query.period();
    let member = own_member(&state, &auth).await?;
    let repo = repo(&state);
    let assessments = repo.list(Some(month), Some(year), Some(member.id)).await?;
    let recap = repo.recap(month, year, Some(member.id)).await?;

    Ok(Json(json!({
        "member": member,
        "month": month,
        "year": year,
        "assessments": assessments,
        "recap": recap.into_iter().next(),
    })))
}
