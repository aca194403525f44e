//! Cashbook (buku kas) routes.
//!
//! Reading the ledger is open to every role, since the cash-flow page shows
//! it to members. Writes need admin or pengurus; rebuilding the chain is
//! admin only.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use orgkas_core::ledger::{ChainMismatch, EntryInput};
use orgkas_db::CashbookRepository;
use serde::{Deserialize, Serialize};

use crate::error::{ApiResult, done, saved};
use crate::{AppState, middleware::AuthUser};

/// Creates the cashbook routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cashbook", get(list_entries).post(create_entry))
        .route("/cashbook/summary", get(summary))
        .route("/cashbook/verify", get(verify))
        .route("/cashbook/rechain", post(rechain))
        .route("/cashbook/reversals", post(reverse))
        .route("/cashbook/{id}", put(update_entry).delete(delete_entry))
}

fn repo(state: &AppState) -> CashbookRepository {
    CashbookRepository::new(state.conn(), state.ledger_gate.clone())
}

/// Request body for a manual reversal.
#[derive(Debug, Deserialize)]
pub struct ReversalRequest {
    /// Booking date.
    pub entry_date: NaiveDate,
    /// Description of the reversal.
    pub description: String,
    /// Category label.
    #[serde(default)]
    pub category: String,
    /// Amount to take out of the balance.
    pub amount: i64,
}

/// Result of an integrity check.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// True when every stored balance matches the chain.
    pub consistent: bool,
    /// Rows whose stored balance disagrees.
    pub mismatches: Vec<ChainMismatch>,
}

/// GET /cashbook - Entries, newest date first.
async fn list_entries(State(state): State<AppState>, _auth: AuthUser) -> ApiResult<impl IntoResponse> {
    Ok(Json(repo(&state).list().await?))
}

/// GET /cashbook/summary - Total debit, total credit and current balance.
async fn summary(State(state): State<AppState>, _auth: AuthUser) -> ApiResult<impl IntoResponse> {
    Ok(Json(repo(&state).totals().await?))
}

/// GET /cashbook/verify - Re-derive the chain and report disagreements.
async fn verify(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let mismatches = repo(&state).verify().await?;
    Ok(Json(VerifyResponse {
        consistent: mismatches.is_empty(),
        mismatches,
    }))
}

/// POST /cashbook/rechain - Rewrite every balance to the strict chain.
async fn rechain(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let rewritten = repo(&state).rechain().await?;
    saved(
        StatusCode::OK,
        "Saldo buku kas berhasil dihitung ulang",
        &serde_json::json!({ "rewritten": rewritten }),
    )
}

/// POST /cashbook - Append a manual entry.
async fn create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<EntryInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let entry = repo(&state).create(payload).await?;
    saved(StatusCode::CREATED, "Data buku kas berhasil ditambahkan", &entry)
}

/// POST /cashbook/reversals - Take an amount back out of the balance.
async fn reverse(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ReversalRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let entry = repo(&state)
        .reverse(
            payload.entry_date,
            &payload.description,
            &payload.category,
            payload.amount,
        )
        .await?;
    saved(StatusCode::CREATED, "Pembalikan berhasil dicatat", &entry)
}

/// PUT `/cashbook/{id}` - Edit an entry and re-chain later rows.
async fn update_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<EntryInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let entry = repo(&state).update(id, payload).await?;
    saved(StatusCode::OK, "Data buku kas berhasil diupdate", &entry)
}

/// DELETE `/cashbook/{id}` - Remove an entry and re-chain later rows.
async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    repo(&state).delete(id).await?;
    Ok(done("Data buku kas berhasil dihapus"))
}
