//! Tariff (tarif) routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use orgkas_db::TariffRepository;
use orgkas_db::repositories::TariffInput;
use serde::Deserialize;

use crate::error::{ApiResult, done, saved};
use crate::{AppState, middleware::AuthUser};

/// Creates the tariff routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tariffs", get(list_tariffs).post(create_tariff))
        .route(
            "/tariffs/{id}",
            get(get_tariff).put(update_tariff).delete(delete_tariff),
        )
}

fn repo(state: &AppState) -> TariffRepository {
    TariffRepository::new(state.conn())
}

/// Query parameters for listing tariffs.
#[derive(Debug, Deserialize)]
pub struct ListTariffsQuery {
    /// Only active tariffs.
    #[serde(default)]
    pub active: bool,
}

async fn list_tariffs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListTariffsQuery>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    Ok(Json(repo(&state).list(query.active).await?))
}

async fn get_tariff(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    Ok(Json(repo(&state).find(id).await?))
}

async fn create_tariff(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TariffInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let tariff = repo(&state).create(payload).await?;
    saved(StatusCode::CREATED, "Data tarif berhasil ditambahkan", &tariff)
}

async fn update_tariff(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<TariffInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    let tariff = repo(&state).update(id, payload).await?;
    saved(StatusCode::OK, "Data tarif berhasil diupdate", &tariff)
}

async fn delete_tariff(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    auth.require_records()?;
    repo(&state).delete(id).await?;
    Ok(done("Data tarif berhasil dihapus"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use orgkas_core::auth::UserRole;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::test_support::TestApp;

    #[rstest]
    #[case(json!({ "name": "", "amount": 10_000 }))]
    #[case(json!({ "name": "Bulanan", "amount": 0 }))]
    #[case(json!({ "name": "Bulanan", "amount": -5 }))]
    #[tokio::test]
    async fn test_invalid_tariffs_rejected(#[case] body: Value) {
        let app = TestApp::new().await;
        let token = app.login_as("admin", "Admin", UserRole::Admin).await;
        let (status, body) = app
            .send("POST", "/api/v1/tariffs", Some(token.as_str()), Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_active_filter_and_delete() {
        let app = TestApp::new().await;
        let token = app.login_as("admin", "Admin", UserRole::Admin).await;
        let token = Some(token.as_str());

        app.send(
            "POST",
            "/api/v1/tariffs",
            token,
            Some(json!({ "name": "Lama", "amount": 10_000, "status": "nonaktif" })),
        )
        .await;
        let (_, body) = app
            .send(
                "POST",
                "/api/v1/tariffs",
                token,
                Some(json!({ "name": "Baru", "amount": 20_000, "frequency": "tahunan" })),
            )
            .await;
        let id = body["data"]["id"].as_i64().unwrap();

        let (_, all) = app.send("GET", "/api/v1/tariffs", token, None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);
        let (_, active) = app.send("GET", "/api/v1/tariffs?active=true", token, None).await;
        assert_eq!(active.as_array().unwrap().len(), 1);
        assert_eq!(active[0]["frequency"], "tahunan");

        let (status, _) = app
            .send("DELETE", &format!("/api/v1/tariffs/{id}"), token, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app
            .send("DELETE", &format!("/api/v1/tariffs/{id}"), token, None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
