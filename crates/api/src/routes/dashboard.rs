//! Dashboard routes.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use chrono::Utc;
use orgkas_db::DashboardRepository;
use orgkas_db::repositories::db_app_error;

use crate::error::ApiResult;
use crate::{AppState, middleware::AuthUser};

/// Creates the dashboard routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(get_stats))
        .route("/dashboard/chart", get(get_chart))
}

/// GET /dashboard/stats - Headline figures.
async fn get_stats(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let stats = DashboardRepository::new(state.conn())
        .stats()
        .await
        .map_err(|e| db_app_error(&e))?;
    Ok(Json(stats))
}

/// GET /dashboard/chart - Series over the trailing twelve months.
async fn get_chart(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let chart = DashboardRepository::new(state.conn())
        .chart(Utc::now().date_naive())
        .await
        .map_err(|e| db_app_error(&e))?;
    Ok(Json(chart))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use orgkas_core::auth::UserRole;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_stats_follow_cashbook() {
        let app = TestApp::new().await;
        let token = app.login_as("sari", "Sari", UserRole::Pengurus).await;

        for (debit, credit) in [(100_000, 0), (0, 30_000)] {
            app.send(
                "POST",
                "/api/v1/cashbook",
                Some(token.as_str()),
                Some(json!({
                    "entry_date": "2025-06-01",
                    "description": "Kas",
                    "category": "umum",
                    "debit": debit,
                    "credit": credit,
                })),
            )
            .await;
        }

        let (status, stats) = app
            .send("GET", "/api/v1/dashboard/stats", Some(token.as_str()), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_members"], 0);
        assert_eq!(stats["total_debit"], 100_000);
        assert_eq!(stats["total_credit"], 30_000);
        assert_eq!(stats["balance"], 70_000);
    }

    #[tokio::test]
    async fn test_chart_has_twelve_months() {
        let app = TestApp::new().await;
        let token = app.login_as("budi", "Budi", UserRole::User).await;

        let (status, chart) = app
            .send("GET", "/api/v1/dashboard/chart", Some(token.as_str()), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(chart["labels"].as_array().unwrap().len(), 12);
        assert_eq!(chart["balance"].as_array().unwrap().len(), 12);
    }
}
