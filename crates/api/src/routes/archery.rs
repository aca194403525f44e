//! Archery (panahan) routes.
//!
//! Coaches and committee see every game. A member sees, creates and scores
//! only games of the member record matching their name.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use orgkas_core::archery::{ArrowScore, ArrowSlot, EndSlot};
use orgkas_db::ArcheryRepository;
use orgkas_db::entities::archery_games;
use orgkas_db::repositories::CreateGameInput;
use orgkas_shared::AppError;
use serde::Deserialize;
use serde_json::json;

use super::members::own_member;
use crate::error::{ApiError, ApiResult, done, saved};
use crate::{AppState, middleware::AuthUser};

/// Creates the archery routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/archery/games", get(list_games).post(create_game))
        .route("/archery/games/{id}", get(get_game).delete(delete_game))
        .route("/archery/games/{id}/ends", post(save_end))
        .route("/archery/games/{id}/shots", get(list_shots).put(save_shots))
        .route("/archery/games/{id}/sessions/{n}", get(get_session))
}

fn repo(state: &AppState) -> ArcheryRepository {
    ArcheryRepository::new(state.conn())
}

fn forbidden() -> ApiError {
    ApiError(AppError::Forbidden("Akses ditolak".to_string()))
}

/// Allows scorers everywhere and members on their own games only.
async fn ensure_access(
    state: &AppState,
    auth: &AuthUser,
    game: &archery_games::Model,
) -> ApiResult<()> {
    if auth.require_scorer().is_ok() {
        return Ok(());
    }
    if auth.is_member() && own_member(state, auth).await?.id == game.member_id {
        return Ok(());
    }
    Err(forbidden())
}

/// Query parameters for listing games.
#[derive(Debug, Deserialize)]
pub struct ListGamesQuery {
    /// Only games of this member.
    pub member_id: Option<i32>,
}

/// One arrow of an end.
#[derive(Debug, Deserialize)]
pub struct EndArrow {
    /// Arrow number within the end, 1..=6.
    pub arrow: i32,
    /// Points, 0..=10.
    pub score: i32,
    /// Label such as `X` or `M`; the score when omitted.
    #[serde(default)]
    pub display_value: Option<String>,
}

/// Body for saving an end.
#[derive(Debug, Deserialize)]
pub struct SaveEndRequest {
    /// Session number.
    pub session: i32,
    /// End number within the session.
    pub end: i32,
    /// Arrows of the end.
    pub arrows: Vec<EndArrow>,
}

/// Body for saving arrows anywhere in a game.
#[derive(Debug, Deserialize)]
pub struct SaveShotsRequest {
    /// Arrows with their positions.
    pub arrows: Vec<ArrowScore>,
}

/// GET /archery/games - Games, newest first.
async fn list_games(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListGamesQuery>,
) -> ApiResult<impl IntoResponse> {
    let member_id = if auth.require_scorer().is_ok() {
        query.member_id
    } else if auth.is_member() {
        Some(own_member(&state, &auth).await?.id)
    } else {
        return Err(forbidden());
    };
    Ok(Json(repo(&state).list_games(member_id).await?))
}

/// POST /archery/games - Create a game with every arrow scored 0.
async fn create_game(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateGameInput>,
) -> ApiResult<impl IntoResponse> {
    if auth.require_scorer().is_err() {
        let own = if auth.is_member() {
            own_member(&state, &auth).await?.id
        } else {
            return Err(forbidden());
        };
        if own != payload.member_id {
            return Err(ApiError(AppError::Forbidden(
                "Anda hanya dapat membuat game untuk diri sendiri".to_string(),
            )));
        }
    }
    let game = repo(&state).create_game(payload).await?;
    saved(StatusCode::CREATED, "Game panahan berhasil dibuat", &game)
}

/// GET `/archery/games/{id}` - One game.
async fn get_game(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let game = repo(&state).find_game(id).await?;
    ensure_access(&state, &auth, &game).await?;
    Ok(Json(game))
}

/// DELETE `/archery/games/{id}` - Remove a game with its ends and arrows.
async fn delete_game(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let repo = repo(&state);
    let game = repo.find_game(id).await?;
    ensure_access(&state, &auth, &game).await?;
    repo.delete_game(id).await?;
    Ok(done("Game panahan berhasil dihapus"))
}

/// POST `/archery/games/{id}/ends` - Save one end; returns end, session and
/// game totals.
async fn save_end(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<SaveEndRequest>,
) -> ApiResult<impl IntoResponse> {
    let repo = repo(&state);
    let game = repo.find_game(id).await?;
    ensure_access(&state, &auth, &game).await?;

    let slot = EndSlot {
        session: payload.session,
        end: payload.end,
    };
    let arrows: Vec<ArrowScore> = payload
        .arrows
        .into_iter()
        .map(|a| ArrowScore {
            slot: ArrowSlot {
                session: slot.session,
                end: slot.end,
                arrow: a.arrow,
            },
            score: a.score,
            display_value: a.display_value,
        })
        .collect();

    let totals = repo.save_end(id, slot, &arrows).await?;
    saved(StatusCode::OK, "Skor berhasil disimpan", &totals)
}

/// GET `/archery/games/{id}/shots` - Every arrow by session, end and arrow.
async fn list_shots(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let repo = repo(&state);
    let game = repo.find_game(id).await?;
    ensure_access(&state, &auth, &game).await?;
    Ok(Json(repo.shots(id).await?))
}

/// PUT `/archery/games/{id}/shots` - Save arrows anywhere in the game.
async fn save_shots(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<SaveShotsRequest>,
) -> ApiResult<impl IntoResponse> {
    let repo = repo(&state);
    let game = repo.find_game(id).await?;
    ensure_access(&state, &auth, &game).await?;

    let total = repo.save_shots(id, &payload.arrows).await?;
    saved(
        StatusCode::OK,
        "Skor berhasil disimpan",
        &json!({ "gameTotal": total }),
    )
}

/// GET `/archery/games/{id}/sessions/{n}` - One session grouped by end.
async fn get_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, session)): Path<(i32, i32)>,
) -> ApiResult<impl IntoResponse> {
    let repo = repo(&state);
    let game = repo.find_game(id).await?;
    ensure_access(&state, &auth, &game).await?;
    Ok(Json(repo.session(id, session).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use orgkas_core::auth::UserRole;
    use serde_json::json;

    use crate::test_support::TestApp;

    async fn member(app: &TestApp, token: &str, name: &str) -> i64 {
        let (_, body) = app
            .send("POST", "/api/v1/members", Some(token), Some(json!({ "name": name })))
            .await;
        body["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_scoring_flow() {
        let app = TestApp::new().await;
        let admin = app.login_as("admin", "Admin", UserRole::Admin).await;
        let coach = app.login_as("tono", "Tono", UserRole::Tentor).await;
        let budi = member(&app, &admin, "Budi").await;

        let (status, body) = app
            .send(
                "POST",
                "/api/v1/archery/games",
                Some(coach.as_str()),
                Some(json!({ "member_id": budi, "played_on": "2025-06-07", "session_count": 1 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let game = body["data"]["id"].as_i64().unwrap();

        let (status, body) = app
            .send(
                "POST",
                &format!("/api/v1/archery/games/{game}/ends"),
                Some(coach.as_str()),
                Some(json!({
                    "session": 1,
                    "end": 2,
                    "arrows": [
                        { "arrow": 1, "score": 10, "display_value": "X" },
                        { "arrow": 2, "score": 9 },
                        { "arrow": 3, "score": 0, "display_value": "M" },
                    ],
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({ "shootTotal": 19, "sessionTotal": 19, "gameTotal": 19 }));

        let (_, session) = app
            .send("GET", &format!("/api/v1/archery/games/{game}/sessions/1"), Some(coach.as_str()), None)
            .await;
        assert_eq!(session["ends"][1]["shoot_number"], 2);
        assert_eq!(session["ends"][1]["arrows"][0]["display_value"], "X");
        assert_eq!(session["ends"][1]["arrows"][2]["display_value"], "M");

        let (status, _) = app
            .send(
                "POST",
                &format!("/api/v1/archery/games/{game}/ends"),
                Some(coach.as_str()),
                Some(json!({ "session": 1, "end": 1, "arrows": [{ "arrow": 1, "score": 12 }] })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, shots) = app
            .send("GET", &format!("/api/v1/archery/games/{game}/shots"), Some(coach.as_str()), None)
            .await;
        assert_eq!(shots.as_array().unwrap().len(), 36);
    }

    #[tokio::test]
    async fn test_members_limited_to_own_games() {
        let app = TestApp::new().await;
        let admin = app.login_as("admin", "Admin", UserRole::Admin).await;
        let budi = member(&app, &admin, "Budi").await;
        let rina = member(&app, &admin, "Rina").await;
        let token = app.login_as("budi", "BUDI", UserRole::User).await;

        let (status, _) = app
            .send(
                "POST",
                "/api/v1/archery/games",
                Some(token.as_str()),
                Some(json!({ "member_id": rina })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .send(
                "POST",
                "/api/v1/archery/games",
                Some(token.as_str()),
                Some(json!({ "member_id": budi })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = app
            .send(
                "POST",
                "/api/v1/archery/games",
                Some(admin.as_str()),
                Some(json!({ "member_id": rina })),
            )
            .await;
        let rina_game = body["data"]["id"].as_i64().unwrap();

        let (_, games) = app
            .send("GET", "/api/v1/archery/games", Some(token.as_str()), None)
            .await;
        assert_eq!(games.as_array().unwrap().len(), 1);
        assert_eq!(games[0]["member_name"], "Budi");

        let (status, _) = app
            .send("GET", &format!("/api/v1/archery/games/{rina_game}"), Some(token.as_str()), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
