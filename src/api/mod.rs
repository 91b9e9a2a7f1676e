//! HTTP API.
//!
//! All routes live under `/api` and answer with a JSON envelope:
//! `{"success": true, "data": ...}` or `{"success": false, "error": ...}`.
//!
//! ## Route Structure
//!
//! - `GET /api/health`
//! - `POST /api/auth/{signup,signin,signout}`, `GET /api/auth/me`
//! - `GET|POST /api/groups`, `GET|DELETE /api/groups/{id}`, `POST /api/groups/{id}/join`
//! - `GET /api/groups/{id}/{members,picks,weekly-scores,past-weeks}`
//! - `GET /api/groups/{id}/members/{user_id}/picks`
//! - `GET|POST /api/games`, `PUT /api/games/{id}/result`
//! - `GET|POST /api/picks`, `GET /api/pick-results`
//! - `POST /api/score-picks`, `GET /api/weekly-scores`

mod auth;
mod error;
mod extract;
mod games;
mod groups;
mod health;
mod picks;
mod scores;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::db::PoolRepository;
use crate::services::{
    AuthService, GameService, GroupService, PasswordHasher, PickService, ScoringService,
    ServiceError, StandingsService,
};

pub use error::{ApiError, ApiResult, Envelope};
pub use extract::{AuthUser, WeekQuery};

/// Services shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    repository: PoolRepository,
    auth: AuthService,
    groups: GroupService,
    games: GameService,
    picks: PickService,
    scoring: ScoringService,
    standings: StandingsService,
}

impl AppState {
    /// Wires the services over one repository.
    #[instrument(skip(repository, hasher))]
    pub fn new(repository: PoolRepository, hasher: PasswordHasher) -> Self {
        info!(database_url = %repository.database_url(), "Building application state");
        let groups = GroupService::new(repository.clone(), hasher);
        Self {
            auth: AuthService::new(repository.clone(), hasher),
            games: GameService::new(repository.clone()),
            picks: PickService::new(repository.clone(), groups.clone()),
            scoring: ScoringService::new(repository.clone()),
            standings: StandingsService::new(repository.clone(), groups.clone()),
            groups,
            repository,
        }
    }
}

/// Runs synchronous service work on the blocking pool.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::from)
}

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        // Accounts
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .route("/auth/me", get(auth::me))
        .route("/auth/signout", post(auth::sign_out))
        // Groups
        .route("/groups", get(groups::list_groups).post(groups::create_group))
        .route("/groups/{id}", get(groups::get_group).delete(groups::delete_group))
        .route("/groups/{id}/join", post(groups::join_group))
        .route("/groups/{id}/members", get(groups::members))
        .route(
            "/groups/{id}/members/{user_id}/picks",
            get(picks::member_picks),
        )
        .route("/groups/{id}/picks", get(picks::group_picks))
        .route("/groups/{id}/weekly-scores", get(scores::group_weekly_scores))
        .route("/groups/{id}/past-weeks", get(scores::past_weeks))
        // Games
        .route("/games", get(games::list_games).post(games::upsert_games))
        .route("/games/{id}/result", put(games::record_result))
        // Picks and scoring
        .route("/picks", get(picks::my_picks).post(picks::submit_picks))
        .route("/pick-results", get(picks::pick_results))
        .route("/score-picks", post(scores::score_picks))
        .route("/weekly-scores", get(scores::weekly_scores));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
