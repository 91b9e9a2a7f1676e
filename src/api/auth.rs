//! Account endpoints under /api/auth.

use axum::{Json, extract::State};
use serde::Serialize;

use super::{ApiResult, AppState, AuthUser, blocking, error::ok};
use crate::db::PublicUser;
use crate::services::{AuthSession, SignInRequest, SignUpRequest};

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct Message {
    message: &'static str,
}

/// POST /api/auth/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> ApiResult<AuthSession> {
    let session = blocking(move || state.auth.sign_up(request)).await?;
    ok(session)
}

/// POST /api/auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<AuthSession> {
    let session = blocking(move || state.auth.sign_in(request)).await?;
    ok(session)
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> ApiResult<PublicUser> {
    ok(PublicUser::from(&auth.user))
}

/// POST /api/auth/signout
pub async fn sign_out(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Message> {
    blocking(move || state.auth.sign_out(&auth.token)).await?;
    ok(Message {
        message: "Signed out",
    })
}
