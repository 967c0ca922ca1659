use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use devassist_auth::LoginInput;

use crate::auth::CurrentUser;
use crate::dto::{LoginRequest, LoginResponse, MeResponse, RefreshRequest};
use crate::error::ApiResult;
use crate::extract::ValidJson;
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
}

fn login_response(out: devassist_auth::LoginOutput) -> Json<LoginResponse> {
    Json(LoginResponse {
        access_token: out.access_token,
        refresh_token: out.refresh_token,
        expires_in: out.expires_in,
        user: out.user.into(),
    })
}

async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let out = state
        .auth
        .login(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;
    Ok(login_response(out))
}

async fn refresh(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let out = state.auth.refresh(&req.refresh_token).await?;
    Ok(login_response(out))
}

async fn logout(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> ApiResult<StatusCode> {
    state.auth.logout(caller.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(CurrentUser(caller): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: caller.into(),
    })
}
