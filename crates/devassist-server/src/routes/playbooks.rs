use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};

use crate::dto::{
    CreatePlaybookRequest, DeletedResponse, PlaybookDto, PlaybookQuery, UpdatePlaybookRequest,
};
use crate::error::ApiResult;
use crate::extract::{ValidJson, ValidQuery, parse_id};
use crate::gate::{RoleGate, require_role};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/playbooks", get(list_playbooks))
        .route(
            "/playbooks",
            post(create_playbook).route_layer(from_fn_with_state(RoleGate::STAFF, require_role)),
        )
        .route("/playbooks/{id}", get(get_playbook))
        .route(
            "/playbooks/{id}",
            patch(update_playbook).route_layer(from_fn_with_state(RoleGate::STAFF, require_role)),
        )
        .route(
            "/playbooks/{id}",
            delete(delete_playbook).route_layer(from_fn_with_state(RoleGate::ADMIN, require_role)),
        )
}

async fn list_playbooks(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<PlaybookQuery>,
) -> ApiResult<Json<Vec<PlaybookDto>>> {
    let playbooks = state.playbooks.list(query.into()).await?;
    Ok(Json(playbooks.into_iter().map(PlaybookDto::from).collect()))
}

async fn get_playbook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PlaybookDto>> {
    let id = parse_id("playbook", &id)?;
    Ok(Json(state.playbooks.get(id).await?.into()))
}

async fn create_playbook(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreatePlaybookRequest>,
) -> ApiResult<(StatusCode, Json<PlaybookDto>)> {
    let playbook = state.playbooks.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(playbook.into())))
}

async fn update_playbook(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdatePlaybookRequest>,
) -> ApiResult<Json<PlaybookDto>> {
    let id = parse_id("playbook", &id)?;
    Ok(Json(state.playbooks.update(id, req.into()).await?.into()))
}

async fn delete_playbook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    let id = parse_id("playbook", &id)?;
    let id = state.playbooks.delete(id).await?;
    Ok(Json(DeletedResponse { id }))
}
