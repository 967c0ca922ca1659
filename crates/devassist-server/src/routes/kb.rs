use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};

use crate::dto::{
    CreateKbArticleRequest, DeletedResponse, KbArticleDto, KbQuery, UpdateKbArticleRequest,
};
use crate::error::ApiResult;
use crate::extract::{ValidJson, ValidQuery, parse_id};
use crate::gate::{RoleGate, require_role};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/kb", get(list_articles))
        .route(
            "/kb",
            post(create_article).route_layer(from_fn_with_state(RoleGate::STAFF, require_role)),
        )
        .route("/kb/{id}", get(get_article))
        .route(
            "/kb/{id}",
            patch(update_article).route_layer(from_fn_with_state(RoleGate::STAFF, require_role)),
        )
        .route(
            "/kb/{id}",
            delete(delete_article).route_layer(from_fn_with_state(RoleGate::ADMIN, require_role)),
        )
}

async fn list_articles(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<KbQuery>,
) -> ApiResult<Json<Vec<KbArticleDto>>> {
    let articles = state.kb.list(query.into()).await?;
    Ok(Json(articles.into_iter().map(KbArticleDto::from).collect()))
}

async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<KbArticleDto>> {
    let id = parse_id("kb_article", &id)?;
    Ok(Json(state.kb.get(id).await?.into()))
}

async fn create_article(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateKbArticleRequest>,
) -> ApiResult<(StatusCode, Json<KbArticleDto>)> {
    let article = state.kb.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(article.into())))
}

async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateKbArticleRequest>,
) -> ApiResult<Json<KbArticleDto>> {
    let id = parse_id("kb_article", &id)?;
    Ok(Json(state.kb.update(id, req.into()).await?.into()))
}

async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    let id = parse_id("kb_article", &id)?;
    let id = state.kb.delete(id).await?;
    Ok(Json(DeletedResponse { id }))
}
