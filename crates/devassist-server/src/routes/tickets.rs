//! Tickets, their comments and assist suggestions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use devassist_core::error::DevAssistError;
use devassist_core::models::ticket::UpdateTicket;

use crate::auth::CurrentUser;
use crate::dto::{
    AssignTicketRequest, CommentDto, CreateCommentRequest, CreateTicketRequest,
    SuggestionResponse, TicketDetailResponse, TicketDto, TicketListResponse, TicketQuery,
    UpdateTicketRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ValidJson, ValidQuery, parse_id};
use crate::gate::{RoleGate, require_role};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", post(create_ticket).get(list_tickets))
        .route(
            "/tickets/{id}",
            get(get_ticket).patch(update_ticket).delete(delete_ticket),
        )
        .route(
            "/tickets/{id}/assign",
            patch(assign_ticket).route_layer(from_fn_with_state(RoleGate::STAFF, require_role)),
        )
        .route(
            "/tickets/{id}/comments",
            post(add_comment).get(list_comments),
        )
        .route("/tickets/{id}/suggest", post(suggest))
}

async fn create_ticket(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ValidJson(req): ValidJson<CreateTicketRequest>,
) -> ApiResult<(StatusCode, Json<TicketDto>)> {
    let ticket = state.tickets.create(&caller, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ticket.into())))
}

async fn list_tickets(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<TicketQuery>,
) -> ApiResult<Json<TicketListResponse>> {
    let page = state.tickets.list(query.into()).await?;
    Ok(Json(page.into()))
}

async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TicketDetailResponse>> {
    let id = parse_id("ticket", &id)?;
    let detail = state.tickets.get(id).await?;
    Ok(Json(detail.into()))
}

async fn update_ticket(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateTicketRequest>,
) -> ApiResult<Json<TicketDto>> {
    let id = parse_id("ticket", &id)?;
    let patch = UpdateTicket::try_from(req)?;
    let ticket = state.tickets.update(&caller, id, patch).await?;
    Ok(Json(ticket.into()))
}

/// Tickets are never deleted. The route exists so the answer is a JSON
/// 404 rather than a bare 405, for known and unknown ids alike.
async fn delete_ticket() -> ApiError {
    ApiError::not_found("ticket")
}

async fn assign_ticket(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<AssignTicketRequest>,
) -> ApiResult<Json<TicketDto>> {
    let id = parse_id("ticket", &id)?;
    let ticket = state.tickets.assign(&caller, id, req.assignee_id).await?;
    Ok(Json(ticket.into()))
}

async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentDto>)> {
    let ticket_id = parse_id("ticket", &id)?;
    let comment = state.comments.add(&caller, ticket_id, req.body).await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<CommentDto>>> {
    let ticket_id = parse_id("ticket", &id)?;
    let comments = state.comments.list(ticket_id).await?;
    Ok(Json(comments.into_iter().map(CommentDto::from).collect()))
}

async fn suggest(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuggestionResponse>> {
    // The disabled check comes first so the flag wins over a bad id.
    if !state.suggestions.is_enabled() {
        return Err(DevAssistError::Disabled {
            feature: devassist_service::suggestion::FEATURE_NAME.into(),
        }
        .into());
    }
    let ticket_id = parse_id("ticket", &id)?;
    let set = state.suggestions.suggest(ticket_id).await?;
    Ok(Json(set.into()))
}
