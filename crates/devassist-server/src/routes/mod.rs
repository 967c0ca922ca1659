//! Router assembly.

mod auth;
mod health;
mod kb;
mod playbooks;
mod tickets;

use axum::Router;
use axum::middleware::from_fn_with_state;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::authenticate;
use crate::state::AppState;

/// Build the complete API router.
///
/// `/health`, `/auth/login` and `/auth/refresh` are public; everything
/// else requires a bearer access token.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .merge(health::routes())
        .merge(auth::public_routes());

    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(tickets::routes())
        .merge(kb::routes())
        .merge(playbooks::routes())
        .layer(from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
