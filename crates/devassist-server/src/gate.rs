//! Route-level role gates: a fixed allow-list checked before the handler
//! runs. Ownership rules live in the services, not here.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use devassist_core::models::user::Role;
use tracing::warn;

use crate::auth::CurrentUser;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct RoleGate(&'static [Role]);

impl RoleGate {
    pub const STAFF: RoleGate = RoleGate(&[Role::Admin, Role::Support]);
    pub const ADMIN: RoleGate = RoleGate(&[Role::Admin]);

    pub fn allows(&self, role: Role) -> bool {
        self.0.contains(&role)
    }
}

/// Middleware body; attach with
/// `from_fn_with_state(RoleGate::STAFF, require_role)` as a route layer.
pub async fn require_role(
    State(gate): State<RoleGate>,
    CurrentUser(caller): CurrentUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !gate.allows(caller.role) {
        warn!(
            caller_id = %caller.id,
            role = %caller.role,
            path = %request.uri().path(),
            "Role gate denied request"
        );
        return Err(ApiError::forbidden("Insufficient role for this action"));
    }
    Ok(next.run(request).await)
}
