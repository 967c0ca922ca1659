//! Ticket authorization policy.
//!
//! A single pure table maps `(action, role, ownership)` to a decision.
//! Services call [`authorize`] instead of comparing roles inline, so
//! every call site applies the same rules.

use crate::error::{DevAssistError, DevAssistResult};
use crate::models::user::{Caller, Role};

/// Ownership- or role-sensitive actions on a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    Update,
    Assign,
    Comment,
}

impl TicketAction {
    fn denial_reason(&self) -> &'static str {
        match self {
            TicketAction::Update => "Not authorized to update this ticket",
            TicketAction::Assign => "Not authorized to assign tickets",
            TicketAction::Comment => "Not authorized to comment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Evaluate the policy table.
///
/// `is_requester` is whether the caller created the ticket. Assignment
/// ignores it: only role matters there.
pub fn decide(action: TicketAction, role: Role, is_requester: bool) -> Decision {
    let allowed = match action {
        TicketAction::Update | TicketAction::Comment => role.is_staff() || is_requester,
        TicketAction::Assign => role != Role::Engineer,
    };
    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Apply the policy for `caller` against a ticket requested by
/// `requester_id`, failing with [`DevAssistError::Forbidden`] on denial.
pub fn authorize(
    caller: &Caller,
    action: TicketAction,
    requester_id: uuid::Uuid,
) -> DevAssistResult<()> {
    match decide(action, caller.role, caller.id == requester_id) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(DevAssistError::forbidden(action.denial_reason())),
    }
}

/// Role-only check, for actions where ownership does not matter and the
/// ticket need not be loaded first.
pub fn authorize_role(caller: &Caller, action: TicketAction) -> DevAssistResult<()> {
    match decide(action, caller.role, false) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(DevAssistError::forbidden(action.denial_reason())),
    }
}
