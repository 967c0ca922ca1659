//! Ticket lifecycle: create, list, get, update and assign.

use devassist_core::error::DevAssistResult;
use devassist_core::models::comment::Comment;
use devassist_core::models::ticket::{
    CreateTicket, Ticket, TicketComponent, TicketFilter, TicketSeverity, UpdateTicket,
};
use devassist_core::models::user::Caller;
use devassist_core::policy::{self, TicketAction};
use devassist_core::repository::{CommentRepository, ListResult, TicketRepository};
use tracing::{info, warn};
use uuid::Uuid;

/// Caller-supplied fields of a new ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub severity: TicketSeverity,
    pub component: TicketComponent,
}

/// A ticket together with its comments, oldest first.
#[derive(Debug, Clone)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub comments: Vec<Comment>,
}

pub struct TicketService<T: TicketRepository, C: CommentRepository> {
    tickets: T,
    comments: C,
}

impl<T: TicketRepository, C: CommentRepository> TicketService<T, C> {
    pub fn new(tickets: T, comments: C) -> Self {
        Self { tickets, comments }
    }

    /// Open a ticket on behalf of `caller`, who becomes its requester.
    pub async fn create(&self, caller: &Caller, input: NewTicket) -> DevAssistResult<Ticket> {
        let ticket = self
            .tickets
            .create(CreateTicket {
                title: input.title,
                description: input.description,
                severity: input.severity,
                component: input.component,
                requester_id: caller.id,
            })
            .await?;

        info!(ticket_id = %ticket.id, requester_id = %caller.id, "Ticket created");
        Ok(ticket)
    }

    pub async fn list(&self, filter: TicketFilter) -> DevAssistResult<ListResult<Ticket>> {
        self.tickets.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> DevAssistResult<TicketDetail> {
        let ticket = self.tickets.get_by_id(id).await?;
        let comments = self.comments.list_by_ticket(id).await?;
        Ok(TicketDetail { ticket, comments })
    }

    /// Apply a partial update. Staff may update any ticket; engineers
    /// only their own.
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        patch: UpdateTicket,
    ) -> DevAssistResult<Ticket> {
        let ticket = self.tickets.get_by_id(id).await?;
        if let Err(e) = policy::authorize(caller, TicketAction::Update, ticket.requester_id) {
            warn!(ticket_id = %id, caller_id = %caller.id, "Ticket update denied");
            return Err(e);
        }

        // Nothing to write; `updated_at` stays as it was.
        if patch.is_empty() {
            return Ok(ticket);
        }

        self.tickets.update(id, patch).await
    }

    /// Set or clear the assignee. The role check runs before the ticket
    /// is looked up, so engineers are refused even for unknown ids. The
    /// assignee id itself is not validated.
    pub async fn assign(
        &self,
        caller: &Caller,
        id: Uuid,
        assignee_id: Option<String>,
    ) -> DevAssistResult<Ticket> {
        if let Err(e) = policy::authorize_role(caller, TicketAction::Assign) {
            warn!(ticket_id = %id, caller_id = %caller.id, "Ticket assignment denied");
            return Err(e);
        }
        self.tickets.get_by_id(id).await?;

        let ticket = self
            .tickets
            .update(
                id,
                UpdateTicket {
                    assignee_id: Some(assignee_id),
                    ..Default::default()
                },
            )
            .await?;

        info!(ticket_id = %id, assignee = ?ticket.assignee_id, "Ticket assigned");
        Ok(ticket)
    }
}
