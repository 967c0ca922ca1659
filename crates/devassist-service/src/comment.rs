//! Append-only ticket comments.

use devassist_core::error::DevAssistResult;
use devassist_core::models::comment::{Comment, CreateComment};
use devassist_core::models::user::Caller;
use devassist_core::policy::{self, TicketAction};
use devassist_core::repository::{CommentRepository, TicketRepository};
use tracing::{info, warn};
use uuid::Uuid;

pub struct CommentService<T: TicketRepository, C: CommentRepository> {
    tickets: T,
    comments: C,
}

impl<T: TicketRepository, C: CommentRepository> CommentService<T, C> {
    pub fn new(tickets: T, comments: C) -> Self {
        Self { tickets, comments }
    }

    pub async fn add(&self, caller: &Caller, ticket_id: Uuid, body: String) -> DevAssistResult<Comment> {
        let ticket = self.tickets.get_by_id(ticket_id).await?;
        if let Err(e) = policy::authorize(caller, TicketAction::Comment, ticket.requester_id) {
            warn!(%ticket_id, caller_id = %caller.id, "Comment denied");
            return Err(e);
        }

        let comment = self
            .comments
            .append(CreateComment {
                ticket_id,
                author_id: caller.id,
                body,
            })
            .await?;

        info!(comment_id = %comment.id, %ticket_id, "Comment added");
        Ok(comment)
    }

    pub async fn list(&self, ticket_id: Uuid) -> DevAssistResult<Vec<Comment>> {
        // Distinguish "no comments" from "no ticket".
        self.tickets.get_by_id(ticket_id).await?;
        self.comments.list_by_ticket(ticket_id).await
    }
}
