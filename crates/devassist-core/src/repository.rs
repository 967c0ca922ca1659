//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups of an absent record fail
//! with [`DevAssistError::NotFound`](crate::error::DevAssistError::NotFound).

use uuid::Uuid;

use crate::error::DevAssistResult;
use crate::models::{
    comment::{Comment, CreateComment},
    kb_article::{CreateKbArticle, KbArticle, KbArticleFilter, UpdateKbArticle},
    playbook::{CreatePlaybook, Playbook, PlaybookFilter, UpdatePlaybook},
    ticket::{CreateTicket, Ticket, TicketFilter, UpdateTicket},
    user::{CreateUser, User},
};

/// A filtered result set together with the size of the full match.
#[derive(Debug, Clone)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: u64,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = DevAssistResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DevAssistResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = DevAssistResult<User>> + Send;
    /// Replace the stored refresh-token hash. `None` clears it.
    fn set_refresh_token_hash(
        &self,
        id: Uuid,
        hash: Option<String>,
    ) -> impl Future<Output = DevAssistResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Tickets & comments
// ---------------------------------------------------------------------------

pub trait TicketRepository: Send + Sync {
    fn create(&self, input: CreateTicket) -> impl Future<Output = DevAssistResult<Ticket>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DevAssistResult<Ticket>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTicket,
    ) -> impl Future<Output = DevAssistResult<Ticket>> + Send;
    /// Matching tickets, newest first. Items and total are read in one
    /// transaction.
    fn list(
        &self,
        filter: TicketFilter,
    ) -> impl Future<Output = DevAssistResult<ListResult<Ticket>>> + Send;
}

pub trait CommentRepository: Send + Sync {
    /// Append a comment. No update or delete operations exist.
    fn append(&self, input: CreateComment)
    -> impl Future<Output = DevAssistResult<Comment>> + Send;
    /// All comments of a ticket, oldest first.
    fn list_by_ticket(
        &self,
        ticket_id: Uuid,
    ) -> impl Future<Output = DevAssistResult<Vec<Comment>>> + Send;
}

// ---------------------------------------------------------------------------
// Knowledge base & playbooks
// ---------------------------------------------------------------------------

pub trait KbArticleRepository: Send + Sync {
    fn create(
        &self,
        input: CreateKbArticle,
    ) -> impl Future<Output = DevAssistResult<KbArticle>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DevAssistResult<KbArticle>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateKbArticle,
    ) -> impl Future<Output = DevAssistResult<KbArticle>> + Send;
    /// Hard delete. Fails with `NotFound` when nothing was deleted.
    fn delete(&self, id: Uuid) -> impl Future<Output = DevAssistResult<()>> + Send;
    /// Matching articles, most recently updated first.
    fn list(
        &self,
        filter: KbArticleFilter,
    ) -> impl Future<Output = DevAssistResult<Vec<KbArticle>>> + Send;
}

pub trait PlaybookRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePlaybook,
    ) -> impl Future<Output = DevAssistResult<Playbook>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DevAssistResult<Playbook>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePlaybook,
    ) -> impl Future<Output = DevAssistResult<Playbook>> + Send;
    /// Hard delete. Fails with `NotFound` when nothing was deleted.
    fn delete(&self, id: Uuid) -> impl Future<Output = DevAssistResult<()>> + Send;
    /// Matching playbooks, most recently updated first.
    fn list(
        &self,
        filter: PlaybookFilter,
    ) -> impl Future<Output = DevAssistResult<Vec<Playbook>>> + Send;
}
